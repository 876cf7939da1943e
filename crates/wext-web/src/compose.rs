//! Response composition: the partial-vs-full negotiation core.
//!
//! A full response is the head-merged pre shell, the body fragment wrapped
//! in the router marker, and the post shell. A partial response is the bare
//! body fragment plus an out-of-band title update header when the handler
//! supplied a titled head fragment.

use crate::header_updates::{HEADER_UPDATES_HEADER, HeaderUpdates, extract_title};
use crate::page::PageData;
use crate::template::{ROUTER_CLOSE, ROUTER_OPEN, merge_head, post_content, pre_content};

const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3600";

/// The assembled HTTP payload for a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub html: String,
    pub partial: bool,
}

/// Some browsers fetch /favicon.ico on their own; those requests bypass
/// page handling entirely.
pub fn is_favicon_request(path: &str) -> bool {
    path.contains("favicon.ico")
}

/// Compose the response for one page request.
///
/// Invariants: a partial response never contains shell markup and a full
/// response never carries `X-Header-Updates`.
pub fn compose(template: &str, data: &PageData, partial: bool) -> ComposedResponse {
    let mut headers: Vec<(String, String)> = data.headers.clone();
    if !has_header(&headers, "content-type") {
        headers.push((
            "content-type".to_string(),
            "text/html; charset=utf-8".to_string(),
        ));
    }
    if !has_header(&headers, "cache-control") {
        headers.push((
            "cache-control".to_string(),
            DEFAULT_CACHE_CONTROL.to_string(),
        ));
    }

    let mut html = String::new();

    if partial {
        if let Some(title) = data.head.as_deref().and_then(extract_title) {
            headers.push((
                HEADER_UPDATES_HEADER.to_string(),
                HeaderUpdates::new(title).encode(),
            ));
        }
        html.push_str(&data.body);
    } else {
        if let Some(pre) = pre_content(template, partial) {
            match data.head.as_deref() {
                Some(head) => html.push_str(&merge_head(pre, head)),
                None => html.push_str(pre),
            }
        }
        html.push_str(ROUTER_OPEN);
        html.push_str(&data.body);
        html.push_str(ROUTER_CLOSE);
        if let Some(post) = post_content(template, partial) {
            html.push_str(post);
        }
    }

    ComposedResponse {
        status: 200,
        headers,
        html,
        partial,
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
}
