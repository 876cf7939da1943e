//! Shell template splitting.
//!
//! A page template is a plain HTML string containing the router marker
//! exactly once. Everything before `<wext-router>` is the "pre" shell,
//! everything after `</wext-router>` the "post" shell, and the region in
//! between is replaced by the per-request body fragment.

/// Opening marker separating the pre shell from the body region.
pub const ROUTER_OPEN: &str = "<wext-router>";
/// Closing marker separating the body region from the post shell.
pub const ROUTER_CLOSE: &str = "</wext-router>";

const HEAD_OPEN: &str = "<head>";

/// Shell markup preceding the body region, or `None` for partial responses.
///
/// A template without the marker degrades to the whole template as pre
/// content. That is defined behavior, not an error: such a shell simply has
/// no post half.
pub fn pre_content(template: &str, partial: bool) -> Option<&str> {
    if partial {
        return None;
    }
    match template.find(ROUTER_OPEN) {
        Some(idx) => Some(&template[..idx]),
        None => Some(template),
    }
}

/// Shell markup following the body region, or `None` for partial responses
/// and for templates without a closing marker.
pub fn post_content(template: &str, partial: bool) -> Option<&str> {
    if partial {
        return None;
    }
    template
        .find(ROUTER_CLOSE)
        .map(|idx| &template[idx + ROUTER_CLOSE.len()..])
}

/// Merge a dynamic head fragment into the pre shell.
///
/// The fragment lands right after the first `<head>` so it joins the static
/// shell head contents. Shells without a `<head>` tag get the fragment
/// prepended instead.
pub fn merge_head(pre: &str, head: &str) -> String {
    match pre.find(HEAD_OPEN) {
        Some(idx) => {
            let insert_at = idx + HEAD_OPEN.len();
            let mut merged = String::with_capacity(pre.len() + head.len());
            merged.push_str(&pre[..insert_at]);
            merged.push_str(head);
            merged.push_str(&pre[insert_at..]);
            merged
        }
        None => {
            let mut merged = String::with_capacity(pre.len() + head.len());
            merged.push_str(head);
            merged.push_str(pre);
            merged
        }
    }
}
