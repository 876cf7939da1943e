use crate::compose::{ComposedResponse, compose, is_favicon_request};
use crate::error::WextError;
use crate::page::RequestContext;
use crate::router::PageRouter;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Serves a wext page table over axum. The router is built once at startup
/// and shared immutably across requests.
#[derive(Clone)]
pub struct AxumWextAdapter {
    router: Arc<PageRouter>,
}

impl AxumWextAdapter {
    pub fn new(router: PageRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    pub fn router(&self) -> &PageRouter {
        &self.router
    }

    pub fn respond_path(&self, method: &str, path: &str, headers: &HeaderMap) -> Response {
        let uri = path
            .parse::<Uri>()
            .unwrap_or_else(|_| Uri::from_static("/"));
        self.respond_request(method, &uri, headers)
    }

    /// Answer a request, falling back to a plain 404 on a route miss.
    pub fn respond_request(&self, method: &str, uri: &Uri, headers: &HeaderMap) -> Response {
        self.respond_matched(method, uri, headers)
            .unwrap_or_else(|| (StatusCode::NOT_FOUND, "not found").into_response())
    }

    /// Answer a request, or `None` when no page matches so the caller can
    /// try static assets before giving up.
    pub fn respond_matched(
        &self,
        method: &str,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Option<Response> {
        let path = uri.path();

        if is_favicon_request(path) {
            return Some(StatusCode::NOT_FOUND.into_response());
        }

        let (page, params) = match self.router.match_route(path) {
            Ok(matched) => matched,
            Err(_) => return None,
        };

        let ctx = RequestContext {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            params,
            query: parse_query(uri.query()),
            headers: headers_to_map(headers),
        };
        let partial = ctx.wants_partial();
        debug!(path, partial, route = %page.route, "serving page");

        let data = match (page.handler)(&ctx) {
            Ok(data) => data,
            Err(err) => return Some(error_response(&err)),
        };

        Some(into_axum_response(compose(&page.template, &data, partial)))
    }
}

fn error_response(err: &WextError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string()).into_response()
}

fn into_axum_response(composed: ComposedResponse) -> Response {
    let mut response = Html(composed.html).into_response();
    *response.status_mut() =
        StatusCode::from_u16(composed.status).unwrap_or(StatusCode::OK);
    for (name, value) in &composed.headers {
        if let (Ok(header_name), Ok(header_value)) = (
            axum::http::header::HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(header_name, header_value);
        }
    }
    response
}

fn headers_to_map(headers: &HeaderMap) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for (name, value) in headers {
        if let Ok(v) = value.to_str() {
            out.insert(name.as_str().to_string(), v.to_string());
        }
    }
    out
}

fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(query) = raw else {
        return out;
    };
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        out.insert(key.to_string(), value.to_string());
    }
    out
}
