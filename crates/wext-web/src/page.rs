use crate::error::WextError;
use crate::header_updates::{PARTIAL_CONTENT_HEADER, PARTIAL_CONTENT_QUERY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Per-request values handed to a page handler. Header names are lowercase.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub query: HashMap<String, String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl RequestContext {
    /// Navigation request flavor, recomputed per request: partial when the
    /// `X-Partial-Content` header or the `partialContent` query parameter
    /// carries a truthy value.
    pub fn wants_partial(&self) -> bool {
        let truthy = |v: &String| !v.is_empty() && v != "false" && v != "0";
        self.headers
            .get(PARTIAL_CONTENT_HEADER)
            .map(truthy)
            .unwrap_or(false)
            || self
                .query
                .get(PARTIAL_CONTENT_QUERY)
                .map(truthy)
                .unwrap_or(false)
    }
}

/// What a page handler produces: the body fragment, an optional head
/// fragment merged into the shell (or mined for a title update on partial
/// responses), and extra response headers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl PageData {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            head: None,
            headers: Vec::new(),
        }
    }

    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

pub type PageHandler = Arc<dyn Fn(&RequestContext) -> Result<PageData, WextError> + Send + Sync>;

/// A page descriptor: route pattern, shell template and handler. Built at
/// startup and immutable afterwards.
#[derive(Clone)]
pub struct Page {
    pub route: String,
    pub template: String,
    pub handler: PageHandler,
}

impl Page {
    pub fn new<F>(route: impl Into<String>, template: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<PageData, WextError> + Send + Sync + 'static,
    {
        Self {
            route: route.into(),
            template: template.into(),
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("route", &self.route)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
