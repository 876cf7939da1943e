//! Ordered page table with static and `:name` parameter segments.

use crate::error::WextError;
use crate::page::Page;
use std::collections::HashMap;

/// Route table over the configured pages. First match wins; the table is
/// immutable once built.
#[derive(Debug, Clone, Default)]
pub struct PageRouter {
    pages: Vec<Page>,
}

impl PageRouter {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Match a request path against the table in declaration order.
    pub fn match_route(&self, path: &str) -> Result<(&Page, HashMap<String, String>), WextError> {
        for page in &self.pages {
            if let Some(params) = match_pattern(&page.route, path) {
                return Ok((page, params));
            }
        }
        Err(WextError::RouteNotFound(path.to_string()))
    }
}

/// Match a single pattern, capturing `:name` segments. Trailing slashes are
/// ignored on both sides; captured segments must be non-empty.
pub fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_segments: Vec<&str> = segments(pattern);
    let path_segments: Vec<&str> = segments(path);

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pat, seg) in pattern_segments.iter().zip(path_segments.iter()) {
        if let Some(name) = pat.strip_prefix(':') {
            if seg.is_empty() {
                return None;
            }
            params.insert(name.to_string(), (*seg).to_string());
        } else if pat != seg {
            return None;
        }
    }

    Some(params)
}

fn segments(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}
