pub mod adapters;
pub mod compose;
pub mod error;
pub mod header_updates;
pub mod navigator;
pub mod page;
pub mod router;
pub mod template;

#[cfg(feature = "axum")]
pub use adapters::axum::AxumWextAdapter;
pub use compose::{ComposedResponse, compose, is_favicon_request};
pub use error::WextError;
pub use header_updates::{
    Encoding, HEADER_UPDATES_HEADER, HeaderUpdates, PARTIAL_CONTENT_HEADER, PARTIAL_CONTENT_QUERY,
    PROTOCOL_REVISION, extract_title,
};
pub use navigator::{
    CompletionOutcome, FetchedFragment, FragmentFetcher, NavigationId, NavigationStart, Navigator,
    NavigatorState, PRELOAD_DELAY,
};
pub use page::{Page, PageData, PageHandler, RequestContext};
pub use router::{PageRouter, match_pattern};
pub use template::{ROUTER_CLOSE, ROUTER_OPEN, merge_head, post_content, pre_content};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The browser half of the protocol, served verbatim at /wext-client.js.
pub const WEXT_CLIENT_JS: &str = include_str!("wext-client.js");

/// Server settings, loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub serve_static: Option<PathBuf>,
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            serve_static: None,
        }
    }
}

/// Process-wide configuration: server settings plus the page table.
#[derive(Debug, Clone, Default)]
pub struct WextConfig {
    pub server: ServerConfig,
    pub pages: Vec<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_script_is_embedded() {
        assert!(!WEXT_CLIENT_JS.is_empty());
        assert!(WEXT_CLIENT_JS.contains("X-Partial-Content"));
        assert!(WEXT_CLIENT_JS.contains("X-Header-Updates"));
        assert!(WEXT_CLIENT_JS.contains("wext-link"));
        assert!(
            WEXT_CLIENT_JS.contains("++this.navigationId"),
            "client must carry the supersede guard"
        );
    }

    #[test]
    fn test_server_config_defaults() {
        let cfg: ServerConfig = serde_json::from_str("{}").expect("empty object must parse");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.serve_static, None);
    }

    #[test]
    fn test_server_config_camel_case_fields() {
        let cfg: ServerConfig =
            serde_json::from_str(r#"{"port":8080,"serveStatic":"public"}"#)
                .expect("config must parse");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.serve_static, Some(PathBuf::from("public")));
    }
}
