use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the wext serve path. Every variant is terminal for
/// the request it occurred in; there are no retries.
#[derive(Debug, Error)]
pub enum WextError {
    #[error("route not found: {0}")]
    RouteNotFound(String),
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error("page handler failed: {0}")]
    Handler(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl WextError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status the error maps to when it reaches the adapter.
    pub fn status(&self) -> u16 {
        match self {
            Self::RouteNotFound(_) | Self::AssetNotFound(_) => 404,
            Self::Handler(_) | Self::Config(_) | Self::Io { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_map_to_404() {
        assert_eq!(WextError::RouteNotFound("/x".to_string()).status(), 404);
        assert_eq!(WextError::AssetNotFound("/x.css".to_string()).status(), 404);
    }

    #[test]
    fn test_handler_failure_maps_to_500() {
        assert_eq!(WextError::Handler("boom".to_string()).status(), 500);
    }
}
