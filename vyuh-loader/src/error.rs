//! Error types for document loading.

use std::time::Duration;
use thiserror::Error;

/// Result type for loader and transport operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors surfaced by a [`DocumentLoader`](crate::DocumentLoader).
///
/// Cloneable so it can live inside [`LoaderState`](crate::LoaderState).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoaderError {
    /// Transport or network failure.
    #[error("network error: {0}")]
    Network(String),

    /// The fetch did not complete within the configured timeout.
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The document was returned but is not a valid content item.
    #[error("document decode failed: {0}")]
    Decode(String),

    /// The CMS refused the query.
    #[error("query rejected: {0}")]
    Rejected(String),

    /// `refresh` was called on a loader created with refresh disabled.
    #[error("refresh is disabled for this loader")]
    RefreshDisabled,

    /// The transport has no update stream.
    #[error("live updates are not supported by this transport")]
    LiveUnsupported,

    /// The loader was disposed.
    #[error("loader disposed")]
    Disposed,
}

impl LoaderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_and_timeout_are_transient() {
        assert!(LoaderError::Network("reset".into()).is_transient());
        assert!(LoaderError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!LoaderError::Decode("missing _type".into()).is_transient());
        assert!(!LoaderError::Rejected("syntax".into()).is_transient());
        assert!(!LoaderError::RefreshDisabled.is_transient());
    }

    #[test]
    fn display_includes_detail() {
        assert_eq!(
            LoaderError::Network("connection reset".into()).to_string(),
            "network error: connection reset"
        );
        assert_eq!(
            LoaderError::Timeout(Duration::from_millis(250)).to_string(),
            "fetch timed out after 250ms"
        );
    }
}
