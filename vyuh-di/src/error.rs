//! Error types for the DI container.

use thiserror::Error;

/// Result type for container operations.
pub type DiResult<T> = Result<T, DiError>;

/// Errors raised when resolving a dependency.
///
/// All of these are wiring mistakes rather than runtime conditions.
#[derive(Debug, Error)]
pub enum DiError {
    /// Nothing was registered under the key.
    #[error("dependency not registered: {key}")]
    NotRegistered { key: String },

    /// The factory returned an error. Nothing was memoized.
    #[error("factory for '{key}' failed: {source}")]
    FactoryFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The registered value is not of the requested type.
    #[error("dependency '{key}' is a {actual}, requested {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl DiError {
    /// The key the failing lookup was made with.
    pub fn key(&self) -> &str {
        match self {
            Self::NotRegistered { key }
            | Self::FactoryFailed { key, .. }
            | Self::TypeMismatch { key, .. } => key,
        }
    }
}
