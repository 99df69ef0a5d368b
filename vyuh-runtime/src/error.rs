//! Error types for the runtime.

use thiserror::Error;
use vyuh_content::ContentError;
use vyuh_di::DiError;
use vyuh_loader::LoaderError;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Two features share a name.
    #[error("feature already registered: {0}")]
    DuplicateFeature(String),

    #[error("feature '{feature}' failed to initialize: {source}")]
    FeatureInit {
        feature: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Di(#[from] DiError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Loader(#[from] LoaderError),
}
