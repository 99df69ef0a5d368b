//! Error types for content building.

use thiserror::Error;

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors that can occur while decoding or building content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// No item, descriptor, or builder layout is reachable for the type.
    #[error("no layout available for schema type '{schema_type}'")]
    NoLayoutAvailable { schema_type: String },

    /// The payload is not a content item.
    #[error("invalid content item: {0}")]
    InvalidItem(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
