//! Error types for resource metadata.

use thiserror::Error;

/// Errors raised while working with metadata and list options.
#[derive(Debug, Error)]
pub enum MetaError {
    /// The field selector of a list request did not parse.
    #[error(transparent)]
    Selector(#[from] sift_fields::SelectorError),

    /// Offset or limit was negative.
    #[error("invalid pagination: {name} must not be negative, got {value}")]
    InvalidPagination { name: &'static str, value: i64 },

    /// Extension attributes were not a JSON object.
    #[error("invalid extension attributes: {0}")]
    ExtenAttrs(#[from] serde_json::Error),
}

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, MetaError>;
