//! Error types for the sift command line.

use thiserror::Error;

use crate::serialize::SerializeError;

/// Errors raised while loading configuration, reading records or running
/// a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A configuration layer held an unknown key or an invalid value.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Input could not be read as a list of records.
    #[error("invalid records: {0}")]
    Records(String),

    #[error(transparent)]
    Selector(#[from] sift_fields::SelectorError),

    #[error(transparent)]
    Meta(#[from] sift_meta::MetaError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub(crate) fn records(msg: impl std::fmt::Display) -> Self {
        CliError::Records(msg.to_string())
    }
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
