//! Error types for the field selector crate.

use thiserror::Error;

/// Errors produced while parsing or transforming a field selector.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// A term had no recognizable operator.
    #[error("invalid selector: '{selector}'; can't split term: '{term}'")]
    MalformedTerm { selector: String, term: String },

    /// A term was split on an operator the field selector does not support.
    #[error("invalid selector: '{selector}'; can't understand value: '{term}'")]
    UnknownOperator { selector: String, term: String },

    /// A backslash was followed by something other than `\`, `,` or `=`,
    /// or the value ended in a lone backslash.
    #[error("invalid field selector: invalid escape sequence: {0}")]
    InvalidEscapeSequence(String),

    /// A reserved character appeared unescaped inside a value.
    #[error("invalid field selector: unescaped character in value: {0}")]
    UnescapedRune(char),

    /// The transform function supplied to the parser failed.
    #[error(transparent)]
    Transform(Box<dyn std::error::Error + Send + Sync>),
}

impl SelectorError {
    /// Wraps an arbitrary transform failure.
    pub fn transform<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        SelectorError::Transform(err.into())
    }

    /// Returns the offending term for term-level errors.
    pub fn term(&self) -> Option<&str> {
        match self {
            SelectorError::MalformedTerm { term, .. }
            | SelectorError::UnknownOperator { term, .. } => Some(term),
            _ => None,
        }
    }
}

/// Result type for selector operations.
pub type Result<T> = std::result::Result<T, SelectorError>;
