//! Requirement triples extracted from selectors.

use std::fmt;

use crate::parse::{escape_field, escape_value};
use crate::selection::Operator;

/// A single `(field, operator, value)` constraint.
///
/// Requirements carry no match logic. They are produced by
/// [`Selector::requirements`](crate::Selector::requirements) so callers can
/// inspect or translate a selector, for example into a database query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Requirement {
    /// The comparison operator.
    pub operator: Operator,
    /// The field name.
    pub field: String,
    /// The value compared against.
    pub value: String,
}

impl Requirement {
    /// Creates a new requirement.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Requirement {
            operator,
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Renders the requirement in selector syntax, e.g. `tier!=free`.
impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            escape_field(&self.field),
            self.operator,
            escape_value(&self.value)
        )
    }
}

/// Requirements in the order a selector enforces them.
pub type Requirements = Vec<Requirement>;
