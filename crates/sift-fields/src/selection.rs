//! Comparison operators for selector requirements.
//!
//! The [`Operator`] enum is the full vocabulary shared with label selectors.
//! Field selectors only ever produce and evaluate the equality family:
//! [`Operator::Equals`], [`Operator::DoubleEquals`] and [`Operator::NotEquals`].

use std::fmt;
use std::str::FromStr;

use crate::error::SelectorError;

/// Comparison operator of a [`Requirement`](crate::Requirement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    /// Value is one of a set (`in`).
    #[cfg_attr(feature = "serde", serde(rename = "in"))]
    In,
    /// Value is none of a set (`notin`).
    #[cfg_attr(feature = "serde", serde(rename = "notin"))]
    NotIn,
    /// Field is present (`exists`).
    #[cfg_attr(feature = "serde", serde(rename = "exists"))]
    Exists,
    /// Field is absent (`!`).
    #[cfg_attr(feature = "serde", serde(rename = "!"))]
    DoesNotExist,
    /// Equal (`=`).
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Equals,
    /// Equal, double form (`==`). Same meaning as [`Operator::Equals`].
    #[cfg_attr(feature = "serde", serde(rename = "=="))]
    DoubleEquals,
    /// Not equal (`!=`).
    #[cfg_attr(feature = "serde", serde(rename = "!="))]
    NotEquals,
    /// Less than (`lt`).
    #[cfg_attr(feature = "serde", serde(rename = "lt"))]
    LessThan,
    /// Greater than (`gt`).
    #[cfg_attr(feature = "serde", serde(rename = "gt"))]
    GreaterThan,
}

impl Operator {
    /// All operators in declaration order.
    pub const ALL: [Operator; 9] = [
        Operator::In,
        Operator::NotIn,
        Operator::Exists,
        Operator::DoesNotExist,
        Operator::Equals,
        Operator::DoubleEquals,
        Operator::NotEquals,
        Operator::LessThan,
        Operator::GreaterThan,
    ];

    /// Returns the textual tag of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::In => "in",
            Operator::NotIn => "notin",
            Operator::Exists => "exists",
            Operator::DoesNotExist => "!",
            Operator::Equals => "=",
            Operator::DoubleEquals => "==",
            Operator::NotEquals => "!=",
            Operator::LessThan => "lt",
            Operator::GreaterThan => "gt",
        }
    }

    /// Returns `true` for the operators a field selector can parse and match.
    pub fn is_field_op(self) -> bool {
        matches!(
            self,
            Operator::Equals | Operator::DoubleEquals | Operator::NotEquals
        )
    }

    /// Folds `==` onto `=`; every other operator is returned unchanged.
    pub fn normalize(self) -> Operator {
        match self {
            Operator::DoubleEquals => Operator::Equals,
            other => other,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| SelectorError::UnknownOperator {
                selector: s.to_string(),
                term: s.to_string(),
            })
    }
}
