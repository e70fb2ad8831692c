//! The selector algebra.
//!
//! A [`Selector`] is a predicate over [`Fields`]. It is a plain value: every
//! operation that would change it ([`Selector::transform`],
//! [`Selector::deep_copy`]) returns a new selector instead.
//!
//! # Variants
//!
//! | Selector | Matches | Empty |
//! |----------|---------|-------|
//! | [`everything()`] (`And([])`) | every record | yes |
//! | [`nothing()`] | no record | no |
//! | `Equal { field, value }` | `record.get(field) == value` | no |
//! | `NotEqual { field, value }` | `record.get(field) != value` | no |
//! | `And(children)` | all children match | all children empty |
//!
//! `everything()` and `nothing()` both render as the empty string; parsing
//! `""` always yields `everything()`. The same holds inside a conjunction, so
//! rendering does not round-trip once `nothing()` is nested in `And`.

use std::fmt;

use crate::fields::{Fields, Set};
use crate::parse::{escape_field, escape_value};
use crate::requirement::{Requirement, Requirements};
use crate::selection::Operator;

/// A field selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Matches no record.
    Nothing,
    /// Matches when the field equals the value.
    Equal { field: String, value: String },
    /// Matches when the field differs from the value.
    NotEqual { field: String, value: String },
    /// Matches when every child matches. With no children this is the
    /// tautology returned by [`everything()`].
    And(Vec<Selector>),
}

impl Selector {
    /// Returns `true` if the record satisfies this selector.
    pub fn matches<F: Fields + ?Sized>(&self, fields: &F) -> bool {
        match self {
            Selector::Nothing => false,
            Selector::Equal { field, value } => fields.get(field) == value,
            Selector::NotEqual { field, value } => fields.get(field) != value,
            Selector::And(children) => children.iter().all(|s| s.matches(fields)),
        }
    }

    /// Returns `true` if this selector places no constraint on records.
    pub fn is_empty(&self) -> bool {
        match self {
            Selector::Nothing | Selector::Equal { .. } | Selector::NotEqual { .. } => false,
            Selector::And(children) => children.iter().all(Selector::is_empty),
        }
    }

    /// Returns `true` for the contradiction returned by [`nothing()`].
    pub fn is_nothing(&self) -> bool {
        matches!(self, Selector::Nothing)
    }

    /// Returns the value `field` must equal for this selector to match,
    /// if the selector pins it with an equality term.
    ///
    /// Conjunctions answer with their first child that pins the field.
    pub fn requires_exact_match(&self, field: &str) -> Option<&str> {
        match self {
            Selector::Equal { field: f, value } if f == field => Some(value.as_str()),
            Selector::And(children) => children
                .iter()
                .find_map(|s| s.requires_exact_match(field)),
            _ => None,
        }
    }

    /// Rewrites every `(field, value)` pair with `f`, returning a new
    /// selector of the same shape.
    ///
    /// - A term for which `f` returns `("", "")` becomes [`everything()`].
    /// - Conjunctions drop children that become empty.
    /// - The first error from `f` is returned as-is.
    ///
    /// # Example
    ///
    /// ```
    /// use sift_fields::parse_selector;
    ///
    /// let sel = parse_selector("metadata.name=web,spec.node=n1").unwrap();
    /// let renamed = sel
    ///     .transform(|field, value| -> Result<_, std::convert::Infallible> {
    ///         Ok((field.trim_start_matches("metadata.").to_string(), value.to_string()))
    ///     })
    ///     .unwrap();
    /// assert_eq!(renamed.to_string(), "name=web,spec.node=n1");
    /// ```
    pub fn transform<F, E>(&self, mut f: F) -> Result<Selector, E>
    where
        F: FnMut(&str, &str) -> Result<(String, String), E>,
    {
        self.transform_with(&mut f)
    }

    fn transform_with<F, E>(&self, f: &mut F) -> Result<Selector, E>
    where
        F: FnMut(&str, &str) -> Result<(String, String), E>,
    {
        match self {
            Selector::Nothing => Ok(Selector::Nothing),
            Selector::Equal { field, value } => {
                let (field, value) = f(field, value)?;
                Ok(term_or_everything(field, value, |field, value| {
                    Selector::Equal { field, value }
                }))
            }
            Selector::NotEqual { field, value } => {
                let (field, value) = f(field, value)?;
                Ok(term_or_everything(field, value, |field, value| {
                    Selector::NotEqual { field, value }
                }))
            }
            Selector::And(children) => {
                let mut out = Vec::with_capacity(children.len());
                for child in children {
                    let next = child.transform_with(f)?;
                    if !next.is_empty() {
                        out.push(next);
                    }
                }
                Ok(Selector::And(out))
            }
        }
    }

    /// Flattens the selector into the requirements it enforces, in order.
    pub fn requirements(&self) -> Requirements {
        match self {
            Selector::Nothing => Vec::new(),
            Selector::Equal { field, value } => {
                vec![Requirement::new(field.clone(), Operator::Equals, value.clone())]
            }
            Selector::NotEqual { field, value } => {
                vec![Requirement::new(field.clone(), Operator::NotEquals, value.clone())]
            }
            Selector::And(children) => children.iter().flat_map(Selector::requirements).collect(),
        }
    }

    /// Returns a structurally independent copy.
    ///
    /// Empty selectors always copy to [`everything()`].
    pub fn deep_copy(&self) -> Selector {
        if self.is_empty() {
            return everything();
        }
        self.clone()
    }
}

fn term_or_everything(
    field: String,
    value: String,
    build: impl FnOnce(String, String) -> Selector,
) -> Selector {
    if field.is_empty() && value.is_empty() {
        everything()
    } else {
        build(field, value)
    }
}

impl Default for Selector {
    fn default() -> Self {
        everything()
    }
}

/// Canonical selector syntax; values are escaped.
///
/// `Nothing` renders as an empty term. On its own that reads back as
/// `everything()`, and as a conjunction child it leaves an empty term
/// behind: `and_term([one_term_equal_selector("a", "1"), nothing()])`
/// renders as `a=1,`, which parses to a selector matching `a=1`.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Nothing => Ok(()),
            Selector::Equal { field, value } => {
                write!(f, "{}={}", escape_field(field), escape_value(value))
            }
            Selector::NotEqual { field, value } => {
                write!(f, "{}!={}", escape_field(field), escape_value(value))
            }
            Selector::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
        }
    }
}

/// Returns the selector that matches every record.
pub fn everything() -> Selector {
    Selector::And(Vec::new())
}

/// Returns the selector that matches no record.
pub fn nothing() -> Selector {
    Selector::Nothing
}

/// Returns a selector matching records where `field` equals `value`.
pub fn one_term_equal_selector(field: impl Into<String>, value: impl Into<String>) -> Selector {
    Selector::Equal {
        field: field.into(),
        value: value.into(),
    }
}

/// Returns a selector matching records where `field` differs from `value`.
pub fn one_term_not_equal_selector(
    field: impl Into<String>,
    value: impl Into<String>,
) -> Selector {
    Selector::NotEqual {
        field: field.into(),
        value: value.into(),
    }
}

/// Builds a conjunction of the given selectors as-is (no flattening).
pub fn and_term(selectors: impl IntoIterator<Item = Selector>) -> Selector {
    Selector::And(selectors.into_iter().collect())
}

/// Converts a record into a selector requiring every field to equal its value.
///
/// An empty record gives [`everything()`], a single field gives a bare
/// equality term, anything larger a conjunction in the record's order.
pub fn selector_from_set(set: &Set) -> Selector {
    let mut terms: Vec<Selector> = set
        .iter()
        .map(|(field, value)| one_term_equal_selector(field, value))
        .collect();

    match terms.len() {
        0 => everything(),
        1 => terms.remove(0),
        _ => Selector::And(terms),
    }
}
