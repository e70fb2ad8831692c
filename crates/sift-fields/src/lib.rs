//! Field selectors: a small query language over flat string-keyed records.
//!
//! A field selector is a comma-separated list of terms, each comparing a
//! field with a value:
//!
//! ```text
//! status=active,tier!=free
//! ```
//!
//! All terms must hold for a record to match. Records are anything that
//! implements [`Fields`]; [`Set`] is the owned record type.
//!
//! # Quick Start
//!
//! ```rust
//! use sift_fields::{parse_selector, Operator, Set};
//!
//! let sel = parse_selector("status=active,tier!=free").unwrap();
//!
//! let pro = Set::from([("status", "active"), ("tier", "pro")]);
//! let free = Set::from([("status", "active"), ("tier", "free")]);
//! assert!(sel.matches(&pro));
//! assert!(!sel.matches(&free));
//!
//! // Equality on a field can be turned into an index lookup.
//! assert_eq!(sel.requires_exact_match("status"), Some("active"));
//!
//! let reqs = sel.requirements();
//! assert_eq!(reqs[1].operator, Operator::NotEquals);
//! ```
//!
//! # Syntax
//!
//! | Term | Meaning |
//! |------|---------|
//! | `f=v`, `f==v` | field `f` equals `v` |
//! | `f!=v` | field `f` differs from `v` |
//!
//! A missing field reads as the empty string, so `f=` matches records
//! without `f`. Within values, `\`, `,` and `=` must be escaped with a
//! backslash. Whitespace is significant.
//!
//! # Canonical Form
//!
//! Parsed selectors order their terms lexicographically and render values
//! escaped, so equal selectors produce equal strings:
//!
//! ```rust
//! use sift_fields::parse_selector;
//!
//! let a = parse_selector("b=2,a==1").unwrap();
//! let b = parse_selector("a=1,b=2").unwrap();
//! assert_eq!(a.to_string(), "a=1,b=2");
//! assert_eq!(a, b);
//! ```
//!
//! [`everything()`] and [`nothing()`] both render as `""`; parsing `""`
//! gives `everything()`.
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Set`], [`Requirement`] and
//!   [`Operator`].

mod error;
mod fields;
mod parse;
mod requirement;
mod selection;
mod selector;

// Re-export public API
pub use error::{Result, SelectorError};
pub use fields::{Fields, Set};
pub use parse::{
    escape_field, escape_value, parse_and_transform_selector, parse_selector, unescape_value,
};
pub use requirement::{Requirement, Requirements};
pub use selection::Operator;
pub use selector::{
    and_term, everything, nothing, one_term_equal_selector, one_term_not_equal_selector,
    selector_from_set, Selector,
};
