//! Records that selectors match against.
//!
//! A record is anything implementing [`Fields`]: a lookup from field name to
//! string value where a missing field reads as the empty string. [`Set`] is
//! the owned record type provided by this crate.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use crate::selector::Selector;

/// Read access to the fields of a record.
///
/// # Example
///
/// ```
/// use sift_fields::Fields;
///
/// struct Pod {
///     name: String,
///     phase: String,
/// }
///
/// impl Fields for Pod {
///     fn has(&self, field: &str) -> bool {
///         matches!(field, "name" | "status.phase")
///     }
///
///     fn get(&self, field: &str) -> &str {
///         match field {
///             "name" => &self.name,
///             "status.phase" => &self.phase,
///             _ => "",
///         }
///     }
/// }
/// ```
pub trait Fields {
    /// Returns `true` if the field is present.
    fn has(&self, field: &str) -> bool;

    /// Returns the value of the field, or `""` when it is absent.
    fn get(&self, field: &str) -> &str;
}

impl<S: BuildHasher> Fields for HashMap<String, String, S> {
    fn has(&self, field: &str) -> bool {
        self.contains_key(field)
    }

    fn get(&self, field: &str) -> &str {
        HashMap::get(self, field).map(String::as_str).unwrap_or("")
    }
}

impl Fields for BTreeMap<String, String> {
    fn has(&self, field: &str) -> bool {
        self.contains_key(field)
    }

    fn get(&self, field: &str) -> &str {
        BTreeMap::get(self, field).map(String::as_str).unwrap_or("")
    }
}

impl<T: Fields + ?Sized> Fields for &T {
    fn has(&self, field: &str) -> bool {
        (**self).has(field)
    }

    fn get(&self, field: &str) -> &str {
        (**self).get(field)
    }
}

/// An owned record: a map from field name to value.
///
/// Iteration follows field-name order. The [`Display`](fmt::Display) form
/// is `field=value` entries joined by `,`, sorted by the composed entry and
/// written without escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Set(BTreeMap<String, String>);

impl Set {
    /// Creates an empty record.
    pub fn new() -> Self {
        Set::default()
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(field.into(), value.into())
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converts the record into an equality selector.
    ///
    /// See [`selector_from_set`](crate::selector_from_set).
    pub fn as_selector(&self) -> Selector {
        crate::selector::selector_from_set(self)
    }

    /// Consumes the record, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl Fields for Set {
    fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        entries.sort();
        f.write_str(&entries.join(","))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Set {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Set(iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Set {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Set {
    fn from(map: BTreeMap<String, String>) -> Self {
        Set(map)
    }
}

impl<S: BuildHasher> From<HashMap<String, String, S>> for Set {
    fn from(map: HashMap<String, String, S>) -> Self {
        map.into_iter().collect()
    }
}

impl IntoIterator for Set {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
