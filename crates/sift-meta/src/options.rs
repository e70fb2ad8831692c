//! Request options for REST operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sift_fields::{parse_and_transform_selector, parse_selector, Fields, Selector};

use crate::error::{MetaError, Result};
use crate::types::{ListMeta, TypeMeta};

/// Options of a list request.
///
/// # Example
///
/// ```
/// use sift_meta::ListOptions;
/// use sift_fields::{Fields, Set};
///
/// let users = vec![
///     Set::from([("name", "ada"), ("role", "admin")]),
///     Set::from([("name", "bob"), ("role", "dev")]),
///     Set::from([("name", "cyd"), ("role", "dev")]),
/// ];
///
/// let opts = ListOptions::default()
///     .with_field_selector("role=dev")
///     .with_limit(1);
/// let page = opts.select(&users).unwrap();
///
/// assert_eq!(page.list_meta.total_count, 2);
/// assert_eq!(page.items.len(), 1);
/// assert_eq!(page.items[0].get("name"), "bob");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    /// Label selector, passed through untouched.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_selector: String,

    /// Field selector; empty selects everything.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field_selector: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl ListOptions {
    pub fn with_field_selector(mut self, selector: impl Into<String>) -> Self {
        self.field_selector = selector.into();
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: i64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Parses the field selector.
    pub fn field_selector(&self) -> Result<Selector> {
        Ok(parse_selector(&self.field_selector)?)
    }

    /// Parses the field selector and rewrites each term, e.g. to map API
    /// field names onto storage columns.
    pub fn field_selector_with<F, E>(&self, f: F) -> Result<Selector>
    where
        F: FnMut(&str, &str) -> std::result::Result<(String, String), E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Ok(parse_and_transform_selector(&self.field_selector, f)?)
    }

    /// Request timeout. Non-positive values mean no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_seconds {
            Some(secs) if secs > 0 => Some(Duration::from_secs(secs as u64)),
            _ => None,
        }
    }

    /// Filters `items` by the field selector, then applies offset and limit.
    ///
    /// The returned page's total count is the number of matches before
    /// pagination.
    pub fn select<'a, T: Fields>(&self, items: &'a [T]) -> Result<Page<'a, T>> {
        let offset = pagination("offset", self.offset)?.unwrap_or(0);
        let limit = pagination("limit", self.limit)?;
        let selector = self.field_selector()?;

        let matched: Vec<&'a T> = items.iter().filter(|item| selector.matches(*item)).collect();
        let total_count = matched.len() as i64;

        let paged = matched.into_iter().skip(offset);
        let items = match limit {
            Some(limit) => paged.take(limit).collect(),
            None => paged.collect(),
        };

        Ok(Page {
            list_meta: ListMeta { total_count },
            items,
        })
    }
}

fn pagination(name: &'static str, value: Option<i64>) -> Result<Option<usize>> {
    match value {
        None => Ok(None),
        Some(v) if v < 0 => Err(MetaError::InvalidPagination { name, value: v }),
        Some(v) => Ok(Some(usize::try_from(v).unwrap_or(usize::MAX))),
    }
}

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub list_meta: ListMeta,
    pub items: Vec<&'a T>,
}

impl<T> Page<'_, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> crate::accessor::ListAccessor for Page<'_, T> {
    fn list_meta(&self) -> &ListMeta {
        &self.list_meta
    }

    fn list_meta_mut(&mut self) -> &mut ListMeta {
        &mut self.list_meta
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    /// Delete permanently instead of soft-deleting.
    #[serde(default)]
    pub unscoped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(rename = "dryRun", default, skip_serializing_if = "Vec::is_empty")]
    pub dry_run: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(rename = "dryRun", default, skip_serializing_if = "Vec::is_empty")]
    pub dry_run: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(rename = "dryRun", default, skip_serializing_if = "Vec::is_empty")]
    pub dry_run: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(default)]
    pub export: bool,

    #[serde(default)]
    pub exact: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
}

/// Options for table rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    /// Local rendering flag, never sent over the wire.
    #[serde(skip)]
    pub no_headers: bool,
}
