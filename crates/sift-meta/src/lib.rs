//! Metadata and request options shared by REST resources.
//!
//! Every stored resource embeds an [`ObjectMeta`]; list responses carry a
//! [`ListMeta`]. Requests carry a [`TypeMeta`] and an options struct such as
//! [`ListOptions`], whose `fieldSelector` is a [`sift_fields`] selector.
//!
//! ```rust
//! use sift_meta::{ListOptions, ObjectMeta};
//!
//! let objects = vec![ObjectMeta::new("web"), ObjectMeta::new("db")];
//! let sets: Vec<_> = objects.iter().map(ObjectMeta::field_set).collect();
//!
//! let opts = ListOptions::default().with_field_selector("name!=db");
//! let page = opts.select(&sets).unwrap();
//! assert_eq!(page.list_meta.total_count, 1);
//! ```

mod accessor;
mod error;
mod options;
mod types;

pub use accessor::{ListAccessor, ObjectAccessor, TypeAccessor};
pub use error::{MetaError, Result};
pub use options::{
    AuthorizeOptions, CreateOptions, DeleteOptions, ExportOptions, GetOptions, ListOptions, Page,
    PatchOptions, TableOptions, UpdateOptions,
};
pub use types::{ExtenAttrs, ListMeta, ObjectMeta, TypeMeta};
