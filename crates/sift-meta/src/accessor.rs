//! Accessor traits over resource metadata.
//!
//! Resources embed [`TypeMeta`], [`ObjectMeta`] or [`ListMeta`] and expose
//! them through these traits, so generic code can read and stamp metadata
//! without knowing the concrete resource type.

use chrono::{DateTime, Utc};

use crate::options::{
    AuthorizeOptions, CreateOptions, DeleteOptions, ExportOptions, GetOptions, ListOptions,
    PatchOptions, TableOptions, UpdateOptions,
};
use crate::types::{ListMeta, ObjectMeta, TypeMeta};

/// Access to a resource's kind and API version.
pub trait TypeAccessor {
    fn type_meta(&self) -> &TypeMeta;
    fn type_meta_mut(&mut self) -> &mut TypeMeta;

    fn kind(&self) -> &str {
        &self.type_meta().kind
    }

    fn set_kind(&mut self, kind: impl Into<String>)
    where
        Self: Sized,
    {
        self.type_meta_mut().kind = kind.into();
    }

    fn api_version(&self) -> &str {
        &self.type_meta().api_version
    }

    fn set_api_version(&mut self, version: impl Into<String>)
    where
        Self: Sized,
    {
        self.type_meta_mut().api_version = version.into();
    }
}

/// Access to the metadata of a stored resource.
///
/// # Example
///
/// ```
/// use sift_meta::{ObjectAccessor, ObjectMeta};
///
/// struct User {
///     meta: ObjectMeta,
///     email: String,
/// }
///
/// impl ObjectAccessor for User {
///     fn object_meta(&self) -> &ObjectMeta {
///         &self.meta
///     }
///
///     fn object_meta_mut(&mut self) -> &mut ObjectMeta {
///         &mut self.meta
///     }
/// }
///
/// let mut user = User { meta: ObjectMeta::new("ada"), email: "ada@example.com".into() };
/// user.set_id(3);
/// assert_eq!(user.id(), 3);
/// assert_eq!(user.name(), "ada");
/// ```
pub trait ObjectAccessor {
    fn object_meta(&self) -> &ObjectMeta;
    fn object_meta_mut(&mut self) -> &mut ObjectMeta;

    fn id(&self) -> u64 {
        self.object_meta().id
    }

    fn set_id(&mut self, id: u64) {
        self.object_meta_mut().id = id;
    }

    fn name(&self) -> &str {
        &self.object_meta().name
    }

    fn set_name(&mut self, name: impl Into<String>)
    where
        Self: Sized,
    {
        self.object_meta_mut().name = name.into();
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.object_meta().created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.object_meta_mut().created_at = Some(at);
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.object_meta().updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.object_meta_mut().updated_at = Some(at);
    }
}

/// Access to the metadata of a list response.
pub trait ListAccessor {
    fn list_meta(&self) -> &ListMeta;
    fn list_meta_mut(&mut self) -> &mut ListMeta;

    fn total_count(&self) -> i64 {
        self.list_meta().total_count
    }

    fn set_total_count(&mut self, total: i64) {
        self.list_meta_mut().total_count = total;
    }
}

impl TypeAccessor for TypeMeta {
    fn type_meta(&self) -> &TypeMeta {
        self
    }

    fn type_meta_mut(&mut self) -> &mut TypeMeta {
        self
    }
}

impl ObjectAccessor for ObjectMeta {
    fn object_meta(&self) -> &ObjectMeta {
        self
    }

    fn object_meta_mut(&mut self) -> &mut ObjectMeta {
        self
    }
}

impl ListAccessor for ListMeta {
    fn list_meta(&self) -> &ListMeta {
        self
    }

    fn list_meta_mut(&mut self) -> &mut ListMeta {
        self
    }
}

macro_rules! impl_type_accessor {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TypeAccessor for $ty {
                fn type_meta(&self) -> &TypeMeta {
                    &self.type_meta
                }

                fn type_meta_mut(&mut self) -> &mut TypeMeta {
                    &mut self.type_meta
                }
            }
        )*
    };
}

impl_type_accessor!(
    ListOptions,
    GetOptions,
    DeleteOptions,
    CreateOptions,
    UpdateOptions,
    PatchOptions,
    ExportOptions,
    AuthorizeOptions,
    TableOptions,
);
