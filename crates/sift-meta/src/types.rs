//! Metadata carried by every REST resource and list response.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sift_fields::Set;

use crate::error::Result;

/// Kind and API version of a resource or request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    /// Resource kind, e.g. `User`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    /// API version, e.g. `v1`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
}

impl TypeMeta {
    pub fn new(kind: impl Into<String>, api_version: impl Into<String>) -> Self {
        TypeMeta {
            kind: kind.into(),
            api_version: api_version.into(),
        }
    }
}

/// Metadata of a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Number of matching items before pagination.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_count: i64,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

fn is_zero_u64(n: &u64) -> bool {
    *n == 0
}

/// Free-form extension attributes stored alongside a resource.
///
/// Renders as compact JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtenAttrs(Map<String, Value>);

impl ExtenAttrs {
    pub fn new() -> Self {
        ExtenAttrs::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Adds the keys of a JSON object that are not already present.
    ///
    /// Existing keys keep their values. An empty string is a no-op.
    pub fn merge(&mut self, attrs_json: &str) -> Result<()> {
        if attrs_json.is_empty() {
            return Ok(());
        }
        let incoming: Map<String, Value> = serde_json::from_str(attrs_json)?;
        for (key, value) in incoming {
            self.0.entry(key).or_insert(value);
        }
        Ok(())
    }

    /// Parses attributes from a JSON object string.
    pub fn from_json(attrs_json: &str) -> Result<Self> {
        Ok(ExtenAttrs(serde_json::from_str(attrs_json)?))
    }
}

impl fmt::Display for ExtenAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Map<String, Value>> for ExtenAttrs {
    fn from(map: Map<String, Value>) -> Self {
        ExtenAttrs(map)
    }
}

/// Metadata common to every stored resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Storage row id. Not a stable identifier.
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub id: u64,

    /// Unique instance id, usually `prefix-xxxxxx`.
    #[serde(rename = "instanceID", default, skip_serializing_if = "String::is_empty")]
    pub instance_id: String,

    /// User-chosen resource name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(rename = "extn", default, skip_serializing_if = "ExtenAttrs::is_empty")]
    pub exten_attrs: ExtenAttrs,

    /// Storage form of `exten_attrs`; see [`ObjectMeta::before_save`].
    #[serde(skip)]
    pub exten_shadow: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectMeta {
            name: name.into(),
            ..ObjectMeta::default()
        }
    }

    /// Writes the extension attributes into the shadow column.
    pub fn before_save(&mut self) {
        self.exten_shadow = self.exten_attrs.to_string();
    }

    /// Restores the extension attributes from the shadow column.
    pub fn after_load(&mut self) -> Result<()> {
        self.exten_attrs = if self.exten_shadow.is_empty() {
            ExtenAttrs::new()
        } else {
            ExtenAttrs::from_json(&self.exten_shadow)?
        };
        Ok(())
    }

    /// Returns the selectable fields of this object: `id`, `instanceID`
    /// and `name`.
    pub fn field_set(&self) -> Set {
        Set::from([
            ("id", self.id.to_string()),
            ("instanceID", self.instance_id.clone()),
            ("name", self.name.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_meta_json_names() {
        let tm = TypeMeta::new("User", "v1");
        assert_eq!(
            serde_json::to_value(&tm).unwrap(),
            json!({"kind": "User", "api_version": "v1"})
        );
        assert_eq!(serde_json::to_value(TypeMeta::default()).unwrap(), json!({}));
    }

    #[test]
    fn exten_attrs_merge_keeps_existing() {
        let mut attrs = ExtenAttrs::new();
        attrs.insert("color", "red");
        attrs
            .merge(r#"{"color": "blue", "size": 3}"#)
            .unwrap();
        assert_eq!(attrs.get("color"), Some(&json!("red")));
        assert_eq!(attrs.get("size"), Some(&json!(3)));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn exten_attrs_merge_empty_is_noop() {
        let mut attrs = ExtenAttrs::new();
        attrs.merge("").unwrap();
        assert!(attrs.is_empty());
    }

    #[test]
    fn exten_attrs_merge_rejects_non_object() {
        let mut attrs = ExtenAttrs::new();
        assert!(attrs.merge("[1, 2]").is_err());
        assert!(attrs.merge("{").is_err());
    }

    #[test]
    fn exten_attrs_display_is_json() {
        let mut attrs = ExtenAttrs::new();
        attrs.insert("a", 1);
        assert_eq!(attrs.to_string(), r#"{"a":1}"#);
        assert_eq!(ExtenAttrs::new().to_string(), "{}");
    }

    #[test]
    fn object_meta_shadow_round_trip() {
        let mut meta = ObjectMeta::new("web");
        meta.exten_attrs.insert("team", "infra");
        meta.before_save();
        assert_eq!(meta.exten_shadow, r#"{"team":"infra"}"#);

        let mut loaded = ObjectMeta {
            exten_shadow: meta.exten_shadow.clone(),
            ..ObjectMeta::new("web")
        };
        loaded.after_load().unwrap();
        assert_eq!(loaded.exten_attrs, meta.exten_attrs);
    }

    #[test]
    fn object_meta_after_load_invalid_shadow() {
        let mut meta = ObjectMeta {
            exten_shadow: "not json".to_string(),
            ..ObjectMeta::default()
        };
        assert!(meta.after_load().is_err());
    }

    #[test]
    fn object_meta_json_shape() {
        let mut meta = ObjectMeta::new("web");
        meta.id = 7;
        meta.instance_id = "app-x1y2z3".to_string();
        meta.exten_shadow = "ignored".to_string();
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({"id": 7, "instanceID": "app-x1y2z3", "name": "web"})
        );
    }

    #[test]
    fn object_meta_field_set() {
        let mut meta = ObjectMeta::new("web");
        meta.id = 42;
        let set = meta.field_set();
        assert_eq!(set.to_string(), "id=42,instanceID=,name=web");
    }
}
