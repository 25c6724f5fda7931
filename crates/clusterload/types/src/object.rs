//! Unstructured cluster objects
//!
//! Rendered templates are kept as raw JSON maps: the engine only ever reads
//! `kind`, `apiVersion` and a few metadata fields, everything else is passed
//! through to the cluster untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Group, version and kind of an object, split out of `apiVersion` + `kind`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    /// Split an `apiVersion` string. The core group has no prefix (`v1`).
    pub fn from_api_version(api_version: &str, kind: impl Into<String>) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group.to_string(), version.to_string()),
            None => (String::new(), api_version.to_string()),
        };
        Self {
            group,
            version,
            kind: kind.into(),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl std::fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// An unstructured object. Always backed by a JSON map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object(Map<String, Value>);

impl Object {
    /// Wrap a JSON value; `None` unless it is a map.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn kind(&self) -> &str {
        self.str_field("kind")
    }

    pub fn api_version(&self) -> &str {
        self.str_field("apiVersion")
    }

    pub fn group_version_kind(&self) -> GroupVersionKind {
        GroupVersionKind::from_api_version(self.api_version(), self.kind())
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.metadata_str("resourceVersion")
    }

    pub fn set_name(&mut self, name: &str) {
        self.set_metadata("name", Value::String(name.to_string()));
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.set_metadata("namespace", Value::String(namespace.to_string()));
    }

    pub fn set_resource_version(&mut self, resource_version: &str) {
        self.set_metadata(
            "resourceVersion",
            Value::String(resource_version.to_string()),
        );
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
    }

    fn set_metadata(&mut self, key: &str, value: Value) {
        let metadata = self
            .0
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        if let Value::Object(map) = metadata {
            map.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gvk_core_group() {
        let gvk = GroupVersionKind::from_api_version("v1", "ConfigMap");
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.api_version(), "v1");
    }

    #[test]
    fn test_gvk_named_group() {
        let gvk = GroupVersionKind::from_api_version("apps/v1", "Deployment");
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.to_string(), "apps/v1, Kind=Deployment");
    }

    #[test]
    fn test_object_accessors() {
        let obj = Object::from_value(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web-0", "resourceVersion": "42"}
        }))
        .unwrap();

        assert_eq!(obj.kind(), "Deployment");
        assert_eq!(obj.group_version_kind().group, "apps");
        assert_eq!(obj.name(), Some("web-0"));
        assert_eq!(obj.resource_version(), Some("42"));
        assert_eq!(obj.namespace(), None);
    }

    #[test]
    fn test_set_metadata_creates_map() {
        let mut obj = Object::from_value(json!({"kind": "Service", "apiVersion": "v1"})).unwrap();
        obj.set_name("svc-1");
        obj.set_namespace("ns-1");
        obj.set_resource_version("7");

        assert_eq!(obj.name(), Some("svc-1"));
        assert_eq!(obj.namespace(), Some("ns-1"));
        assert_eq!(obj.resource_version(), Some("7"));
    }

    #[test]
    fn test_non_map_rejected() {
        assert!(Object::from_value(json!([1, 2])).is_none());
        assert!(Object::from_value(Value::Null).is_none());
    }
}
