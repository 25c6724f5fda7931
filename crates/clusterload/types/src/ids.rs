//! Identifier types for instance and resource-version bookkeeping

use serde::{Deserialize, Serialize};

/// Identity of one logical group of replicated objects within a namespace.
///
/// Discovered by rendering the group's template, never declared: two bundle
/// entries with the same basename but different kinds are distinct groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstancesIdentifier {
    pub basename: String,
    pub object_kind: String,
    pub api_group: String,
}

impl InstancesIdentifier {
    pub fn new(
        basename: impl Into<String>,
        object_kind: impl Into<String>,
        api_group: impl Into<String>,
    ) -> Self {
        Self {
            basename: basename.into(),
            object_kind: object_kind.into(),
            api_group: api_group.into(),
        }
    }
}

impl std::fmt::Display for InstancesIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.api_group.is_empty() {
            write!(f, "{}/{}", self.object_kind, self.basename)
        } else {
            write!(f, "{}.{}/{}", self.object_kind, self.api_group, self.basename)
        }
    }
}

/// Key for the last observed resource version of a resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceTypeIdentifier {
    pub object_kind: String,
    pub api_group: String,
}

impl ResourceTypeIdentifier {
    pub fn new(object_kind: impl Into<String>, api_group: impl Into<String>) -> Self {
        Self {
            object_kind: object_kind.into(),
            api_group: api_group.into(),
        }
    }
}

impl std::fmt::Display for ResourceTypeIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.api_group.is_empty() {
            write!(f, "{}", self.object_kind)
        } else {
            write!(f, "{}.{}", self.object_kind, self.api_group)
        }
    }
}
