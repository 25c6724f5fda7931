//! Last observed resource versions per resource type

use crate::error::{Result, StateError};
use clusterload_types::ResourceTypeIdentifier;
use dashmap::DashMap;

/// Resource versions keyed by (kind, API group)
#[derive(Debug, Default)]
pub struct ResourcesVersionState {
    versions: DashMap<ResourceTypeIdentifier, u64>,
}

impl ResourcesVersionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resource version as returned by the cluster.
    ///
    /// Versions are opaque strings on the wire but numeric in practice; a
    /// non-numeric version is rejected and leaves the stored value untouched.
    pub fn set(&self, resource: &ResourceTypeIdentifier, version: &str) -> Result<()> {
        let parsed = version
            .parse::<u64>()
            .map_err(|e| StateError::InvalidResourceVersion {
                resource: resource.clone(),
                version: version.to_string(),
                reason: e.to_string(),
            })?;
        self.versions.insert(resource.clone(), parsed);
        Ok(())
    }

    pub fn get(&self, resource: &ResourceTypeIdentifier) -> Option<u64> {
        self.versions.get(resource).map(|v| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = ResourcesVersionState::new();
        let rt = ResourceTypeIdentifier::new("Deployment", "apps");
        store.set(&rt, "100").unwrap();
        store.set(&rt, "101").unwrap();
        assert_eq!(store.get(&rt), Some(101));
    }

    #[test]
    fn test_invalid_version_keeps_previous() {
        let store = ResourcesVersionState::new();
        let rt = ResourceTypeIdentifier::new("Deployment", "apps");
        store.set(&rt, "5").unwrap();

        let err = store.set(&rt, "not-a-number").unwrap_err();
        assert!(err.to_string().contains("not-a-number"));
        assert_eq!(store.get(&rt), Some(5));
    }

    #[test]
    fn test_empty_version_rejected() {
        let store = ResourcesVersionState::new();
        let rt = ResourceTypeIdentifier::new("Service", "");
        assert!(store.set(&rt, "").is_err());
        assert_eq!(store.get(&rt), None);
    }
}
