//! Per-namespace instance state

use clusterload_types::{InstancesIdentifier, ObjectTemplate};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Replica bookkeeping for one object group in one namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancesState {
    /// Target of the most recent phase for this group
    pub desired_replica_count: u32,
    /// Count committed after the owning phase's actions were dispatched
    pub current_replica_count: u32,
    /// Template definition of the group
    pub object: ObjectTemplate,
}

impl InstancesState {
    /// Fresh state for a group never seen before
    pub fn new(object: ObjectTemplate) -> Self {
        Self {
            desired_replica_count: 0,
            current_replica_count: 0,
            object,
        }
    }
}

/// Instance states keyed by (namespace, object group)
#[derive(Debug, Default)]
pub struct NamespacesState {
    states: DashMap<(String, InstancesIdentifier), InstancesState>,
}

impl NamespacesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the state for a key
    pub fn get(&self, namespace: &str, id: &InstancesIdentifier) -> Option<InstancesState> {
        self.states
            .get(&(namespace.to_string(), id.clone()))
            .map(|s| s.clone())
    }

    pub fn set(&self, namespace: &str, id: &InstancesIdentifier, state: InstancesState) {
        tracing::trace!(
            namespace = namespace,
            object = %id,
            desired = state.desired_replica_count,
            current = state.current_replica_count,
            "Instance state updated"
        );
        self.states.insert((namespace.to_string(), id.clone()), state);
    }

    pub fn remove(&self, namespace: &str, id: &InstancesIdentifier) -> Option<InstancesState> {
        self.states
            .remove(&(namespace.to_string(), id.clone()))
            .map(|(_, s)| s)
    }

    /// Object groups tracked in a namespace
    pub fn identifiers(&self, namespace: &str) -> Vec<InstancesIdentifier> {
        self.states
            .iter()
            .filter(|entry| entry.key().0 == namespace)
            .map(|entry| entry.key().1.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web() -> (InstancesIdentifier, ObjectTemplate) {
        (
            InstancesIdentifier::new("web", "Deployment", "apps"),
            ObjectTemplate::new("web", "deployment.yaml"),
        )
    }

    #[test]
    fn test_get_missing() {
        let store = NamespacesState::new();
        let (id, _) = web();
        assert!(store.get("ns-1", &id).is_none());
    }

    #[test]
    fn test_set_then_get_is_snapshot() {
        let store = NamespacesState::new();
        let (id, object) = web();

        let mut state = InstancesState::new(object);
        state.desired_replica_count = 3;
        store.set("ns-1", &id, state.clone());

        let mut snapshot = store.get("ns-1", &id).unwrap();
        assert_eq!(snapshot, state);

        // Mutating the snapshot must not leak into the store.
        snapshot.current_replica_count = 3;
        assert_eq!(store.get("ns-1", &id).unwrap().current_replica_count, 0);
    }

    #[test]
    fn test_keys_are_namespace_scoped() {
        let store = NamespacesState::new();
        let (id, object) = web();

        let mut a = InstancesState::new(object.clone());
        a.current_replica_count = 1;
        let mut b = InstancesState::new(object);
        b.current_replica_count = 5;
        store.set("ns-1", &id, a);
        store.set("ns-2", &id, b);

        assert_eq!(store.get("ns-1", &id).unwrap().current_replica_count, 1);
        assert_eq!(store.get("ns-2", &id).unwrap().current_replica_count, 5);
        assert_eq!(store.identifiers("ns-2"), vec![id.clone()]);

        assert!(store.remove("ns-1", &id).is_some());
        assert_eq!(store.len(), 1);
    }
}
