//! In-memory simulated cluster
//!
//! Implements the full [`ClusterClient`] contract without a real API server:
//! objects live in a sharded map, every successful write is stamped with a
//! fresh resource version, and every call is journaled so callers can inspect
//! exactly what was sent.

use super::{ClusterClient, ClusterError};
use async_trait::async_trait;
use clusterload_types::{GroupVersionKind, Object, OperationType};
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ObjectKey {
    namespace: String,
    group: String,
    kind: String,
    name: String,
}

/// One journaled call against the simulated cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOperation {
    pub operation: OperationType,
    pub namespace: String,
    pub kind: String,
    pub name: String,
    pub succeeded: bool,
}

/// Simulated cluster for dry runs and tests
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    objects: DashMap<ObjectKey, Object>,
    namespaces: DashSet<String>,
    resource_version: AtomicU64,
    latency: Option<Duration>,
    failing_names: DashSet<String>,
    failing_namespace_ops: DashSet<&'static str>,
    journal: Mutex<Vec<RecordedOperation>>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every object call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every mutation of objects with this name fail
    pub fn inject_failure(&self, name: impl Into<String>) {
        self.failing_names.insert(name.into());
    }

    /// Make a namespace lifecycle call (`list`, `create`, `delete`) fail
    pub fn inject_namespace_failure(&self, call: &'static str) {
        self.failing_namespace_ops.insert(call);
    }

    /// Register a namespace directly, outside the automanaged lifecycle
    pub fn add_namespace(&self, name: impl Into<String>) {
        self.namespaces.insert(name.into());
    }

    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.iter().map(|n| n.clone()).collect();
        names.sort();
        names
    }

    pub fn get_object(
        &self,
        namespace: &str,
        gvk: &GroupVersionKind,
        name: &str,
    ) -> Option<Object> {
        self.objects
            .get(&Self::key(namespace, gvk, name))
            .map(|o| o.clone())
    }

    /// Sorted names of the objects of a kind in a namespace
    pub fn object_names(&self, namespace: &str, kind: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .iter()
            .filter(|e| e.key().namespace == namespace && e.key().kind == kind)
            .map(|e| e.key().name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn journal(&self) -> Vec<RecordedOperation> {
        self.journal.lock().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    fn key(namespace: &str, gvk: &GroupVersionKind, name: &str) -> ObjectKey {
        ObjectKey {
            namespace: namespace.to_string(),
            group: gvk.group.clone(),
            kind: gvk.kind.clone(),
            name: name.to_string(),
        }
    }

    fn record(&self, operation: OperationType, namespace: &str, kind: &str, name: &str, ok: bool) {
        self.journal.lock().push(RecordedOperation {
            operation,
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            succeeded: ok,
        });
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_injected(&self, name: &str) -> Result<(), ClusterError> {
        if self.failing_names.contains(name) {
            return Err(ClusterError::Rejected(format!("injected failure for {}", name)));
        }
        Ok(())
    }

    fn check_namespace_call(&self, call: &'static str) -> Result<(), ClusterError> {
        if self.failing_namespace_ops.contains(call) {
            return Err(ClusterError::Unavailable(format!(
                "injected failure for namespace {}",
                call
            )));
        }
        Ok(())
    }

    fn stamp(&self, namespace: &str, name: &str, object: &Object) -> Object {
        let version = self.resource_version.fetch_add(1, Ordering::SeqCst) + 1;
        let mut stored = object.clone();
        stored.set_name(name);
        if !namespace.is_empty() {
            stored.set_namespace(namespace);
        }
        stored.set_resource_version(&version.to_string());
        stored
    }

    fn is_automanaged(prefix: &str, namespace: &str) -> bool {
        namespace
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn create_object(
        &self,
        namespace: &str,
        name: &str,
        object: &Object,
    ) -> Result<Object, ClusterError> {
        self.simulate_latency().await;
        let gvk = object.group_version_kind();
        let result = self.check_injected(name).and_then(|_| {
            let key = Self::key(namespace, &gvk, name);
            match self.objects.entry(key) {
                dashmap::mapref::entry::Entry::Occupied(_) => Err(ClusterError::AlreadyExists {
                    kind: gvk.kind.clone(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                }),
                dashmap::mapref::entry::Entry::Vacant(slot) => {
                    let stored = self.stamp(namespace, name, object);
                    slot.insert(stored.clone());
                    Ok(stored)
                }
            }
        });
        self.record(OperationType::Create, namespace, &gvk.kind, name, result.is_ok());
        debug!(namespace, name, kind = %gvk.kind, ok = result.is_ok(), "Simulated create");
        result
    }

    async fn patch_object(
        &self,
        namespace: &str,
        name: &str,
        object: &Object,
    ) -> Result<Object, ClusterError> {
        self.simulate_latency().await;
        let gvk = object.group_version_kind();
        let result = self.check_injected(name).and_then(|_| {
            match self.objects.get_mut(&Self::key(namespace, &gvk, name)) {
                Some(mut existing) => {
                    let stored = self.stamp(namespace, name, object);
                    *existing = stored.clone();
                    Ok(stored)
                }
                None => Err(ClusterError::NotFound {
                    kind: gvk.kind.clone(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                }),
            }
        });
        self.record(OperationType::Patch, namespace, &gvk.kind, name, result.is_ok());
        debug!(namespace, name, kind = %gvk.kind, ok = result.is_ok(), "Simulated patch");
        result
    }

    async fn delete_object(
        &self,
        gvk: &GroupVersionKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), ClusterError> {
        self.simulate_latency().await;
        let result = self.check_injected(name).and_then(|_| {
            self.objects
                .remove(&Self::key(namespace, gvk, name))
                .map(|_| ())
                .ok_or_else(|| ClusterError::NotFound {
                    kind: gvk.kind.clone(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
        });
        self.record(OperationType::Delete, namespace, &gvk.kind, name, result.is_ok());
        debug!(namespace, name, kind = %gvk.kind, ok = result.is_ok(), "Simulated delete");
        result
    }

    async fn list_automanaged_namespaces(&self, prefix: &str) -> Result<Vec<String>, ClusterError> {
        self.check_namespace_call("list")?;
        Ok(self
            .namespaces()
            .into_iter()
            .filter(|ns| Self::is_automanaged(prefix, ns))
            .collect())
    }

    async fn create_automanaged_namespaces(
        &self,
        prefix: &str,
        count: u32,
    ) -> Result<(), ClusterError> {
        self.check_namespace_call("create")?;
        for i in 1..=count {
            let name = format!("{}-{}", prefix, i);
            if !self.namespaces.insert(name.clone()) {
                return Err(ClusterError::AlreadyExists {
                    kind: "Namespace".into(),
                    namespace: String::new(),
                    name,
                });
            }
        }
        Ok(())
    }

    async fn delete_automanaged_namespaces(&self, prefix: &str) -> Result<(), ClusterError> {
        self.check_namespace_call("delete")?;
        let doomed: Vec<String> = self
            .namespaces()
            .into_iter()
            .filter(|ns| Self::is_automanaged(prefix, ns))
            .collect();
        for namespace in &doomed {
            self.namespaces.remove(namespace);
            self.objects.retain(|key, _| &key.namespace != namespace);
        }
        Ok(())
    }
}
