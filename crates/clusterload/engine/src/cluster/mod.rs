//! Cluster API collaborator
//!
//! The engine never talks to a cluster directly; every mutation and every
//! namespace lifecycle call goes through [`ClusterClient`]. Retries and call
//! timeouts are the implementation's concern.

pub mod memory;

pub use memory::{InMemoryCluster, RecordedOperation};

use async_trait::async_trait;
use clusterload_types::{GroupVersionKind, Object};
use thiserror::Error;

/// Errors returned by a cluster client
#[derive(Debug, Clone, Error)]
pub enum ClusterError {
    #[error("{kind} {name:?} already exists in namespace {namespace:?}")]
    AlreadyExists {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("{kind} {name:?} not found in namespace {namespace:?}")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("cluster unavailable: {0}")]
    Unavailable(String),
}

/// Cluster API surface used by the engine
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Create an object; returns the object as stored by the cluster.
    async fn create_object(
        &self,
        namespace: &str,
        name: &str,
        object: &Object,
    ) -> Result<Object, ClusterError>;

    /// Update an existing object; returns the object as stored by the cluster.
    async fn patch_object(
        &self,
        namespace: &str,
        name: &str,
        object: &Object,
    ) -> Result<Object, ClusterError>;

    /// Delete an object by name.
    async fn delete_object(
        &self,
        gvk: &GroupVersionKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), ClusterError>;

    /// Namespaces managed under `prefix`.
    async fn list_automanaged_namespaces(&self, prefix: &str) -> Result<Vec<String>, ClusterError>;

    /// Create `<prefix>-1` through `<prefix>-<count>`.
    async fn create_automanaged_namespaces(
        &self,
        prefix: &str,
        count: u32,
    ) -> Result<(), ClusterError>;

    /// Delete every namespace managed under `prefix`, with its objects.
    async fn delete_automanaged_namespaces(&self, prefix: &str) -> Result<(), ClusterError>;
}
