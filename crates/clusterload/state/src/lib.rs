//! # clusterload State - Replica bookkeeping for a test run
//!
//! Holds what the engine last asked the cluster for, so that every phase can
//! diff its target against the previous one without listing the cluster.
//!
//! ## Key Components
//!
//! - [`NamespacesState`]: desired/current replica counts per (namespace, object group)
//! - [`ResourcesVersionState`]: last resource version seen per (kind, API group)
//! - [`State`]: container shared by every unit of work of one run
//!
//! Both stores are key-sharded: writers to different keys never contend on a
//! single lock, so phases running in parallel over disjoint namespaces do not
//! serialize on bookkeeping.
//!
//! The stores give per-key atomicity only. A phase owns the keys of its bundle
//! for its duration; the stores do not provide multi-key transactions.

pub mod error;
pub mod namespaces;
pub mod resource_versions;

pub use error::{Result, StateError};
pub use namespaces::{InstancesState, NamespacesState};
pub use resource_versions::ResourcesVersionState;

/// State shared by all concurrently executing phases of one test run
#[derive(Debug, Default)]
pub struct State {
    namespaces: NamespacesState,
    resource_versions: ResourcesVersionState,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespaces(&self) -> &NamespacesState {
        &self.namespaces
    }

    pub fn resource_versions(&self) -> &ResourcesVersionState {
        &self.resource_versions
    }
}
