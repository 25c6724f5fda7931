//! Engine error types

use crate::cluster::ClusterError;
use crate::measurement::MeasurementError;
use crate::template::TemplateError;
use crate::tuning::TuningSetError;
use clusterload_state::StateError;
use thiserror::Error;

/// A single failure recorded during a test run.
///
/// Every layer records these into an [`ErrorList`](crate::ErrorList) rather
/// than returning early, so one failing object never hides another.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("reading template ({path}) error: {source}")]
    Template {
        path: String,
        #[source]
        source: TemplateError,
    },

    #[error("reading template ({path}) for deletion error: {source}")]
    TemplateForDeletion {
        path: String,
        #[source]
        source: TemplateError,
    },

    #[error("reading template ({path}) for identifier error: {source}")]
    Identifier {
        path: String,
        #[source]
        source: TemplateError,
    },

    #[error("namespace {namespace:?} object {name} creation error: {source}")]
    Create {
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("namespace {namespace:?} object {name} updating error: {source}")]
    Patch {
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("namespace {namespace:?} object {name} deletion error: {source}")]
    Delete {
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("namespace {namespace:?} object {name} resource version recording error: {source}")]
    ResourceVersion {
        namespace: String,
        name: String,
        #[source]
        source: StateError,
    },

    #[error("measurement call {method} - {identifier} error: {source}")]
    Measurement {
        method: String,
        identifier: String,
        #[source]
        source: MeasurementError,
    },

    #[error("tuning set creation error: {0}")]
    TuningSet(#[from] TuningSetError),

    #[error("automanaged namespaces listing failed: {0}")]
    NamespaceListing(#[source] ClusterError),

    #[error("pre-existing automanaged namespaces found: {}", .0.join(", "))]
    PreexistingNamespaces(Vec<String>),

    #[error("automanaged namespaces creation failed: {0}")]
    NamespaceCreation(#[source] ClusterError),

    #[error("printing summary {summary} error: {source}")]
    SummaryPrint {
        summary: String,
        #[source]
        source: MeasurementError,
    },

    #[error("writing to file {path} error: {source}")]
    SummaryWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{unit} task failed: {reason}")]
    Task { unit: String, reason: String },

    #[error("execution context is missing its {0}")]
    MissingCollaborator(&'static str),
}

impl ExecutionError {
    /// Failures that leave the environment unusable for any step
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            ExecutionError::NamespaceListing(_)
                | ExecutionError::PreexistingNamespaces(_)
                | ExecutionError::NamespaceCreation(_)
                | ExecutionError::MissingCollaborator(_)
        )
    }

    /// Bookkeeping failures recorded after a mutation already succeeded
    pub fn is_bookkeeping(&self) -> bool {
        matches!(self, ExecutionError::ResourceVersion { .. })
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ExecutionError>;
