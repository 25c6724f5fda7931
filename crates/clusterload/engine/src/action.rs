//! Scheduled units of work handed to a tuning set

use clusterload_types::{ObjectTemplate, OperationType};
use std::sync::Arc;

/// Whether an action tears replicas down or brings them up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Deletes run over every operation even when one fails
    Delete,
    /// Creates and patches stop at the first failing operation
    Apply,
}

/// One object operation inside an action
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectOperation {
    pub object: Arc<ObjectTemplate>,
    pub operation: OperationType,
}

/// An immutable unit of work for one replica index in one namespace.
///
/// Operations run in the stored order: reverse bundle order for deletes,
/// bundle order for creates and patches.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub namespace: String,
    pub replica_index: u32,
    pub kind: ActionKind,
    pub operations: Vec<ObjectOperation>,
}

impl Action {
    pub fn delete(namespace: impl Into<String>, replica_index: u32) -> Self {
        Self {
            namespace: namespace.into(),
            replica_index,
            kind: ActionKind::Delete,
            operations: Vec::new(),
        }
    }

    pub fn apply(namespace: impl Into<String>, replica_index: u32) -> Self {
        Self {
            namespace: namespace.into(),
            replica_index,
            kind: ActionKind::Apply,
            operations: Vec::new(),
        }
    }

    pub fn push(&mut self, object: Arc<ObjectTemplate>, operation: OperationType) {
        self.operations.push(ObjectOperation { object, operation });
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operation types in execution order
    pub fn operation_types(&self) -> Vec<OperationType> {
        self.operations.iter().map(|op| op.operation).collect()
    }

    /// Object basenames in execution order
    pub fn basenames(&self) -> Vec<&str> {
        self.operations
            .iter()
            .map(|op| op.object.basename.as_str())
            .collect()
    }
}
