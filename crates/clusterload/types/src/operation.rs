//! Object operation kinds

use serde::{Deserialize, Serialize};

/// Mutation applied to a single replica of an object template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Create,
    Patch,
    Delete,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationType::Create => "create",
            OperationType::Patch => "patch",
            OperationType::Delete => "delete",
        };
        f.write_str(s)
    }
}
