//! State error types

use clusterload_types::ResourceTypeIdentifier;
use thiserror::Error;

/// Errors raised by the state stores
#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid resource version {version:?} for {resource}: {reason}")]
    InvalidResourceVersion {
        resource: ResourceTypeIdentifier,
        version: String,
        reason: String,
    },
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;
