//! clusterload Types - Core types for synthetic cluster workload
//!
//! A load test declares, per namespace and per object template, how many
//! replicas of each object should exist after every phase. The engine crate
//! reconciles the cluster toward those counts; this crate only holds the
//! vocabulary it works with.
//!
//! ## Key Concepts
//!
//! - **TestConfig**: Named sequence of steps plus tuning sets and namespace count
//! - **Step**: Either a set of measurement calls or a set of phases, run concurrently
//! - **Phase**: Target replica count for an object bundle across a namespace range
//! - **ObjectTemplate**: Basename + template path + parameters of one replicated object
//! - **Object**: Unstructured cluster object as rendered from a template
//! - **InstancesIdentifier**: Discovered identity of an object group in a namespace

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod error;
pub mod ids;
pub mod object;
pub mod operation;
pub mod tuning;

// Re-export main types
pub use config::{
    MeasurementConfig, NamespaceRange, ObjectTemplate, Phase, Step, TemplateFillMap, TestConfig,
};
pub use error::{ConfigError, Result};
pub use ids::{InstancesIdentifier, ResourceTypeIdentifier};
pub use object::{GroupVersionKind, Object};
pub use operation::OperationType;
pub use tuning::{
    ParallelismLimitedLoad, QpsLoad, RandomizedLoad, RandomizedTimeLimitedLoad, SteppedLoad,
    TimeLimitedLoad, TuningSetConfig, TuningSetKind,
};
