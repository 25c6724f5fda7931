//! # clusterload Engine - Phase reconciliation and concurrent execution
//!
//! Drives synthetic workload against a cluster API by reconciling, phase by
//! phase, the replica count of every object group in every namespace toward
//! a declared target.
//!
//! ## Key Components
//!
//! - [`TestExecutor`]: prepares the namespace scope, runs steps in order,
//!   emits summaries and always cleans up
//! - [`execute_step`]: runs the measurements or phases of a step concurrently
//! - [`execute_phase`]: computes per-namespace delete/apply actions and hands
//!   them to a [`TuningSet`](tuning::TuningSet)
//! - [`execute_object`]: one create, patch or delete of one replica
//! - [`ErrorList`]: concurrency-safe aggregate of every failure of a run
//!
//! ## Collaborators
//!
//! The engine reaches the outside world only through traits:
//!
//! - [`ClusterClient`](cluster::ClusterClient), with the simulated
//!   [`InMemoryCluster`](cluster::InMemoryCluster)
//! - [`TemplateProvider`](template::TemplateProvider), with file and in-memory
//!   providers rendering minijinja templates
//! - [`MeasurementManager`](measurement::MeasurementManager) and the
//!   [`Measurement`](measurement::Measurement) trait
//! - [`TuningSet`](tuning::TuningSet), with the built-in pacing strategies
//!   created by [`TuningSetFactory`](tuning::TuningSetFactory)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use clusterload_engine::{
//!     cluster::InMemoryCluster, measurement::MeasurementManager,
//!     template::FileTemplateProvider, LoaderConfig, TestExecutor,
//! };
//! use clusterload_types::TestConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let test = TestConfig::load("density.yaml")?;
//! let executor = TestExecutor::new(
//!     Arc::new(InMemoryCluster::new()),
//!     Arc::new(FileTemplateProvider::new(".")),
//!     Arc::new(MeasurementManager::with_builtins()),
//!     LoaderConfig::default(),
//! );
//!
//! let errors = executor.execute_test(&test).await;
//! if !errors.is_empty() {
//!     eprintln!("{}", errors);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod action;
pub mod cluster;
pub mod config;
pub mod context;
pub mod error;
pub mod error_list;
pub mod executor;
pub mod measurement;
pub mod namespace;
pub mod object;
pub mod phase;
pub mod step;
pub mod template;
pub mod tuning;

pub use action::{Action, ActionKind, ObjectOperation};
pub use config::{FatalityPolicy, LoaderConfig};
pub use context::{ExecutionContext, ExecutionContextBuilder};
pub use error::{ExecutionError, Result};
pub use error_list::ErrorList;
pub use executor::TestExecutor;
pub use namespace::{namespace_list, random_prefix};
pub use object::execute_object;
pub use phase::{execute_phase, plan_namespace};
pub use step::execute_step;
