//! Tuning set collaborator
//!
//! A tuning set decides the pacing and concurrency of a phase's actions. The
//! engine hands it an ordered list of [`Action`] values plus an
//! [`ActionRunner`]; the tuning set must run every action exactly once and
//! return only after all of them have finished.

pub mod parallelism;
pub mod qps;
pub mod randomized;
pub mod stepped;
pub mod time_limited;

pub use parallelism::ParallelismLimitedTuningSet;
pub use qps::QpsTuningSet;
pub use randomized::RandomizedTuningSet;
pub use stepped::SteppedTuningSet;
pub use time_limited::{RandomizedTimeLimitedTuningSet, TimeLimitedTuningSet};

use crate::action::Action;
use async_trait::async_trait;
use clusterload_types::{TuningSetConfig, TuningSetKind};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::error;

/// Errors raised when selecting a tuning set
#[derive(Debug, Clone, Error)]
pub enum TuningSetError {
    #[error("tuning set {0:?} not found")]
    NotFound(String),

    #[error("invalid tuning set: {0}")]
    Invalid(String),
}

/// Runs one action to completion
#[async_trait]
pub trait ActionRunner: Send + Sync {
    async fn run(&self, action: Action);
}

/// Pacing strategy for a list of actions
#[async_trait]
pub trait TuningSet: Send + Sync {
    /// Run every action exactly once, returning when all have finished.
    async fn execute(&self, actions: Vec<Action>, runner: Arc<dyn ActionRunner>);

    /// Strategy name for logging
    fn name(&self) -> &str;
}

/// Builds tuning sets from the test's declared configurations
#[derive(Debug, Clone, Default)]
pub struct TuningSetFactory {
    configs: HashMap<String, TuningSetConfig>,
}

impl TuningSetFactory {
    pub fn new(configs: &[TuningSetConfig]) -> Self {
        Self {
            configs: configs
                .iter()
                .map(|config| (config.name.clone(), config.clone()))
                .collect(),
        }
    }

    /// Declared tuning set names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Instantiate the tuning set selected by `selector`.
    pub fn create(&self, selector: &str) -> Result<Arc<dyn TuningSet>, TuningSetError> {
        let config = self
            .configs
            .get(selector)
            .ok_or_else(|| TuningSetError::NotFound(selector.to_string()))?;
        let kind = config
            .kind()
            .map_err(|e| TuningSetError::Invalid(e.to_string()))?;

        let name = config.name.clone();
        let tuning_set: Arc<dyn TuningSet> = match kind {
            TuningSetKind::Qps(load) => Arc::new(QpsTuningSet::new(name, load)),
            TuningSetKind::Randomized(load) => Arc::new(RandomizedTuningSet::new(name, load)),
            TuningSetKind::Stepped(load) => Arc::new(SteppedTuningSet::new(name, load)),
            TuningSetKind::TimeLimited(load) => Arc::new(TimeLimitedTuningSet::new(name, load)),
            TuningSetKind::RandomizedTimeLimited(load) => {
                Arc::new(RandomizedTimeLimitedTuningSet::new(name, load))
            }
            TuningSetKind::ParallelismLimited(load) => {
                Arc::new(ParallelismLimitedTuningSet::new(name, load))
            }
        };
        Ok(tuning_set)
    }
}

pub(crate) fn spawn_action(
    tasks: &mut JoinSet<()>,
    runner: &Arc<dyn ActionRunner>,
    action: Action,
) {
    let runner = runner.clone();
    tasks.spawn(async move { runner.run(action).await });
}

/// Wait for every spawned action.
pub(crate) async fn join_all(mut tasks: JoinSet<()>, tuning_set: &str) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(tuning_set, error = %e, "Action task did not complete");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    /// Records the replica index and start instant of every action run
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        pub(crate) started: Mutex<Vec<(u32, Instant)>>,
        pub(crate) in_flight: std::sync::atomic::AtomicUsize,
        pub(crate) max_in_flight: std::sync::atomic::AtomicUsize,
        pub(crate) hold: Option<std::time::Duration>,
    }

    impl RecordingRunner {
        pub(crate) fn holding(hold: std::time::Duration) -> Self {
            Self {
                hold: Some(hold),
                ..Default::default()
            }
        }

        pub(crate) fn indices(&self) -> Vec<u32> {
            let mut indices: Vec<u32> = self.started.lock().iter().map(|(i, _)| *i).collect();
            indices.sort_unstable();
            indices
        }
    }

    #[async_trait]
    impl ActionRunner for RecordingRunner {
        async fn run(&self, action: Action) {
            use std::sync::atomic::Ordering;

            self.started
                .lock()
                .push((action.replica_index, Instant::now()));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(hold) = self.hold {
                tokio::time::sleep(hold).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    pub(crate) fn actions(count: u32) -> Vec<Action> {
        (0..count).map(|i| Action::apply("ns-1", i)).collect()
    }
}
