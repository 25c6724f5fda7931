//! Concurrency-bounded tuning set

use super::{join_all, ActionRunner, TuningSet};
use crate::action::Action;
use async_trait::async_trait;
use clusterload_types::ParallelismLimitedLoad;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Keeps at most `parallelism_limit` actions in flight
#[derive(Debug, Clone)]
pub struct ParallelismLimitedTuningSet {
    name: String,
    limit: usize,
}

impl ParallelismLimitedTuningSet {
    pub fn new(name: impl Into<String>, load: ParallelismLimitedLoad) -> Self {
        Self {
            name: name.into(),
            limit: load.parallelism_limit.max(1) as usize,
        }
    }
}

#[async_trait]
impl TuningSet for ParallelismLimitedTuningSet {
    async fn execute(&self, actions: Vec<Action>, runner: Arc<dyn ActionRunner>) {
        debug!(
            tuning_set = %self.name,
            actions = actions.len(),
            limit = self.limit,
            "Starting actions with bounded parallelism"
        );

        let permits = Arc::new(Semaphore::new(self.limit));
        let mut tasks = JoinSet::new();
        for action in actions {
            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(tuning_set = %self.name, error = %e, "Semaphore closed");
                    break;
                }
            };
            let runner = runner.clone();
            tasks.spawn(async move {
                runner.run(action).await;
                drop(permit);
            });
        }
        join_all(tasks, &self.name).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
