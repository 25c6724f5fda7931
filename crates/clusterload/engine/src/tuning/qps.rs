//! Fixed-rate tuning set

use super::{join_all, spawn_action, ActionRunner, TuningSet};
use crate::action::Action;
use async_trait::async_trait;
use clusterload_types::QpsLoad;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::debug;

/// Starts one action every `1 / qps` seconds
#[derive(Debug, Clone)]
pub struct QpsTuningSet {
    name: String,
    interval: Duration,
}

impl QpsTuningSet {
    pub fn new(name: impl Into<String>, load: QpsLoad) -> Self {
        Self {
            name: name.into(),
            interval: Duration::try_from_secs_f64(1.0 / load.qps).unwrap_or(Duration::MAX),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl TuningSet for QpsTuningSet {
    async fn execute(&self, actions: Vec<Action>, runner: Arc<dyn ActionRunner>) {
        debug!(
            tuning_set = %self.name,
            actions = actions.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Starting actions at fixed rate"
        );

        let mut tasks = JoinSet::new();
        for (i, action) in actions.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.interval).await;
            }
            spawn_action(&mut tasks, &runner, action);
        }
        join_all(tasks, &self.name).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
