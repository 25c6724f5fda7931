//! Randomized-rate tuning set

use super::{join_all, spawn_action, ActionRunner, TuningSet};
use crate::action::Action;
use async_trait::async_trait;
use clusterload_types::RandomizedLoad;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::debug;

/// Starts actions with gaps drawn uniformly from `[0, 2 / average_qps)`
#[derive(Debug, Clone)]
pub struct RandomizedTuningSet {
    name: String,
    max_gap: Duration,
}

impl RandomizedTuningSet {
    pub fn new(name: impl Into<String>, load: RandomizedLoad) -> Self {
        Self {
            name: name.into(),
            max_gap: Duration::try_from_secs_f64(2.0 / load.average_qps)
                .unwrap_or(Duration::MAX),
        }
    }

    fn next_gap(&self) -> Duration {
        let max = self.max_gap.as_secs_f64();
        if max <= 0.0 {
            return Duration::ZERO;
        }
        let gap = rand::thread_rng().gen_range(0.0..max);
        Duration::try_from_secs_f64(gap).unwrap_or(self.max_gap)
    }
}

#[async_trait]
impl TuningSet for RandomizedTuningSet {
    async fn execute(&self, actions: Vec<Action>, runner: Arc<dyn ActionRunner>) {
        debug!(
            tuning_set = %self.name,
            actions = actions.len(),
            "Starting actions at randomized rate"
        );

        let mut tasks = JoinSet::new();
        for (i, action) in actions.into_iter().enumerate() {
            if i > 0 {
                let gap = self.next_gap();
                tokio::time::sleep(gap).await;
            }
            spawn_action(&mut tasks, &runner, action);
        }
        join_all(tasks, &self.name).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
