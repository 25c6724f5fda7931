//! Tuning sets bounded by a time window

use super::{join_all, spawn_action, ActionRunner, TuningSet};
use crate::action::Action;
use async_trait::async_trait;
use clusterload_types::{RandomizedTimeLimitedLoad, TimeLimitedLoad};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::debug;

/// Spreads actions evenly so the last one starts before the window closes
#[derive(Debug, Clone)]
pub struct TimeLimitedTuningSet {
    name: String,
    time_limit: Duration,
}

impl TimeLimitedTuningSet {
    pub fn new(name: impl Into<String>, load: TimeLimitedLoad) -> Self {
        Self {
            name: name.into(),
            time_limit: load.time_limit(),
        }
    }
}

#[async_trait]
impl TuningSet for TimeLimitedTuningSet {
    async fn execute(&self, actions: Vec<Action>, runner: Arc<dyn ActionRunner>) {
        if actions.is_empty() {
            return;
        }
        let interval = self.time_limit / actions.len() as u32;
        debug!(
            tuning_set = %self.name,
            actions = actions.len(),
            interval_ms = interval.as_millis() as u64,
            "Spreading actions across time limit"
        );

        let mut tasks = JoinSet::new();
        for (i, action) in actions.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(interval).await;
            }
            spawn_action(&mut tasks, &runner, action);
        }
        join_all(tasks, &self.name).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Starts each action at a uniformly random offset inside the window
#[derive(Debug, Clone)]
pub struct RandomizedTimeLimitedTuningSet {
    name: String,
    time_limit: Duration,
}

impl RandomizedTimeLimitedTuningSet {
    pub fn new(name: impl Into<String>, load: RandomizedTimeLimitedLoad) -> Self {
        Self {
            name: name.into(),
            time_limit: load.time_limit(),
        }
    }

    fn random_offset(&self) -> Duration {
        let limit_ms = self.time_limit.as_millis() as u64;
        if limit_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..limit_ms))
    }
}

#[async_trait]
impl TuningSet for RandomizedTimeLimitedTuningSet {
    async fn execute(&self, actions: Vec<Action>, runner: Arc<dyn ActionRunner>) {
        debug!(
            tuning_set = %self.name,
            actions = actions.len(),
            time_limit_ms = self.time_limit.as_millis() as u64,
            "Starting actions at random offsets"
        );

        let mut tasks = JoinSet::new();
        for action in actions {
            let offset = self.random_offset();
            let runner = runner.clone();
            tasks.spawn(async move {
                tokio::time::sleep(offset).await;
                runner.run(action).await;
            });
        }
        join_all(tasks, &self.name).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
