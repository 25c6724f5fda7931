//! Burst tuning set

use super::{join_all, spawn_action, ActionRunner, TuningSet};
use crate::action::Action;
use async_trait::async_trait;
use clusterload_types::SteppedLoad;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

/// Starts `burst_size` actions at once, then pauses for `step_delay`
#[derive(Debug, Clone)]
pub struct SteppedTuningSet {
    name: String,
    load: SteppedLoad,
}

impl SteppedTuningSet {
    pub fn new(name: impl Into<String>, load: SteppedLoad) -> Self {
        Self {
            name: name.into(),
            load,
        }
    }
}

#[async_trait]
impl TuningSet for SteppedTuningSet {
    async fn execute(&self, actions: Vec<Action>, runner: Arc<dyn ActionRunner>) {
        let burst = self.load.burst_size.max(1) as usize;
        debug!(
            tuning_set = %self.name,
            actions = actions.len(),
            burst,
            "Starting actions in bursts"
        );

        let mut tasks = JoinSet::new();
        for (i, action) in actions.into_iter().enumerate() {
            if i > 0 && i % burst == 0 {
                tokio::time::sleep(self.load.step_delay()).await;
            }
            spawn_action(&mut tasks, &runner, action);
        }
        join_all(tasks, &self.name).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
