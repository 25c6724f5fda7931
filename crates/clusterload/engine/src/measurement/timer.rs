//! `Timer` measurement
//!
//! `action: start` and `action: stop` bracket a labelled interval;
//! `action: gather` emits every completed interval as a JSON summary.

use super::{param_str, Measurement, MeasurementError, MeasurementParams, Summary};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::time::Instant;

pub const METHOD: &str = "Timer";

pub struct TimerMeasurement {
    running: HashMap<String, Instant>,
    finished: BTreeMap<String, f64>,
}

impl TimerMeasurement {
    pub fn new() -> Self {
        Self {
            running: HashMap::new(),
            finished: BTreeMap::new(),
        }
    }
}

impl Default for TimerMeasurement {
    fn default() -> Self {
        Self::new()
    }
}

/// Elapsed seconds per label
#[derive(Debug, Clone, Serialize)]
pub struct TimerSummary {
    pub durations_seconds: BTreeMap<String, f64>,
}

impl Summary for TimerSummary {
    fn summary_name(&self) -> String {
        METHOD.to_string()
    }

    fn print_summary(&self) -> Result<String, MeasurementError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[async_trait]
impl Measurement for TimerMeasurement {
    async fn execute(
        &mut self,
        params: &MeasurementParams,
    ) -> Result<Vec<Arc<dyn Summary>>, MeasurementError> {
        match param_str(params, "action")? {
            "start" => {
                let label = param_str(params, "label")?;
                self.running.insert(label.to_string(), Instant::now());
                Ok(Vec::new())
            }
            "stop" => {
                let label = param_str(params, "label")?;
                let started = self.running.remove(label).ok_or_else(|| {
                    MeasurementError::Failed(format!("timer {} was not started", label))
                })?;
                self.finished
                    .insert(label.to_string(), started.elapsed().as_secs_f64());
                Ok(Vec::new())
            }
            "gather" => Ok(vec![Arc::new(TimerSummary {
                durations_seconds: self.finished.clone(),
            })]),
            other => Err(MeasurementError::InvalidParam {
                name: "action".into(),
                reason: format!("unknown action {}", other),
            }),
        }
    }

    fn dispose(&mut self) {
        self.running.clear();
    }

    fn name(&self) -> &str {
        METHOD
    }
}
