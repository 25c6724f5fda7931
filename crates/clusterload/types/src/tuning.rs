//! Tuning set configuration
//!
//! A tuning set names a pacing strategy for the actions of a phase. Exactly
//! one load kind must be configured per tuning set.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Named tuning set as written in the test config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningSetConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qps_load: Option<QpsLoad>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomized_load: Option<RandomizedLoad>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stepped_load: Option<SteppedLoad>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limited_load: Option<TimeLimitedLoad>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomized_time_limited_load: Option<RandomizedTimeLimitedLoad>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism_limited_load: Option<ParallelismLimitedLoad>,
}

/// Fixed-rate start of actions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QpsLoad {
    pub qps: f64,
}

/// Random gaps averaging `average_qps`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomizedLoad {
    pub average_qps: f64,
}

/// Bursts of `burst_size` actions separated by `step_delay_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SteppedLoad {
    pub burst_size: u32,
    pub step_delay_ms: u64,
}

/// All actions spread evenly across `time_limit_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLimitedLoad {
    pub time_limit_ms: u64,
}

/// All actions started at random offsets inside `time_limit_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomizedTimeLimitedLoad {
    pub time_limit_ms: u64,
}

/// At most `parallelism_limit` actions in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelismLimitedLoad {
    pub parallelism_limit: u32,
}

/// The single load kind selected by a tuning set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuningSetKind {
    Qps(QpsLoad),
    Randomized(RandomizedLoad),
    Stepped(SteppedLoad),
    TimeLimited(TimeLimitedLoad),
    RandomizedTimeLimited(RandomizedTimeLimitedLoad),
    ParallelismLimited(ParallelismLimitedLoad),
}

impl TuningSetConfig {
    /// Resolve the configured load kind, rejecting zero or several.
    pub fn kind(&self) -> Result<TuningSetKind> {
        let mut kinds = Vec::new();
        if let Some(load) = self.qps_load {
            kinds.push(TuningSetKind::Qps(load));
        }
        if let Some(load) = self.randomized_load {
            kinds.push(TuningSetKind::Randomized(load));
        }
        if let Some(load) = self.stepped_load {
            kinds.push(TuningSetKind::Stepped(load));
        }
        if let Some(load) = self.time_limited_load {
            kinds.push(TuningSetKind::TimeLimited(load));
        }
        if let Some(load) = self.randomized_time_limited_load {
            kinds.push(TuningSetKind::RandomizedTimeLimited(load));
        }
        if let Some(load) = self.parallelism_limited_load {
            kinds.push(TuningSetKind::ParallelismLimited(load));
        }

        match kinds.as_slice() {
            [kind] => {
                kind.validate(&self.name)?;
                Ok(*kind)
            }
            [] => Err(ConfigError::Invalid(format!(
                "tuning set {} has no load configured",
                self.name
            ))),
            _ => Err(ConfigError::Invalid(format!(
                "tuning set {} configures {} loads, expected exactly one",
                self.name,
                kinds.len()
            ))),
        }
    }
}

impl TuningSetKind {
    fn validate(&self, name: &str) -> Result<()> {
        let ok = match self {
            TuningSetKind::Qps(load) => representable_rate(load.qps, 1.0),
            TuningSetKind::Randomized(load) => representable_rate(load.average_qps, 2.0),
            TuningSetKind::Stepped(load) => load.burst_size > 0,
            TuningSetKind::ParallelismLimited(load) => load.parallelism_limit > 0,
            TuningSetKind::TimeLimited(_) | TuningSetKind::RandomizedTimeLimited(_) => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "tuning set {}: rates, burst size and parallelism must be positive and in range",
                name
            )))
        }
    }
}

/// A positive rate whose `span / rate` interval fits in a `Duration`
fn representable_rate(rate: f64, span: f64) -> bool {
    rate > 0.0 && Duration::try_from_secs_f64(span / rate).is_ok()
}

impl SteppedLoad {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl TimeLimitedLoad {
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}

impl RandomizedTimeLimitedLoad {
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}
