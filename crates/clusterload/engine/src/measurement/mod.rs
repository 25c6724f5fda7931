//! Measurement collaborator
//!
//! Measurements are looked up by method name and instantiated once per
//! `(method, identifier)` pair, so a `start` call and a later `gather` call
//! with the same identifier reach the same instance. Summaries returned by
//! any call are kept until the end of the run.

pub mod sleep;
pub mod timer;

pub use sleep::SleepMeasurement;
pub use timer::TimerMeasurement;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Parameters of a measurement call
pub type MeasurementParams = BTreeMap<String, Value>;

/// Errors raised by measurements and their summaries
#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("unknown measurement method {0}")]
    UnknownMethod(String),

    #[error("missing parameter {0}")]
    MissingParam(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: String, reason: String },

    #[error("measurement failed: {0}")]
    Failed(String),

    #[error("summary serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Rendered result of a measurement
pub trait Summary: Send + Sync + std::fmt::Debug {
    fn summary_name(&self) -> String;

    fn print_summary(&self) -> Result<String, MeasurementError>;
}

/// A measurement instance
#[async_trait]
pub trait Measurement: Send + Sync {
    async fn execute(
        &mut self,
        params: &MeasurementParams,
    ) -> Result<Vec<Arc<dyn Summary>>, MeasurementError>;

    /// Release whatever the measurement still holds at the end of the run
    fn dispose(&mut self) {}

    fn name(&self) -> &str;
}

/// Constructs a fresh measurement instance
pub type MeasurementFactory = Arc<dyn Fn() -> Box<dyn Measurement> + Send + Sync>;

type Instance = Arc<tokio::sync::Mutex<Box<dyn Measurement>>>;

/// Registry and dispatcher for measurements
pub struct MeasurementManager {
    factories: HashMap<String, MeasurementFactory>,
    instances: DashMap<(String, String), Instance>,
    summaries: parking_lot::Mutex<Vec<Arc<dyn Summary>>>,
}

impl Default for MeasurementManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementManager {
    /// Empty manager without any registered method
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            instances: DashMap::new(),
            summaries: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Manager with the built-in `Sleep` and `Timer` methods
    pub fn with_builtins() -> Self {
        let mut manager = Self::new();
        manager.register(
            sleep::METHOD,
            Arc::new(|| Box::new(SleepMeasurement) as Box<dyn Measurement>),
        );
        manager.register(
            timer::METHOD,
            Arc::new(|| Box::new(TimerMeasurement::new()) as Box<dyn Measurement>),
        );
        manager
    }

    pub fn register(&mut self, method: impl Into<String>, factory: MeasurementFactory) {
        self.factories.insert(method.into(), factory);
    }

    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.factories.keys().cloned().collect();
        methods.sort();
        methods
    }

    /// Run a measurement call, creating its instance on first use.
    pub async fn execute(
        &self,
        method: &str,
        identifier: &str,
        params: &MeasurementParams,
    ) -> Result<(), MeasurementError> {
        let factory = self
            .factories
            .get(method)
            .ok_or_else(|| MeasurementError::UnknownMethod(method.to_string()))?;

        let instance = self
            .instances
            .entry((method.to_string(), identifier.to_string()))
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(factory())))
            .clone();

        debug!(method, identifier, "Executing measurement");
        let summaries = instance.lock().await.execute(params).await?;
        if !summaries.is_empty() {
            self.summaries.lock().extend(summaries);
        }
        Ok(())
    }

    /// Every summary produced so far
    pub fn summaries(&self) -> Vec<Arc<dyn Summary>> {
        self.summaries.lock().clone()
    }

    /// Remove and return every summary produced so far
    pub fn take_summaries(&self) -> Vec<Arc<dyn Summary>> {
        std::mem::take(&mut *self.summaries.lock())
    }

    /// Dispose and forget every measurement instance and pending summary
    pub async fn dispose(&self) {
        self.summaries.lock().clear();
        let instances: Vec<Instance> = self.instances.iter().map(|e| e.value().clone()).collect();
        self.instances.clear();
        for instance in instances {
            let mut measurement = instance.lock().await;
            info!(measurement = measurement.name(), "Disposing measurement");
            measurement.dispose();
        }
    }
}

impl std::fmt::Debug for MeasurementManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementManager")
            .field("methods", &self.methods())
            .field("instances", &self.instances.len())
            .finish()
    }
}

pub(crate) fn param_str<'a>(
    params: &'a MeasurementParams,
    name: &str,
) -> Result<&'a str, MeasurementError> {
    let value = params
        .get(name)
        .ok_or_else(|| MeasurementError::MissingParam(name.to_string()))?;
    value.as_str().ok_or_else(|| MeasurementError::InvalidParam {
        name: name.to_string(),
        reason: format!("expected string, got {}", value),
    })
}

pub(crate) fn param_u64(params: &MeasurementParams, name: &str) -> Result<u64, MeasurementError> {
    let value = params
        .get(name)
        .ok_or_else(|| MeasurementError::MissingParam(name.to_string()))?;
    value.as_u64().ok_or_else(|| MeasurementError::InvalidParam {
        name: name.to_string(),
        reason: format!("expected non-negative integer, got {}", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountSummary(usize);

    impl Summary for CountSummary {
        fn summary_name(&self) -> String {
            "Count".into()
        }

        fn print_summary(&self) -> Result<String, MeasurementError> {
            Ok(self.0.to_string())
        }
    }

    struct Counter {
        calls: usize,
    }

    #[async_trait]
    impl Measurement for Counter {
        async fn execute(
            &mut self,
            _params: &MeasurementParams,
        ) -> Result<Vec<Arc<dyn Summary>>, MeasurementError> {
            self.calls += 1;
            Ok(vec![Arc::new(CountSummary(self.calls))])
        }

        fn name(&self) -> &str {
            "Counter"
        }
    }

    #[tokio::test]
    async fn test_instance_reused_per_identifier() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut manager = MeasurementManager::new();
        let counter = created.clone();
        manager.register(
            "Counter",
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::new(Counter { calls: 0 }) as Box<dyn Measurement>
            }),
        );

        let params = MeasurementParams::new();
        manager.execute("Counter", "a", &params).await.unwrap();
        manager.execute("Counter", "a", &params).await.unwrap();
        manager.execute("Counter", "b", &params).await.unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 2);
        let printed: Vec<String> = manager
            .summaries()
            .iter()
            .map(|s| s.print_summary().unwrap())
            .collect();
        assert_eq!(printed, vec!["1", "2", "1"]);
    }

    #[tokio::test]
    async fn test_summaries_drained() {
        let mut manager = MeasurementManager::new();
        manager.register(
            "Counter",
            Arc::new(|| Box::new(Counter { calls: 0 }) as Box<dyn Measurement>),
        );
        let params = MeasurementParams::new();

        manager.execute("Counter", "a", &params).await.unwrap();
        assert_eq!(manager.take_summaries().len(), 1);
        assert!(manager.take_summaries().is_empty());

        manager.execute("Counter", "a", &params).await.unwrap();
        manager.dispose().await;
        assert!(manager.summaries().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let manager = MeasurementManager::with_builtins();
        let err = manager
            .execute("Nope", "x", &MeasurementParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MeasurementError::UnknownMethod(_)));
        assert_eq!(manager.methods(), vec!["Sleep", "Timer"]);
    }

    #[test]
    fn test_param_helpers() {
        let mut params = MeasurementParams::new();
        params.insert("label".into(), Value::from("x"));
        params.insert("durationMs".into(), Value::from(5));
        params.insert("bad".into(), Value::from(-1));

        assert_eq!(param_str(&params, "label").unwrap(), "x");
        assert_eq!(param_u64(&params, "durationMs").unwrap(), 5);
        assert!(param_u64(&params, "bad").is_err());
        assert!(matches!(
            param_str(&params, "missing"),
            Err(MeasurementError::MissingParam(_))
        ));
    }
}
