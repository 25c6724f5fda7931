//! Step execution

use crate::context::ExecutionContext;
use crate::error::ExecutionError;
use crate::error_list::ErrorList;
use crate::phase::execute_phase;
use clusterload_types::Step;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

/// Run every unit of a step concurrently and wait for all of them.
///
/// A step runs its measurements when it has any, its phases otherwise. Units
/// share one error list; a failing unit never cancels its siblings.
#[instrument(skip_all, fields(step = %step.display_name()))]
pub async fn execute_step(ctx: &Arc<ExecutionContext>, step: &Step) -> ErrorList {
    let errors = Arc::new(ErrorList::new());
    let mut units = JoinSet::new();

    if !step.measurements.is_empty() {
        for measurement in &step.measurements {
            let ctx = ctx.clone();
            let errors = errors.clone();
            let measurement = measurement.clone();
            units.spawn(async move {
                let result = ctx
                    .measurements()
                    .execute(&measurement.method, &measurement.identifier, &measurement.params)
                    .await;
                if let Err(source) = result {
                    errors.append(ExecutionError::Measurement {
                        method: measurement.method,
                        identifier: measurement.identifier,
                        source,
                    });
                }
            });
        }
    } else {
        for phase in &step.phases {
            let ctx = ctx.clone();
            let errors = errors.clone();
            let phase = phase.clone();
            units.spawn(async move {
                errors.concat(execute_phase(&ctx, &phase).await);
            });
        }
    }

    while let Some(joined) = units.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Step unit did not complete");
            errors.append(ExecutionError::Task {
                unit: format!("step {:?} unit", step.display_name()),
                reason: e.to_string(),
            });
        }
    }

    info!(errors = errors.len(), "Step ended");
    errors.take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::InMemoryCluster;
    use crate::context::ExecutionContextBuilder;
    use crate::measurement::{
        Measurement, MeasurementError, MeasurementManager, MeasurementParams, Summary,
    };
    use crate::template::InMemoryTemplateProvider;
    use async_trait::async_trait;
    use clusterload_types::MeasurementConfig;

    struct Panicking;

    #[async_trait]
    impl Measurement for Panicking {
        async fn execute(
            &mut self,
            _params: &MeasurementParams,
        ) -> std::result::Result<Vec<Arc<dyn Summary>>, MeasurementError> {
            panic!("measurement blew up");
        }

        fn name(&self) -> &str {
            "Panicking"
        }
    }

    fn context() -> Arc<ExecutionContext> {
        let mut measurements = MeasurementManager::with_builtins();
        measurements.register(
            "Panicking",
            Arc::new(|| Box::new(Panicking) as Box<dyn Measurement>),
        );
        Arc::new(
            ExecutionContextBuilder::new()
                .with_cluster(Arc::new(InMemoryCluster::new()))
                .with_templates(Arc::new(InMemoryTemplateProvider::new()))
                .with_measurements(Arc::new(measurements))
                .with_namespace_prefix("test-abcdef")
                .build()
                .unwrap(),
        )
    }

    fn measurement(method: &str, identifier: &str) -> MeasurementConfig {
        MeasurementConfig {
            method: method.into(),
            identifier: identifier.into(),
            params: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_measurement_errors_collected() {
        let ctx = context();
        let step = Step {
            name: Some("measure".into()),
            measurements: vec![
                measurement("Unknown", "a"),
                measurement("Timer", "b"),
                measurement("Unknown", "c"),
            ],
            ..Default::default()
        };

        let errors = execute_step(&ctx, &step).await;
        // Timer without an action is rejected too.
        assert_eq!(errors.len(), 3);
        assert!(errors
            .messages()
            .iter()
            .any(|m| m.contains("measurement call Unknown - a")));
    }

    #[tokio::test]
    async fn test_panicking_unit_recorded() {
        let ctx = context();
        let step = Step {
            name: Some("panics".into()),
            measurements: vec![measurement("Panicking", "x")],
            ..Default::default()
        };

        let errors = execute_step(&ctx, &step).await;
        assert_eq!(errors.len(), 1);
        assert!(errors.any(|e| matches!(e, ExecutionError::Task { .. })));
    }

    #[tokio::test]
    async fn test_empty_step() {
        let ctx = context();
        assert!(execute_step(&ctx, &Step::default()).await.is_empty());
    }
}
