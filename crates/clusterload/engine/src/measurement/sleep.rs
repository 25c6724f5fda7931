//! `Sleep` measurement: pauses a step for `params.durationMs`

use super::{param_u64, Measurement, MeasurementError, MeasurementParams, Summary};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const METHOD: &str = "Sleep";

pub struct SleepMeasurement;

#[async_trait]
impl Measurement for SleepMeasurement {
    async fn execute(
        &mut self,
        params: &MeasurementParams,
    ) -> Result<Vec<Arc<dyn Summary>>, MeasurementError> {
        let duration = Duration::from_millis(param_u64(params, "durationMs")?);
        tokio::time::sleep(duration).await;
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        METHOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_for_duration() {
        let mut params = MeasurementParams::new();
        params.insert("durationMs".into(), Value::from(1500));

        let start = tokio::time::Instant::now();
        let summaries = SleepMeasurement.execute(&params).await.unwrap();
        assert!(summaries.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_requires_duration() {
        let err = SleepMeasurement
            .execute(&MeasurementParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MeasurementError::MissingParam(_)));
    }
}
