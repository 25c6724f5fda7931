//! Runner configuration

use crate::error_list::ErrorList;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Decides whether a step's errors end the test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalityPolicy {
    /// Only setup failures are fatal; step errors never abort the run
    #[default]
    Default,
    /// Any error recorded by a step aborts the remaining steps
    AbortOnAnyError,
}

impl FatalityPolicy {
    pub fn is_critical(&self, errors: &ErrorList) -> bool {
        match self {
            FatalityPolicy::Default => errors.any(|e| e.is_setup()),
            FatalityPolicy::AbortOnAnyError => !errors.is_empty(),
        }
    }
}

/// Loader settings layered from defaults, an optional file and the
/// `CLUSTERLOAD_*` environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory receiving summary files; summaries are only logged when unset
    #[serde(default)]
    pub report_dir: Option<PathBuf>,

    /// Base directory for object templates; defaults to the test config's directory
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    #[serde(default)]
    pub fatality_policy: FatalityPolicy,

    /// Latency added to every simulated cluster call
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl LoaderConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&LoaderConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CLUSTERLOAD")
                .prefix_separator("_")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn simulated_latency(&self) -> Option<Duration> {
        (self.simulated_latency_ms > 0).then(|| Duration::from_millis(self.simulated_latency_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use crate::cluster::ClusterError;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert!(config.report_dir.is_none());
        assert_eq!(config.fatality_policy, FatalityPolicy::Default);
        assert!(config.simulated_latency().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loader.yaml");
        std::fs::write(
            &path,
            "report_dir: /tmp/reports\nfatality_policy: abort_on_any_error\nsimulated_latency_ms: 5\n",
        )
        .unwrap();

        let config = LoaderConfig::load(Some(&path)).unwrap();
        assert_eq!(config.report_dir, Some(PathBuf::from("/tmp/reports")));
        assert_eq!(config.fatality_policy, FatalityPolicy::AbortOnAnyError);
        assert_eq!(config.simulated_latency(), Some(Duration::from_millis(5)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LoaderConfig::load(Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn test_default_policy_ignores_step_errors() {
        let errors = ErrorList::from(ExecutionError::Task {
            unit: "phase".into(),
            reason: "boom".into(),
        });
        assert!(!FatalityPolicy::Default.is_critical(&errors));
        assert!(FatalityPolicy::AbortOnAnyError.is_critical(&errors));
        assert!(!FatalityPolicy::AbortOnAnyError.is_critical(&ErrorList::new()));

        errors.append(ExecutionError::NamespaceCreation(ClusterError::Unavailable(
            "down".into(),
        )));
        assert!(FatalityPolicy::Default.is_critical(&errors));
    }
}
