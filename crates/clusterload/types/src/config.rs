//! Declarative test configuration
//!
//! Test configs are YAML documents with camelCase keys:
//!
//! ```yaml
//! name: density
//! automanagedNamespaces: 2
//! tuningSets:
//!   - name: uniform
//!     qpsLoad:
//!       qps: 10
//! steps:
//!   - name: create
//!     phases:
//!       - namespaceRange: {min: 1, max: 2}
//!         replicasPerNamespace: 3
//!         tuningSet: uniform
//!         objectBundle:
//!           - basename: web
//!             objectTemplatePath: deployment.yaml
//! ```

use crate::error::{ConfigError, Result};
use crate::tuning::TuningSetConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Static template parameters of an object
pub type TemplateFillMap = BTreeMap<String, Value>;

/// Complete load test definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    pub name: String,

    /// Number of namespaces created for the run (`<prefix>-1..=<prefix>-N`)
    #[serde(default)]
    pub automanaged_namespaces: u32,

    #[serde(default)]
    pub tuning_sets: Vec<TuningSetConfig>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One step: measurements or phases, never both
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub phases: Vec<Phase>,

    #[serde(default)]
    pub measurements: Vec<MeasurementConfig>,
}

/// Target replica count for an object bundle across a namespace range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// `None` targets the cluster scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_range: Option<NamespaceRange>,

    pub replicas_per_namespace: u32,

    pub tuning_set: String,

    pub object_bundle: Vec<ObjectTemplate>,
}

/// Inclusive namespace index range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRange {
    pub min: u32,
    pub max: u32,

    /// Falls back to the automanaged namespace prefix when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basename: Option<String>,
}

/// One replicated object of a bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTemplate {
    pub basename: String,

    pub object_template_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_fill_map: Option<TemplateFillMap>,
}

/// A measurement invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementConfig {
    pub method: String,

    pub identifier: String,

    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl ObjectTemplate {
    pub fn new(basename: impl Into<String>, object_template_path: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
            object_template_path: object_template_path.into(),
            template_fill_map: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.template_fill_map
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Name of the replica with the given index
    pub fn object_name(&self, replica_index: u32) -> String {
        format!("{}-{}", self.basename, replica_index)
    }
}

impl NamespaceRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max,
            basename: None,
        }
    }

    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }
}

impl Step {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl TestConfig {
    /// Read, parse and validate a YAML test config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a YAML test config.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: TestConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("test name must not be empty".into()));
        }

        let mut tuning_sets = HashSet::new();
        for tuning_set in &self.tuning_sets {
            tuning_set.kind()?;
            if !tuning_sets.insert(tuning_set.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate tuning set {}",
                    tuning_set.name
                )));
            }
        }

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name.clone().unwrap_or_else(|| format!("#{}", i));
            if !step.phases.is_empty() && !step.measurements.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "step {} has both phases and measurements",
                    step_name
                )));
            }

            for phase in &step.phases {
                if let Some(range) = &phase.namespace_range {
                    if range.min > range.max {
                        return Err(ConfigError::Invalid(format!(
                            "step {}: namespace range min {} exceeds max {}",
                            step_name, range.min, range.max
                        )));
                    }
                }
                if !tuning_sets.contains(phase.tuning_set.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "step {}: unknown tuning set {:?}",
                        step_name, phase.tuning_set
                    )));
                }
                for object in &phase.object_bundle {
                    if object.basename.is_empty() || object.object_template_path.is_empty() {
                        return Err(ConfigError::Invalid(format!(
                            "step {}: object needs both basename and objectTemplatePath",
                            step_name
                        )));
                    }
                }
            }

            for measurement in &step.measurements {
                if measurement.method.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "step {}: measurement without method",
                        step_name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DENSITY: &str = r#"
name: density
automanagedNamespaces: 2
tuningSets:
  - name: uniform
    qpsLoad:
      qps: 10
steps:
  - name: start
    measurements:
      - method: Timer
        identifier: t
        params:
          action: start
          label: create
  - name: create
    phases:
      - namespaceRange:
          min: 1
          max: 2
        replicasPerNamespace: 3
        tuningSet: uniform
        objectBundle:
          - basename: web
            objectTemplatePath: deployment.yaml
            templateFillMap:
              Replicas: 2
"#;

    #[test]
    fn test_parse_density() {
        let config = TestConfig::from_yaml_str(DENSITY).unwrap();
        assert_eq!(config.name, "density");
        assert_eq!(config.automanaged_namespaces, 2);
        assert_eq!(config.steps.len(), 2);

        let phase = &config.steps[1].phases[0];
        assert_eq!(phase.replicas_per_namespace, 3);
        assert_eq!(phase.namespace_range, Some(NamespaceRange::new(1, 2)));
        let object = &phase.object_bundle[0];
        assert_eq!(object.object_name(4), "web-4");
        assert_eq!(
            object.template_fill_map.as_ref().unwrap()["Replicas"],
            Value::from(2)
        );

        let measurement = &config.steps[0].measurements[0];
        assert_eq!(measurement.params["action"], Value::from("start"));
    }

    #[test]
    fn test_rejects_mixed_step() {
        let mut config = TestConfig::from_yaml_str(DENSITY).unwrap();
        let measurements = config.steps[0].measurements.clone();
        config.steps[1].measurements = measurements;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("both phases and measurements"));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut config = TestConfig::from_yaml_str(DENSITY).unwrap();
        config.steps[1].phases[0].namespace_range = Some(NamespaceRange::new(3, 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_tuning_set() {
        let mut config = TestConfig::from_yaml_str(DENSITY).unwrap();
        config.steps[1].phases[0].tuning_set = "missing".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_rejects_empty_name() {
        let config = TestConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DENSITY.as_bytes()).unwrap();

        let config = TestConfig::load(file.path()).unwrap();
        assert_eq!(config.tuning_sets.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TestConfig::load("/nonexistent/clusterload/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_object_template_builder() {
        let object = ObjectTemplate::new("svc", "service.yaml").with_param("Port", 8080);
        assert_eq!(
            object.template_fill_map.unwrap().get("Port"),
            Some(&Value::from(8080))
        );
    }
}
