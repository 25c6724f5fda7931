//! Collaborators and run-wide settings shared by every unit of work

use crate::cluster::ClusterClient;
use crate::config::LoaderConfig;
use crate::error::{ExecutionError, Result};
use crate::measurement::MeasurementManager;
use crate::template::TemplateProvider;
use crate::tuning::TuningSetFactory;
use clusterload_state::State;
use std::sync::Arc;

/// Everything a phase, step or measurement needs to run
pub struct ExecutionContext {
    cluster: Arc<dyn ClusterClient>,
    templates: Arc<dyn TemplateProvider>,
    measurements: Arc<MeasurementManager>,
    state: Arc<State>,
    tuning_sets: TuningSetFactory,
    namespace_prefix: String,
    config: LoaderConfig,
}

impl ExecutionContext {
    pub fn cluster(&self) -> &Arc<dyn ClusterClient> {
        &self.cluster
    }

    pub fn templates(&self) -> &Arc<dyn TemplateProvider> {
        &self.templates
    }

    pub fn measurements(&self) -> &Arc<MeasurementManager> {
        &self.measurements
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn tuning_sets(&self) -> &TuningSetFactory {
        &self.tuning_sets
    }

    /// Automanaged namespace prefix of this run
    pub fn namespace_prefix(&self) -> &str {
        &self.namespace_prefix
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("namespace_prefix", &self.namespace_prefix)
            .field("tuning_sets", &self.tuning_sets.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExecutionContext`]
#[derive(Default)]
pub struct ExecutionContextBuilder {
    cluster: Option<Arc<dyn ClusterClient>>,
    templates: Option<Arc<dyn TemplateProvider>>,
    measurements: Option<Arc<MeasurementManager>>,
    state: Option<Arc<State>>,
    tuning_sets: TuningSetFactory,
    namespace_prefix: Option<String>,
    config: LoaderConfig,
}

impl ExecutionContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(mut self, cluster: Arc<dyn ClusterClient>) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateProvider>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_measurements(mut self, measurements: Arc<MeasurementManager>) -> Self {
        self.measurements = Some(measurements);
        self
    }

    /// Share an existing store; a fresh one is created otherwise
    pub fn with_state(mut self, state: Arc<State>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_tuning_sets(mut self, tuning_sets: TuningSetFactory) -> Self {
        self.tuning_sets = tuning_sets;
        self
    }

    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = Some(prefix.into());
        self
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ExecutionContext> {
        Ok(ExecutionContext {
            cluster: self
                .cluster
                .ok_or(ExecutionError::MissingCollaborator("cluster client"))?,
            templates: self
                .templates
                .ok_or(ExecutionError::MissingCollaborator("template provider"))?,
            measurements: self
                .measurements
                .unwrap_or_else(|| Arc::new(MeasurementManager::with_builtins())),
            state: self.state.unwrap_or_default(),
            tuning_sets: self.tuning_sets,
            namespace_prefix: self
                .namespace_prefix
                .ok_or(ExecutionError::MissingCollaborator("namespace prefix"))?,
            config: self.config,
        })
    }
}
