//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use clusterload_engine::cluster::InMemoryCluster;
use clusterload_engine::template::InMemoryTemplateProvider;
use clusterload_engine::tuning::TuningSetFactory;
use clusterload_engine::{ExecutionContext, ExecutionContextBuilder};
use clusterload_engine::cluster::ClusterClient;
use clusterload_engine::measurement::MeasurementManager;
use clusterload_types::{
    NamespaceRange, ObjectTemplate, ParallelismLimitedLoad, Phase, TuningSetConfig,
};
use std::sync::Arc;

pub const PREFIX: &str = "test-itests";
pub const TUNING_SET: &str = "Parallel";

pub const CONFIG_MAP: &str = "apiVersion: v1
kind: ConfigMap
metadata:
  name: {{ Name }}
data:
  index: \"{{ Index }}\"
";

pub const DEPLOYMENT: &str = "apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ Name }}
spec:
  replicas: {{ Replicas }}
";

pub const SCALED_DEPLOYMENT: &str = "apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ Name }}
spec:
  replicas: {{ Replicas * 2 }}
";

pub fn templates() -> InMemoryTemplateProvider {
    InMemoryTemplateProvider::new()
        .with_template("configmap.yaml", CONFIG_MAP)
        .with_template("deployment.yaml", DEPLOYMENT)
        .with_template("scaled-deployment.yaml", SCALED_DEPLOYMENT)
}

pub fn tuning_sets() -> Vec<TuningSetConfig> {
    vec![TuningSetConfig {
        name: TUNING_SET.into(),
        parallelism_limited_load: Some(ParallelismLimitedLoad {
            parallelism_limit: 4,
        }),
        ..Default::default()
    }]
}

pub fn context(cluster: Arc<dyn ClusterClient>) -> Arc<ExecutionContext> {
    Arc::new(
        ExecutionContextBuilder::new()
            .with_cluster(cluster)
            .with_templates(Arc::new(templates()))
            .with_measurements(Arc::new(MeasurementManager::with_builtins()))
            .with_tuning_sets(TuningSetFactory::new(&tuning_sets()))
            .with_namespace_prefix(PREFIX)
            .build()
            .unwrap(),
    )
}

pub fn in_memory() -> (Arc<InMemoryCluster>, Arc<ExecutionContext>) {
    let cluster = Arc::new(InMemoryCluster::new());
    let ctx = context(cluster.clone());
    (cluster, ctx)
}

pub fn config_map(basename: &str) -> ObjectTemplate {
    ObjectTemplate::new(basename, "configmap.yaml")
}

pub fn deployment(basename: &str) -> ObjectTemplate {
    ObjectTemplate::new(basename, "deployment.yaml").with_param("Replicas", 1)
}

pub fn scaled_deployment(basename: &str) -> ObjectTemplate {
    ObjectTemplate::new(basename, "scaled-deployment.yaml").with_param("Replicas", 2)
}

pub fn phase(range: Option<NamespaceRange>, replicas: u32, bundle: Vec<ObjectTemplate>) -> Phase {
    Phase {
        namespace_range: range,
        replicas_per_namespace: replicas,
        tuning_set: TUNING_SET.into(),
        object_bundle: bundle,
    }
}

pub fn single_namespace(index: u32) -> Option<NamespaceRange> {
    Some(NamespaceRange::new(index, index).with_basename("ns"))
}
