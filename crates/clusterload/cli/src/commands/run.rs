//! `clusterload run`

use crate::error::{CliError, CliResult};
use clap::Args;
use clusterload_engine::cluster::InMemoryCluster;
use clusterload_engine::measurement::MeasurementManager;
use clusterload_engine::template::FileTemplateProvider;
use clusterload_engine::{FatalityPolicy, LoaderConfig, TestExecutor};
use clusterload_types::TestConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Arguments of the `run` command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Test config file
    #[arg(long)]
    pub testconfig: PathBuf,

    /// Directory receiving summary files
    #[arg(long, env = "CLUSTERLOAD_REPORT_DIR")]
    pub report_dir: Option<PathBuf>,

    /// Loader configuration file
    #[arg(short, long, env = "CLUSTERLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Latency added to every simulated cluster call
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Abort remaining steps as soon as a step reports an error
    #[arg(long)]
    pub abort_on_error: bool,
}

impl RunArgs {
    /// Loader config with command-line overrides applied
    pub fn loader_config(&self) -> CliResult<LoaderConfig> {
        let mut loader = LoaderConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.report_dir {
            loader.report_dir = Some(dir.clone());
        }
        if let Some(latency) = self.latency_ms {
            loader.simulated_latency_ms = latency;
        }
        if self.abort_on_error {
            loader.fatality_policy = FatalityPolicy::AbortOnAnyError;
        }
        Ok(loader)
    }
}

/// Templates resolve against the configured directory, else next to the test config.
fn template_dir(loader: &LoaderConfig, testconfig: &Path) -> PathBuf {
    loader.template_dir.clone().unwrap_or_else(|| {
        testconfig
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    })
}

pub async fn execute(args: RunArgs) -> CliResult<()> {
    let test = TestConfig::load(&args.testconfig)?;
    let loader = args.loader_config()?;

    let mut cluster = InMemoryCluster::new();
    if let Some(latency) = loader.simulated_latency() {
        cluster = cluster.with_latency(latency);
    }
    let templates = FileTemplateProvider::new(template_dir(&loader, &args.testconfig));

    info!(
        test = %test.name,
        steps = test.steps.len(),
        namespaces = test.automanaged_namespaces,
        "Starting test"
    );

    let started = Instant::now();
    let executor = TestExecutor::new(
        Arc::new(cluster),
        Arc::new(templates),
        Arc::new(MeasurementManager::with_builtins()),
        loader,
    );
    let errors = executor.execute_test(&test).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if errors.is_empty() {
        info!(test = %test.name, elapsed_ms, "Test finished");
        return Ok(());
    }

    error!(test = %test.name, elapsed_ms, "{}", errors);
    Err(CliError::Execution {
        test: test.name,
        count: errors.len(),
    })
}
