//! Test execution

use crate::cluster::ClusterClient;
use crate::config::LoaderConfig;
use crate::context::{ExecutionContext, ExecutionContextBuilder};
use crate::error::ExecutionError;
use crate::error_list::ErrorList;
use crate::measurement::MeasurementManager;
use crate::namespace::random_prefix;
use crate::phase::panic_message;
use crate::step::execute_step;
use crate::template::TemplateProvider;
use crate::tuning::TuningSetFactory;
use chrono::SecondsFormat;
use clusterload_types::TestConfig;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Runs whole tests against one cluster
pub struct TestExecutor {
    cluster: Arc<dyn ClusterClient>,
    templates: Arc<dyn TemplateProvider>,
    measurements: Arc<MeasurementManager>,
    config: LoaderConfig,
}

impl TestExecutor {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        templates: Arc<dyn TemplateProvider>,
        measurements: Arc<MeasurementManager>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            cluster,
            templates,
            measurements,
            config,
        }
    }

    /// Run `test` under a fresh random namespace prefix.
    pub async fn execute_test(&self, test: &TestConfig) -> ErrorList {
        self.execute_test_with_prefix(test, random_prefix()).await
    }

    /// Run `test` with automanaged namespaces named `<prefix>-<i>`.
    ///
    /// Refuses to start when namespaces under the prefix already exist. Once
    /// that check passes, the automanaged namespaces are deleted on every exit
    /// path, including a failed namespace creation, an aborted step and a panic.
    #[instrument(skip_all, fields(test = %test.name, prefix = %prefix))]
    pub async fn execute_test_with_prefix(&self, test: &TestConfig, prefix: String) -> ErrorList {
        info!("Automanaged namespace prefix: {}", prefix);

        let ctx = match ExecutionContextBuilder::new()
            .with_cluster(self.cluster.clone())
            .with_templates(self.templates.clone())
            .with_measurements(self.measurements.clone())
            .with_tuning_sets(TuningSetFactory::new(&test.tuning_sets))
            .with_namespace_prefix(prefix.clone())
            .with_config(self.config.clone())
            .build()
        {
            Ok(ctx) => Arc::new(ctx),
            Err(e) => return ErrorList::from(e),
        };

        match self.cluster.list_automanaged_namespaces(&prefix).await {
            Ok(existing) if !existing.is_empty() => {
                return ErrorList::from(ExecutionError::PreexistingNamespaces(existing));
            }
            Ok(_) => {}
            Err(e) => return ErrorList::from(ExecutionError::NamespaceListing(e)),
        }

        let errors = ErrorList::new();
        if let Err(panic) = AssertUnwindSafe(self.run(&ctx, test, &errors))
            .catch_unwind()
            .await
        {
            let reason = panic_message(panic.as_ref());
            error!(reason = %reason, "Test run panicked");
            errors.append(ExecutionError::Task {
                unit: format!("test {}", test.name),
                reason,
            });
        }

        self.cleanup(&prefix).await;
        errors
    }

    async fn run(&self, ctx: &Arc<ExecutionContext>, test: &TestConfig, errors: &ErrorList) {
        if let Err(e) = self
            .cluster
            .create_automanaged_namespaces(ctx.namespace_prefix(), test.automanaged_namespaces)
            .await
        {
            errors.append(ExecutionError::NamespaceCreation(e));
            return;
        }

        for (index, step) in test.steps.iter().enumerate() {
            let step_errors = execute_step(ctx, step).await;
            let critical = self.config.fatality_policy.is_critical(&step_errors);
            errors.concat(step_errors);
            if critical {
                warn!(
                    step = index,
                    name = step.display_name(),
                    "Critical errors, skipping remaining steps"
                );
                break;
            }
        }

        errors.concat(self.emit_summaries(&test.name).await);
    }

    async fn emit_summaries(&self, test_name: &str) -> ErrorList {
        let errors = ErrorList::new();

        for summary in self.measurements.take_summaries() {
            let name = summary.summary_name();
            let text = match summary.print_summary() {
                Ok(text) => text,
                Err(source) => {
                    errors.append(ExecutionError::SummaryPrint {
                        summary: name,
                        source,
                    });
                    continue;
                }
            };

            match &self.config.report_dir {
                None => info!("{}: {}", name, text),
                Some(dir) => {
                    let path = summary_path(dir, &name, test_name);
                    if let Err(source) = tokio::fs::write(&path, text).await {
                        errors.append(ExecutionError::SummaryWrite {
                            path: path.display().to_string(),
                            source,
                        });
                        continue;
                    }
                    info!(summary = %name, path = %path.display(), "Summary written");
                }
            }
        }

        errors
    }

    async fn cleanup(&self, prefix: &str) {
        let started = Instant::now();
        self.measurements.dispose().await;
        if let Err(e) = self.cluster.delete_automanaged_namespaces(prefix).await {
            error!(error = %e, "Resources cleanup failed");
        }
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Resources cleanup time");
    }
}

impl std::fmt::Debug for TestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestExecutor")
            .field("measurements", &self.measurements)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `<dir>/<summary>_<test>_<RFC3339 timestamp>.txt`
fn summary_path(dir: &std::path::Path, summary: &str, test_name: &str) -> PathBuf {
    let timestamp = chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    dir.join(format!("{}_{}_{}.txt", summary, test_name, timestamp))
}
