//! CLI error types

use thiserror::Error;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Test config error: {0}")]
    TestConfig(#[from] clusterload_types::ConfigError),

    #[error("Loader config error: {0}")]
    LoaderConfig(#[from] config::ConfigError),

    #[error("Test {test} finished with {count} error(s)")]
    Execution { test: String, count: usize },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
