//! clusterload - synthetic cluster load test runner
//!
//! Runs a declarative test config against the simulated cluster, pacing
//! every phase through its tuning set and writing measurement summaries.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use error::CliResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// clusterload - synthetic cluster load test runner
#[derive(Parser)]
#[command(name = "clusterload")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, env = "CLUSTERLOAD_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "CLUSTERLOAD_LOG_JSON", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a test config
    Run(commands::run::RunArgs),

    /// Parse and validate a test config without running it
    Validate(commands::validate::ValidateArgs),
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "clusterload={0},clusterload_engine={0},clusterload_state={0}",
            cli.log_level
        ))
    });

    if cli.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
