//! QARelay CLI - Main Entry Point
//!
//! Runs declarative test suites and routes the collected results to the
//! configured reporting sinks.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{cleanup, config, inbox, report, run};

/// QARelay - UI test-automation harness with multi-sink run reporting
#[derive(Parser)]
#[command(name = "qarelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the harness configuration file
    #[arg(long, default_value = "qarelay.toml", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a test suite and report the results
    Run(run::RunArgs),

    /// Re-route a saved run record to the reporting sinks
    Report(report::ReportArgs),

    /// Inspect the test email inbox
    #[command(subcommand)]
    Inbox(inbox::InboxCommands),

    /// Remove test data from the LMS backend
    #[command(subcommand)]
    Cleanup(cleanup::CleanupCommands),

    /// Manage the harness configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run(args) => run::execute(args, &cli.config).await?,
        Commands::Report(args) => report::execute(args, &cli.config).await?,
        Commands::Inbox(cmd) => inbox::execute(cmd, &cli.config, cli.format).await?,
        Commands::Cleanup(cmd) => cleanup::execute(cmd, &cli.config).await?,
        Commands::Config(cmd) => config::execute(cmd, &cli.config, cli.format)?,
        Commands::Version => {
            println!("QARelay v{}", qarelay_common::VERSION);
            println!("UI test-automation harness with multi-sink run reporting");
        }
    }

    Ok(())
}
