//! # finops
//!
//! Runs FinOps policy agents over one calendar month.
//!
//! - `finops window --month 2025-10` prints the observation window as JSON
//! - `finops spend-cap|db-limit|db-license --month 2025-10` runs a policy agent
//!   and saves its report and findings
//!
//! Logs go to stderr; stdout carries only the command's result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{PolicyArgs, WindowArgs};
use finops_agents::PolicyKind;

/// FinOps policy agents for OCI tenancies
#[derive(Parser)]
#[command(name = "finops")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the observation window of a month
    Window(WindowArgs),

    /// POL-COMP-SPEND-001: monthly spend cap per compartment
    SpendCap(PolicyArgs),

    /// POL-DB-LIMIT-002: Autonomous Database count limit per compartment
    DbLimit(PolicyArgs),

    /// POL-DB-LICENSE-003: BYOL license model for Autonomous Databases
    DbLicense(PolicyArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Window(args) => commands::window(args),
        Commands::SpendCap(args) => commands::policy(PolicyKind::SpendCap, args).await,
        Commands::DbLimit(args) => commands::policy(PolicyKind::DbLimit, args).await,
        Commands::DbLicense(args) => commands::policy(PolicyKind::DbLicense, args).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
