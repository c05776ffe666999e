//! # storeops CLI entry point
//!
//! Parses command-line arguments, resolves configuration and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storeops_cli::access::{run_access, AccessArgs};
use storeops_cli::cartons::{run_cartons, CartonsArgs};
use storeops_cli::employee::{run_employee, EmployeeArgs};
use storeops_cli::load_config;
use storeops_cli::task::{run_task, TaskArgs};
use storeops_service::ServiceConfig;

/// StoreOps: carton counts, shift tasks and staff access for one store.
#[derive(Parser, Debug)]
#[command(name = "storeops", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the store snapshot.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register, list and deactivate employees.
    Employee(EmployeeArgs),

    /// Record and inspect carton counts.
    Cartons(CartonsArgs),

    /// Schedule tasks and track their status.
    Task(TaskArgs),

    /// Compare role names.
    Access(AccessArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("storeops CLI starting");

    let result = match &cli.command {
        Commands::Employee(args) => resolve_config(&cli).and_then(|c| run_employee(args, &c)),
        Commands::Cartons(args) => resolve_config(&cli).and_then(|c| run_cartons(args, &c)),
        Commands::Task(args) => resolve_config(&cli).and_then(|c| run_task(args, &c)),
        Commands::Access(args) => run_access(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let config = load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;
    tracing::debug!(data_dir = ?config.data_dir, "resolved configuration");
    Ok(config)
}
