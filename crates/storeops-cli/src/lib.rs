//! # storeops-cli: StoreOps Command-Line Interface
//!
//! Provides the `storeops` binary. Each invocation opens the store snapshot,
//! authenticates the caller by PIN, performs one operation and exits.
//!
//! ## Subcommands
//!
//! - `storeops employee`: Register, list and deactivate employees.
//! - `storeops cartons`: Add, remove, recount, reset and undo carton counts.
//! - `storeops task`: Schedule tasks, list pending and overdue work, mark status.
//! - `storeops access`: Check one role name against another.
//!
//! ```bash
//! storeops employee add --name Maria --role manager --new-pin 9001
//! storeops cartons add 24 --pin 1234 --note "truck delivery"
//! storeops cartons history --pin 1234 --limit 10
//! storeops task overdue --pin 5555
//! ```
//!
//! ## Configuration
//!
//! `--config <file>` loads YAML configuration. Without it the environment
//! (`STOREOPS_DATA_DIR`, `STOREOPS_HISTORY_LIMIT`) is used. `--data-dir`
//! overrides either source, and the fallback is `.storeops` in the current
//! directory.

pub mod access;
pub mod cartons;
pub mod employee;
pub mod task;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use storeops_service::{CallerIdentity, ServiceConfig, StoreService};

/// Data directory used when neither flags, config nor environment name one.
pub const DEFAULT_DATA_DIR: &str = ".storeops";

/// Resolve the effective configuration.
pub fn load_config(config: Option<&Path>, data_dir: Option<&Path>) -> Result<ServiceConfig> {
    let mut resolved = match config {
        Some(path) => ServiceConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ServiceConfig::from_env().context("invalid environment configuration")?,
    };
    if let Some(dir) = data_dir {
        resolved.data_dir = Some(dir.to_path_buf());
    }
    if resolved.data_dir.is_none() {
        resolved.data_dir = Some(PathBuf::from(DEFAULT_DATA_DIR));
    }
    Ok(resolved)
}

/// Open the store described by `config`.
pub fn open_service(config: &ServiceConfig) -> Result<StoreService> {
    let dir = config
        .data_dir
        .as_deref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "<memory>".into());
    StoreService::open(config.clone()).with_context(|| format!("failed to open store at {dir}"))
}

/// Authenticate a PIN against the open store.
pub fn login(service: &StoreService, pin: &str) -> Result<CallerIdentity> {
    let caller = service.login(pin).context("login failed")?;
    tracing::debug!(employee = %caller.employee_id(), role = %caller.role(), "authenticated");
    Ok(caller)
}
