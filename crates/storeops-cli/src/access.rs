//! # Access Subcommand
//!
//! `storeops access check <held> [<required>]` prints `granted` or `denied`
//! and exits 0 or 1 accordingly. Role names are taken verbatim: an
//! unrecognized name ranks below every real role, and a missing
//! requirement means `employee`.

use anyhow::Result;
use clap::{Args, Subcommand};

use storeops_core::{has_access_by_name, level_of};

/// Arguments for the `storeops access` subcommand.
#[derive(Args, Debug)]
pub struct AccessArgs {
    #[command(subcommand)]
    pub command: AccessCommand,
}

/// Access subcommands.
#[derive(Subcommand, Debug)]
pub enum AccessCommand {
    /// Check whether one role satisfies another.
    Check {
        /// Role held, e.g. shift_lead.
        held: String,
        /// Role required. Defaults to employee.
        required: Option<String>,
    },
}

/// Execute the access subcommand.
pub fn run_access(args: &AccessArgs) -> Result<u8> {
    match &args.command {
        AccessCommand::Check { held, required } => Ok(cmd_check(held, required.as_deref())),
    }
}

fn cmd_check(held: &str, required: Option<&str>) -> u8 {
    let granted = has_access_by_name(held, required);
    tracing::debug!(
        held,
        held_level = level_of(held),
        required = required.unwrap_or("employee"),
        granted,
        "access check"
    );
    if granted {
        println!("granted");
        0
    } else {
        println!("denied");
        1
    }
}
