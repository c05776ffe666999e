//! # Cartons Subcommand
//!
//! Reads and changes the store-wide carton count. Every change is recorded
//! in the name of the employee whose PIN was given.
//!
//! | Command   | Minimum role |
//! |-----------|--------------|
//! | `add`     | employee     |
//! | `remove`  | employee     |
//! | `set`     | shift_lead   |
//! | `reset`   | shift_lead   |
//! | `undo`    | shift_lead   |
//! | `total`   | employee     |
//! | `history` | employee     |

use anyhow::Result;
use clap::{Args, Subcommand};

use storeops_ledger::{CartonAction, CartonLedgerEntry, LedgerError};
use storeops_service::{ServiceConfig, StoreService};

use crate::{login, open_service};

/// Arguments for the `storeops cartons` subcommand.
#[derive(Args, Debug)]
pub struct CartonsArgs {
    #[command(subcommand)]
    pub command: CartonsCommand,
}

/// A carton change request.
#[derive(Args, Debug)]
pub struct ChangeArgs {
    /// Number of cartons.
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,
    #[arg(long)]
    pub pin: String,
    /// Free-text note stored with the entry.
    #[arg(long, default_value = "")]
    pub note: String,
}

/// Cartons subcommands.
#[derive(Subcommand, Debug)]
pub enum CartonsCommand {
    /// Receive cartons.
    Add(ChangeArgs),
    /// Take cartons out. The total never drops below zero.
    Remove(ChangeArgs),
    /// Record a physical recount.
    Set(ChangeArgs),
    /// Zero the count.
    Reset {
        /// Ignored; reset always zeroes the count.
        #[arg(allow_negative_numbers = true)]
        amount: Option<i64>,
        #[arg(long)]
        pin: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Undo the most recent change.
    Undo {
        #[arg(long)]
        pin: String,
    },
    /// Print the current total.
    Total {
        #[arg(long)]
        pin: String,
    },
    /// Show recent changes, newest first.
    History {
        #[arg(long)]
        pin: String,
        /// Maximum entries. Defaults to the configured history limit.
        #[arg(long)]
        limit: Option<usize>,
        /// Print entries as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Execute the cartons subcommand.
pub fn run_cartons(args: &CartonsArgs, config: &ServiceConfig) -> Result<u8> {
    let service = open_service(config)?;
    match &args.command {
        CartonsCommand::Add(change) => cmd_change(&service, CartonAction::Add, change),
        CartonsCommand::Remove(change) => cmd_change(&service, CartonAction::Remove, change),
        CartonsCommand::Set(change) => cmd_change(&service, CartonAction::Set, change),
        CartonsCommand::Reset { pin, note, .. } => cmd_reset(&service, pin, note),
        CartonsCommand::Undo { pin } => cmd_undo(&service, pin),
        CartonsCommand::Total { pin } => cmd_total(&service, pin),
        CartonsCommand::History { pin, limit, json } => {
            cmd_history(&service, pin, *limit, *json)
        }
    }
}

fn checked_amount(raw: i64) -> Result<u32, LedgerError> {
    if raw < 0 {
        return Err(LedgerError::NegativeAmount(raw));
    }
    u32::try_from(raw).map_err(|_| LedgerError::AmountTooLarge(raw))
}

fn cmd_change(service: &StoreService, action: CartonAction, args: &ChangeArgs) -> Result<u8> {
    let amount = checked_amount(args.amount)?;
    let caller = login(service, &args.pin)?;
    let entry = service.record_cartons(&caller, action, Some(amount), &args.note)?;
    report(&entry);
    Ok(0)
}

fn cmd_reset(service: &StoreService, pin: &str, note: &str) -> Result<u8> {
    let caller = login(service, pin)?;
    let entry = service.record_cartons(&caller, CartonAction::Reset, None, note)?;
    report(&entry);
    Ok(0)
}

fn report(entry: &CartonLedgerEntry) {
    let amount = entry
        .amount
        .map(|a| format!(" {a}"))
        .unwrap_or_default();
    println!(
        "OK: {}{amount} by {}, total {} ({:+})",
        entry.action, entry.employee_name, entry.total_after, entry.delta
    );
    if entry.was_clamped() {
        println!("  note: only {} cartons were on hand", -entry.delta);
    }
}

fn cmd_undo(service: &StoreService, pin: &str) -> Result<u8> {
    let caller = login(service, pin)?;
    match service.undo_last_carton(&caller)? {
        Some(entry) => {
            println!(
                "OK: undid {} by {} from {}, total {}",
                entry.action,
                entry.employee_name,
                entry.timestamp,
                entry.total_before()
            );
            Ok(0)
        }
        None => {
            println!("Nothing to undo.");
            Ok(1)
        }
    }
}

fn cmd_total(service: &StoreService, pin: &str) -> Result<u8> {
    let caller = login(service, pin)?;
    println!("{}", service.carton_total(&caller)?);
    Ok(0)
}

fn cmd_history(service: &StoreService, pin: &str, limit: Option<usize>, json: bool) -> Result<u8> {
    let caller = login(service, pin)?;
    let entries = service.carton_history(&caller, limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(0);
    }
    if entries.is_empty() {
        println!("No carton changes recorded.");
        return Ok(0);
    }
    for e in &entries {
        let amount = e.amount.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{}  {:<12} {:<6} {:>6} {:>+7} {:>7}  {}",
            e.timestamp, e.employee_name, e.action.as_str(), amount, e.delta, e.total_after, e.note
        );
    }
    Ok(0)
}
