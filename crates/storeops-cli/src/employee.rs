//! # Employee Subcommand
//!
//! Manages the employee directory.
//!
//! - `add`: Register an employee. With no `--pin`, only allowed while the
//!   directory is empty.
//! - `list`: Show every employee and whether they are active.
//! - `deactivate`: Revoke an employee's PIN.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use storeops_core::{EmployeeId, Role};
use storeops_service::{ServiceConfig, StoreService};

use crate::{login, open_service};

/// Arguments for the `storeops employee` subcommand.
#[derive(Args, Debug)]
pub struct EmployeeArgs {
    #[command(subcommand)]
    pub command: EmployeeCommand,
}

/// Employee subcommands.
#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    /// Register a new employee.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Role: employee, shift_lead, admin or manager.
        #[arg(long, default_value = "employee")]
        role: Role,
        /// PIN the new employee will log in with (4 to 8 digits).
        #[arg(long)]
        new_pin: String,
        /// PIN of the admin performing the registration.
        #[arg(long)]
        pin: Option<String>,
    },

    /// List all employees.
    List {
        #[arg(long)]
        pin: String,
    },

    /// Deactivate an employee.
    Deactivate {
        /// Employee id, as printed by `list`.
        id: EmployeeId,
        #[arg(long)]
        pin: String,
    },
}

/// Execute the employee subcommand.
pub fn run_employee(args: &EmployeeArgs, config: &ServiceConfig) -> Result<u8> {
    let service = open_service(config)?;
    match &args.command {
        EmployeeCommand::Add {
            name,
            role,
            new_pin,
            pin,
        } => cmd_add(&service, name, *role, new_pin, pin.as_deref()),
        EmployeeCommand::List { pin } => cmd_list(&service, pin),
        EmployeeCommand::Deactivate { id, pin } => cmd_deactivate(&service, id, pin),
    }
}

fn cmd_add(
    service: &StoreService,
    name: &str,
    role: Role,
    new_pin: &str,
    pin: Option<&str>,
) -> Result<u8> {
    let caller = pin.map(|p| login(service, p)).transpose()?;
    let profile = service
        .register_employee(caller.as_ref(), name, role, new_pin)
        .with_context(|| format!("failed to register {name}"))?;
    println!("OK: registered {} as {} ({})", profile.name, profile.role, profile.id);
    Ok(0)
}

fn cmd_list(service: &StoreService, pin: &str) -> Result<u8> {
    let caller = login(service, pin)?;
    let employees = service.list_employees(&caller)?;
    if employees.is_empty() {
        println!("No employees registered.");
        return Ok(0);
    }
    println!("Employees ({}):", employees.len());
    for e in &employees {
        let status = if e.active { "active" } else { "inactive" };
        println!("  {}  {:<20} {:<10} {status}", e.id, e.name, e.role.as_str());
    }
    Ok(0)
}

fn cmd_deactivate(service: &StoreService, id: &EmployeeId, pin: &str) -> Result<u8> {
    let caller = login(service, pin)?;
    if service.deactivate_employee(&caller, id)? {
        println!("OK: deactivated {id}");
        Ok(0)
    } else {
        println!("No employee with id {id}.");
        Ok(1)
    }
}
