//! # Task Subcommand
//!
//! Schedules tasks and reports on pending and overdue work.
//!
//! - `schedule`: Assign a task to an employee (shift_lead).
//! - `pending`: Own pending tasks, another employee's, or everyone's.
//! - `overdue`: Pending tasks past due (shift_lead).
//! - `mark`: Set a task's status: pending, done, help or missed.
//! - `summary`: Outcome counts per employee or for the store.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use storeops_core::{EmployeeId, TaskId, Timestamp};
use storeops_service::{ServiceConfig, StoreService};
use storeops_state::{TaskLog, TaskStatus};

use crate::{login, open_service};

/// Arguments for the `storeops task` subcommand.
#[derive(Args, Debug)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

/// Task subcommands.
#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Schedule a task for an employee.
    Schedule {
        /// Employee id of the assignee.
        #[arg(long)]
        assignee: EmployeeId,
        #[arg(long)]
        title: String,
        /// Due time as RFC 3339 (e.g. 2026-03-02T14:00:00Z).
        #[arg(long, conflicts_with = "in_minutes")]
        due: Option<Timestamp>,
        /// Due this many minutes from now.
        #[arg(long)]
        in_minutes: Option<i64>,
        #[arg(long)]
        pin: String,
    },

    /// List pending tasks, earliest due first.
    Pending {
        #[arg(long)]
        pin: String,
        /// Show this employee's tasks instead of your own.
        #[arg(long, conflicts_with = "all")]
        employee: Option<EmployeeId>,
        /// Show every employee's pending tasks.
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },

    /// List pending tasks that are past due.
    Overdue {
        #[arg(long)]
        pin: String,
        /// Evaluate as of this time instead of now.
        #[arg(long)]
        at: Option<Timestamp>,
        #[arg(long)]
        json: bool,
    },

    /// Set a task's status.
    Mark {
        id: TaskId,
        /// pending, done, help or missed.
        status: TaskStatus,
        #[arg(long)]
        pin: String,
    },

    /// Show task outcome counts.
    Summary {
        #[arg(long)]
        pin: String,
        /// Employee to summarize. Defaults to yourself.
        #[arg(long, conflicts_with = "all")]
        employee: Option<EmployeeId>,
        /// Summarize the whole store.
        #[arg(long)]
        all: bool,
    },
}

/// Execute the task subcommand.
pub fn run_task(args: &TaskArgs, config: &ServiceConfig) -> Result<u8> {
    let service = open_service(config)?;
    let now = Timestamp::now();
    match &args.command {
        TaskCommand::Schedule {
            assignee,
            title,
            due,
            in_minutes,
            pin,
        } => {
            let due_at = due_time(*due, *in_minutes, now)?;
            cmd_schedule(&service, pin, *assignee, title, due_at, now)
        }
        TaskCommand::Pending {
            pin,
            employee,
            all,
            json,
        } => cmd_pending(&service, pin, *employee, *all, *json),
        TaskCommand::Overdue { pin, at, json } => {
            cmd_overdue(&service, pin, at.unwrap_or(now), *json)
        }
        TaskCommand::Mark { id, status, pin } => cmd_mark(&service, pin, id, *status, now),
        TaskCommand::Summary { pin, employee, all } => {
            cmd_summary(&service, pin, *employee, *all, now)
        }
    }
}

/// Resolve `--due` / `--in-minutes` to an absolute due time.
fn due_time(due: Option<Timestamp>, in_minutes: Option<i64>, now: Timestamp) -> Result<Timestamp> {
    match (due, in_minutes) {
        (Some(due), _) => Ok(due),
        (None, Some(minutes)) => match now.checked_plus_minutes(minutes) {
            Ok(due) => Ok(due),
            Err(e) => bail!("--in-minutes {minutes}: {e}"),
        },
        (None, None) => bail!("either --due or --in-minutes is required"),
    }
}

fn cmd_schedule(
    service: &StoreService,
    pin: &str,
    assignee: EmployeeId,
    title: &str,
    due_at: Timestamp,
    now: Timestamp,
) -> Result<u8> {
    let caller = login(service, pin)?;
    let task = service.schedule_task(&caller, assignee, title, due_at, now)?;
    println!("OK: scheduled {} ({}) due {}", task.title, task.id, task.due_at);
    Ok(0)
}

fn cmd_pending(
    service: &StoreService,
    pin: &str,
    employee: Option<EmployeeId>,
    all: bool,
    json: bool,
) -> Result<u8> {
    let caller = login(service, pin)?;
    let tasks = if all {
        service.all_pending(&caller)?
    } else {
        service.pending_for(&caller, employee.unwrap_or(caller.employee_id()))?
    };
    print_tasks(&tasks, json, "No pending tasks.")
}

fn cmd_overdue(service: &StoreService, pin: &str, now: Timestamp, json: bool) -> Result<u8> {
    let caller = login(service, pin)?;
    let tasks = service.overdue(&caller, now)?;
    print_tasks(&tasks, json, "No overdue tasks.")
}

fn print_tasks(tasks: &[TaskLog], json: bool, empty: &str) -> Result<u8> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
    } else if tasks.is_empty() {
        println!("{empty}");
    } else {
        for t in tasks {
            println!("{}  due {}  {:<8} {}  [{}]", t.id, t.due_at, t.status.as_str(), t.title, t.assigned_to);
        }
    }
    Ok(0)
}

fn cmd_mark(
    service: &StoreService,
    pin: &str,
    id: &TaskId,
    status: TaskStatus,
    now: Timestamp,
) -> Result<u8> {
    let caller = login(service, pin)?;
    match service.mark_task(&caller, id, status, now)? {
        Some(task) => {
            println!("OK: {} is now {}", task.title, task.status);
            Ok(0)
        }
        None => {
            println!("No task with id {id}.");
            Ok(1)
        }
    }
}

fn cmd_summary(
    service: &StoreService,
    pin: &str,
    employee: Option<EmployeeId>,
    all: bool,
    now: Timestamp,
) -> Result<u8> {
    let caller = login(service, pin)?;
    let scope = if all {
        None
    } else {
        Some(employee.unwrap_or(caller.employee_id()))
    };
    let s = service.task_summary(&caller, scope, now)?;
    println!("Tasks: {}", s.total);
    println!("  Pending: {} ({} overdue)", s.pending, s.overdue);
    println!("  Done: {} ({} on time)", s.done, s.done_on_time);
    println!("  Help: {}", s.help);
    println!("  Missed: {}", s.missed);
    Ok(0)
}
