//! # Task Log Lifecycle
//!
//! ```text
//! Pending ──▶ Done    (stamps completed_at once)
//!    │  ──▶ Help
//!    │  ──▶ Missed
//!    ▲
//!    └──── any status may be set again by a shift lead
//! ```
//!
//! Status changes are permissive: a task marked `Help` can later be `Done`,
//! and a `Done` task can be reopened. What is fixed is `completed_at`, which
//! is written on the first entry into `Done` and never overwritten.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use storeops_core::{EmployeeId, StoreError, TaskId, Timestamp};

// ─── Task Status ─────────────────────────────────────────────────────

/// Status of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Scheduled and not yet worked.
    Pending,
    /// Completed.
    Done,
    /// The assignee asked for help.
    Help,
    /// The due time passed without completion.
    Missed,
}

impl TaskStatus {
    /// Returns all statuses.
    pub fn all() -> &'static [TaskStatus] {
        &[Self::Pending, Self::Done, Self::Help, Self::Missed]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Help => "help",
            Self::Missed => "missed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            "help" => Ok(Self::Help),
            "missed" => Ok(Self::Missed),
            other => Err(TaskError::UnknownStatus(other.to_string())),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised while creating or parsing task logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Status name is not one of pending, done, help, missed.
    #[error("unknown task status: {0:?}")]
    UnknownStatus(String),

    /// Tasks need a non-blank title.
    #[error("task title must not be empty")]
    EmptyTitle,
}

impl From<TaskError> for StoreError {
    fn from(err: TaskError) -> Self {
        StoreError::InvalidInput(err.to_string())
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a task status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTransitionRecord {
    pub from_status: TaskStatus,
    pub to_status: TaskStatus,
    pub at: Timestamp,
}

// ─── Task Log ────────────────────────────────────────────────────────

/// A unit of work assigned to one employee with a due time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    pub id: TaskId,
    pub assigned_to: EmployeeId,
    pub title: String,
    pub due_at: Timestamp,
    pub status: TaskStatus,
    /// Set on the first transition into `Done`.
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    /// Ordered log of status changes.
    #[serde(default)]
    pub transitions: Vec<TaskTransitionRecord>,
}

impl TaskLog {
    /// Create a pending task.
    ///
    /// # Errors
    ///
    /// [`TaskError::EmptyTitle`] if the title is blank.
    pub fn new(
        assigned_to: EmployeeId,
        title: impl Into<String>,
        due_at: Timestamp,
        created_at: Timestamp,
    ) -> Result<Self, TaskError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        Ok(Self {
            id: TaskId::new(),
            assigned_to,
            title,
            due_at,
            status: TaskStatus::Pending,
            completed_at: None,
            created_at,
            transitions: Vec::new(),
        })
    }

    /// Set the status at `now`. Returns whether the status changed.
    ///
    /// Entering `Done` stamps `completed_at` unless it is already set.
    pub fn mark(&mut self, status: TaskStatus, now: Timestamp) -> bool {
        if status == TaskStatus::Done && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        if status == self.status {
            return false;
        }
        self.transitions.push(TaskTransitionRecord {
            from_status: self.status,
            to_status: status,
            at: now,
        });
        self.status = status;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Pending with a due time strictly before `now`.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        self.is_pending() && self.due_at < now
    }

    /// Completed no later than its due time.
    pub fn completed_on_time(&self) -> bool {
        self.status == TaskStatus::Done && self.completed_at.is_some_and(|c| c <= self.due_at)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
