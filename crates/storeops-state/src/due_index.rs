//! # Task Due Index
//!
//! Holds every task log for the store and answers due-time queries.
//! Results are returned as owned copies sorted ascending by `due_at`, with
//! `created_at` and then id breaking ties so repeated queries agree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storeops_core::{EmployeeId, TaskId, Timestamp};

use crate::task::{TaskError, TaskLog, TaskStatus};

/// All task logs, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDueIndex {
    tasks: BTreeMap<TaskId, TaskLog>,
}

/// Read-only aggregate of task outcomes, as handed to reporting consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub overdue: usize,
    pub done: usize,
    pub done_on_time: usize,
    pub help: usize,
    pub missed: usize,
}

impl TaskDueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from previously stored tasks.
    pub fn from_tasks(tasks: impl IntoIterator<Item = TaskLog>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Insert or replace a task, returning the previous version.
    pub fn insert(&mut self, task: TaskLog) -> Option<TaskLog> {
        self.tasks.insert(task.id, task)
    }

    /// Create a pending task and index it.
    pub fn schedule(
        &mut self,
        assigned_to: EmployeeId,
        title: impl Into<String>,
        due_at: Timestamp,
        now: Timestamp,
    ) -> Result<TaskLog, TaskError> {
        let task = TaskLog::new(assigned_to, title, due_at, now)?;
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    pub fn get(&self, id: &TaskId) -> Option<&TaskLog> {
        self.tasks.get(id)
    }

    /// Every task, in id order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskLog> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Pending tasks assigned to `employee`, earliest due first.
    pub fn pending_for(&self, employee: EmployeeId) -> Vec<TaskLog> {
        self.select(|t| t.is_pending() && t.assigned_to == employee)
    }

    /// Pending tasks for everyone, earliest due first.
    pub fn all_pending(&self) -> Vec<TaskLog> {
        self.select(TaskLog::is_pending)
    }

    /// Pending tasks whose due time is strictly before `now`.
    pub fn overdue(&self, now: Timestamp) -> Vec<TaskLog> {
        self.select(|t| t.is_overdue(now))
    }

    /// Set a task's status. Returns the updated task, or `None` for an
    /// unknown id.
    ///
    /// Repeating `Done` leaves the original `completed_at` in place.
    pub fn mark_status(
        &mut self,
        id: &TaskId,
        status: TaskStatus,
        now: Timestamp,
    ) -> Option<TaskLog> {
        let task = self.tasks.get_mut(id)?;
        task.mark(status, now);
        Some(task.clone())
    }

    /// Outcome counts, optionally restricted to one employee.
    pub fn summary(&self, employee: Option<EmployeeId>, now: Timestamp) -> TaskSummary {
        let mut summary = TaskSummary::default();
        let scoped = self
            .tasks
            .values()
            .filter(|t| employee.map_or(true, |e| t.assigned_to == e));
        for task in scoped {
            summary.total += 1;
            match task.status {
                TaskStatus::Pending => {
                    summary.pending += 1;
                    if task.is_overdue(now) {
                        summary.overdue += 1;
                    }
                }
                TaskStatus::Done => {
                    summary.done += 1;
                    if task.completed_on_time() {
                        summary.done_on_time += 1;
                    }
                }
                TaskStatus::Help => summary.help += 1,
                TaskStatus::Missed => summary.missed += 1,
            }
        }
        summary
    }

    fn select(&self, pred: impl Fn(&TaskLog) -> bool) -> Vec<TaskLog> {
        let mut out: Vec<TaskLog> = self.tasks.values().filter(|&t| pred(t)).cloned().collect();
        out.sort_by_key(|t| (t.due_at, t.created_at, t.id));
        out
    }
}
