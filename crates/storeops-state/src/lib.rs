//! # storeops-state: Task Lifecycle and Due Index
//!
//! Implements the scheduled-work side of StoreOps.
//!
//! ## Modules
//!
//! - **Task** (`task.rs`): the [`TaskLog`] record and its status. Any
//!   status may follow any other, and each change is logged as a
//!   [`TaskTransitionRecord`]. `completed_at` is stamped exactly once, on
//!   the first transition into `Done`.
//!
//! - **Due index** (`due_index.rs`): [`TaskDueIndex`] answers "what is
//!   pending for this employee, in due order" and "what is overdue at `now`".
//!   Every query takes `now` from the caller; nothing here reads the clock.
//!
//! ## Design
//!
//! Queries are a linear scan followed by a sort. A store schedules at most
//! a few thousand tasks, so no secondary index is maintained.

pub mod due_index;
pub mod task;

pub use due_index::{TaskDueIndex, TaskSummary};
pub use task::{TaskError, TaskLog, TaskStatus, TaskTransitionRecord};
