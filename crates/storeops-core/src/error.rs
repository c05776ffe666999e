//! # Error Types
//!
//! The error taxonomy shared by every StoreOps crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - `NotFound` exists for callers that need to name an absent record in an
//!   error chain. Core lookups themselves return `Option`/`bool`, because
//!   absence is an expected outcome.
//! - `InvalidInput` rejects malformed actions, amounts, roles and PINs
//!   explicitly. Nothing is silently defaulted.
//! - `InvariantViolation` is raised when a running total would go negative
//!   or a stored ledger chain does not add up. Callers must stop mutating the
//!   affected ledger when they see it.

use thiserror::Error;

/// Top-level error type for StoreOps core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A referenced record (task, ledger entry, employee) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed action, amount, role, or credential.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A structural invariant does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl StoreError {
    /// Whether this error must halt further processing of the affected state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}
