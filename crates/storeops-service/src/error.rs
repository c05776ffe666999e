//! # Service Errors
//!
//! [`ServiceError`] is what callers of [`StoreService`](crate::StoreService)
//! see. It wraps the core taxonomy and adds the access and I/O failures
//! that only exist once there is a caller and a disk.

use thiserror::Error;

use storeops_core::{Role, StoreError};
use storeops_ledger::LedgerError;
use storeops_state::TaskError;

/// Service-level error type.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Core error (not found, invalid input, invariant violation).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No active employee matches the supplied credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's role is below the operation's threshold.
    #[error("forbidden: role '{required}' required, caller has '{held}'")]
    Forbidden {
        /// Minimum role for the operation.
        required: Role,
        /// The caller's role.
        held: Role,
    },

    /// The carton ledger hit an invariant violation and accepts no more
    /// changes until the process restarts.
    #[error("carton ledger halted: {0}")]
    LedgerHalted(String),

    /// Snapshot could not be read, parsed, or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Short machine-readable code, stable across message changes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            Self::Store(StoreError::InvalidInput(_)) => "INVALID_INPUT",
            Self::Store(StoreError::InvariantViolation(_)) => "INVARIANT_VIOLATION",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::LedgerHalted(_) => "LEDGER_HALTED",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::Store(StoreError::InvalidInput(msg.into()))
    }
}

impl From<LedgerError> for ServiceError {
    fn from(err: LedgerError) -> Self {
        Self::Store(err.into())
    }
}

impl From<TaskError> for ServiceError {
    fn from(err: TaskError) -> Self {
        Self::Store(err.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
