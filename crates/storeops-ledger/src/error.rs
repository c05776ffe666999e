//! # Ledger Errors

use thiserror::Error;

use storeops_core::StoreError;

use crate::action::CartonAction;

/// Errors raised by carton ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The action name is not one of add, remove, set, reset.
    #[error("unknown carton action: {0:?}")]
    UnknownAction(String),

    /// add, remove and set need an amount.
    #[error("carton action {action} requires an amount")]
    MissingAmount {
        /// The action that was missing its amount.
        action: CartonAction,
    },

    /// Amounts are carton counts and cannot be negative.
    #[error("carton amount must not be negative, got {0}")]
    NegativeAmount(i64),

    /// Amount does not fit the ledger's count range.
    #[error("carton amount {0} exceeds the maximum of {max}", max = u32::MAX)]
    AmountTooLarge(i64),

    /// Adding would overflow the running total.
    #[error("adding {amount} cartons to {total} overflows the running total")]
    Overflow {
        /// Total before the append.
        total: i64,
        /// Requested amount.
        amount: u32,
    },

    /// A computed or stored total is below zero.
    #[error("running total would become negative ({total})")]
    NegativeTotal {
        /// The offending total.
        total: i64,
    },

    /// A stored entry does not follow from its predecessor.
    #[error("ledger chain broken at entry {index}: expected total {expected}, found {actual}")]
    BrokenChain {
        /// Position of the entry in append order.
        index: usize,
        /// `total_after` implied by the predecessor and the entry's delta.
        expected: i64,
        /// `total_after` recorded on the entry.
        actual: i64,
    },

    /// A stored entry's delta or total is not what its action produces
    /// from the previous total.
    #[error("ledger entry {index} does not match its {action} action")]
    InconsistentEntry {
        /// Position of the entry in append order.
        index: usize,
        /// The action recorded on the entry.
        action: CartonAction,
    },
}

impl LedgerError {
    /// Whether this error means the ledger state itself is corrupt.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::NegativeTotal { .. } | Self::BrokenChain { .. } | Self::InconsistentEntry { .. }
        )
    }
}

impl From<LedgerError> for StoreError {
    fn from(err: LedgerError) -> Self {
        if err.is_invariant_violation() {
            StoreError::InvariantViolation(err.to_string())
        } else {
            StoreError::InvalidInput(err.to_string())
        }
    }
}
