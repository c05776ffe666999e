//! # storeops-ledger: Carton Inventory Ledger
//!
//! Keeps the auditable history of carton-count changes for a store and the
//! running total derived from it.
//!
//! - **Action** (`action.rs`): the four ledger actions and the validated
//!   [`CartonChange`] request that feeds an append.
//!
//! - **Entry** (`entry.rs`): the immutable [`CartonLedgerEntry`] record with
//!   its signed delta and resulting total.
//!
//! - **Ledger** (`ledger.rs`): the [`CartonLedger`] itself. Appends compute
//!   the delta from the current total, undo pops the last appended entry,
//!   and [`CartonLedger::verify_chain`] re-checks every link.
//!
//! ## Chain Invariant
//!
//! For every entry `n`, `total_after[n] == total_after[n - 1] + delta[n]`,
//! with a predecessor total of 0 for the first entry, and no total is ever
//! negative. The cached total always equals the last entry's `total_after`.
//!
//! ## Crate Policy
//!
//! - Depends only on `storeops-core` internally.
//! - No locking here. The owner serializes `append` and `undo_last`.

pub mod action;
pub mod entry;
pub mod error;
pub mod ledger;

pub use action::{CartonAction, CartonChange};
pub use entry::CartonLedgerEntry;
pub use error::LedgerError;
pub use ledger::{CartonLedger, DEFAULT_HISTORY_LIMIT};
