//! # storeops-core: Foundational Types for StoreOps
//!
//! The leaf crate of the StoreOps workspace. It defines the primitives every
//! other crate builds on: who may do what ([`Role`]), how records are
//! identified, how time is represented, and how failures are classified.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `EmployeeId`, `TaskId` and
//!    `EntryId` are distinct types; a task id cannot be passed where a ledger
//!    entry id is expected.
//!
//! 2. **Single `Role` enum.** One definition with four variants and an
//!    ordinal level. Access checks are a pure comparison, see
//!    [`role::has_access`].
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with seconds precision.
//!    Core operations take `now` as an argument instead of reading the clock.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `storeops-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

pub use error::StoreError;
pub use identity::{EmployeeId, EntryId, TaskId};
pub use role::{has_access, has_access_by_name, level_of, Role};
pub use temporal::Timestamp;
