//! # storeops-service: The Store-Wide Service Object
//!
//! One [`StoreService`] is constructed at process start and handed to
//! whatever serves requests. It owns the carton ledger, the task index and
//! the employee directory; there is no module-level state anywhere.
//!
//! ## Responsibilities
//!
//! | Concern      | Module        | Notes                                           |
//! |--------------|---------------|-------------------------------------------------|
//! | Access       | [`auth`]      | PIN login, [`CallerIdentity`], role checks      |
//! | Config       | [`config`]    | Environment and YAML configuration              |
//! | Errors       | [`error`]     | [`ServiceError`], wraps the core taxonomy       |
//! | Persistence  | [`snapshot`]  | JSON snapshot, ledger chain re-verified on load |
//! | Operations   | [`service`]   | Ledger, task and directory operations           |
//!
//! ## Locking
//!
//! The ledger sits behind a `parking_lot::Mutex`, so `append` and
//! `undo_last` are serialized. The task index and directory sit behind
//! `RwLock`s. Snapshots are taken after the mutating lock is released,
//! under a dedicated persistence lock, acquiring ledger → tasks → directory
//! in that order.
//!
//! ## Crate Policy
//!
//! - No business logic beyond access policy: ledger and task semantics live
//!   in `storeops-ledger` and `storeops-state`.
//! - No HTTP types. Callers translate [`ServiceError`] into their own
//!   responses.

pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod snapshot;

pub use auth::{require_role, CallerIdentity, Employee, EmployeeDirectory, EmployeeProfile};
pub use config::{EmployeeSeed, ServiceConfig};
pub use error::ServiceError;
pub use service::StoreService;
pub use snapshot::StoreSnapshot;
