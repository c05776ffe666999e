//! # Snapshot Persistence
//!
//! The whole store is one pretty-printed JSON document at
//! `<data_dir>/store.json`. Writes go to a sibling temp file which is then
//! renamed over the original, so a crash mid-write leaves the previous
//! snapshot intact.
//!
//! Loading re-verifies the carton ledger chain and the employee records. A
//! snapshot whose entries do not form a valid running total, whose entries
//! disagree with their own action, or whose directory repeats an id is
//! refused with `StoreError::InvariantViolation`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use storeops_core::StoreError;
use storeops_ledger::{CartonLedger, CartonLedgerEntry};
use storeops_state::{TaskDueIndex, TaskLog};

use crate::auth::{Employee, EmployeeDirectory};
use crate::error::ServiceError;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// File name inside the data directory.
pub const SNAPSHOT_FILE: &str = "store.json";

/// Serialized form of the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    /// Ledger entries in append order.
    pub ledger: Vec<CartonLedgerEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskLog>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl StoreSnapshot {
    /// Capture the given state.
    pub fn capture(
        ledger: &CartonLedger,
        tasks: &TaskDueIndex,
        directory: &EmployeeDirectory,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            ledger: ledger.entries().to_vec(),
            tasks: tasks.tasks().cloned().collect(),
            employees: directory.employees().to_vec(),
        }
    }

    /// Path of the snapshot file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }

    /// Read the snapshot from `dir`. Returns `None` if no snapshot exists.
    pub fn load(dir: &Path) -> Result<Option<Self>, ServiceError> {
        let path = Self::path_in(dir);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot found");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let snapshot: Self = serde_json::from_str(&content).map_err(|e| {
            ServiceError::Persistence(format!("cannot parse {}: {e}", path.display()))
        })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ServiceError::Persistence(format!(
                "unsupported snapshot version {} in {} (expected {SNAPSHOT_VERSION})",
                snapshot.version,
                path.display()
            )));
        }
        tracing::debug!(
            path = %path.display(),
            entries = snapshot.ledger.len(),
            tasks = snapshot.tasks.len(),
            employees = snapshot.employees.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Write the snapshot into `dir`, creating the directory if needed.
    pub fn save(&self, dir: &Path) -> Result<(), ServiceError> {
        std::fs::create_dir_all(dir)?;
        let path = Self::path_in(dir);
        let tmp = dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), entries = self.ledger.len(), "snapshot written");
        Ok(())
    }

    /// Rebuild live state, verifying the ledger chain.
    pub fn into_parts(
        self,
    ) -> Result<(CartonLedger, TaskDueIndex, EmployeeDirectory), StoreError> {
        let ledger = CartonLedger::from_entries(self.ledger).map_err(|e| {
            tracing::error!(error = %e, "stored carton ledger failed verification");
            StoreError::InvariantViolation(e.to_string())
        })?;
        let directory = EmployeeDirectory::from_employees(self.employees).map_err(|e| {
            tracing::error!(error = %e, "stored employee directory failed verification");
            e
        })?;
        Ok((ledger, TaskDueIndex::from_tasks(self.tasks), directory))
    }
}
