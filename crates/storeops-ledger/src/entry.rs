//! # Ledger Entries

use serde::{Deserialize, Serialize};

use storeops_core::{EntryId, Timestamp};

use crate::action::CartonAction;

/// One immutable line of the carton ledger.
///
/// `delta` is the change actually applied to the running total, so
/// `previous total + delta == total_after` holds for every entry. For a
/// clamped remove the requested quantity survives in `amount` and
/// [`was_clamped`](Self::was_clamped) reports the difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartonLedgerEntry {
    pub id: EntryId,
    /// Display name of whoever made the change.
    pub employee_name: String,
    pub action: CartonAction,
    /// Requested quantity. `None` for reset.
    pub amount: Option<u32>,
    /// Signed change applied to the running total.
    pub delta: i64,
    /// Running total after this entry.
    pub total_after: i64,
    #[serde(default)]
    pub note: String,
    pub timestamp: Timestamp,
}

impl CartonLedgerEntry {
    /// Total immediately before this entry was applied.
    pub fn total_before(&self) -> i64 {
        self.total_after - self.delta
    }

    /// Whether a remove asked for more cartons than were on hand.
    pub fn was_clamped(&self) -> bool {
        match (self.action, self.amount) {
            (CartonAction::Remove, Some(requested)) => i64::from(requested) > -self.delta,
            _ => false,
        }
    }
}
