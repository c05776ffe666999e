//! # Carton Ledger
//!
//! Append-only sequence of [`CartonLedgerEntry`] values with a cached
//! running total.
//!
//! | Action | delta                 | new total              |
//! |--------|-----------------------|------------------------|
//! | add    | `amount`              | `total + amount`       |
//! | remove | `new_total - total`   | `max(0, total - amount)` |
//! | set    | `amount - total`      | `amount`               |
//! | reset  | `-total`              | `0`                    |
//!
//! Undo removes the structurally last appended entry, regardless of
//! timestamp ties, and restores the total recorded on the entry before it.

use storeops_core::{EntryId, Timestamp};

use crate::action::{CartonAction, CartonChange};
use crate::entry::CartonLedgerEntry;
use crate::error::LedgerError;

/// Number of entries [`CartonLedger::recent`] returns.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// The store-wide carton ledger.
///
/// Fields are private: the only mutations are [`append`](Self::append),
/// [`append_at`](Self::append_at) and [`undo_last`](Self::undo_last), which
/// keep the cached total equal to the last entry's `total_after`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartonLedger {
    entries: Vec<CartonLedgerEntry>,
    total: i64,
}

impl CartonLedger {
    /// Create an empty ledger with a total of 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from entries in append order, verifying the chain.
    ///
    /// # Errors
    ///
    /// [`LedgerError::BrokenChain`] or [`LedgerError::NegativeTotal`] if
    /// the entries do not form a valid running total, and
    /// [`LedgerError::InconsistentEntry`] if an entry's delta or total is
    /// not what its action yields.
    pub fn from_entries(entries: Vec<CartonLedgerEntry>) -> Result<Self, LedgerError> {
        verify(&entries)?;
        let total = entries.last().map_or(0, |e| e.total_after);
        Ok(Self { entries, total })
    }

    /// Append a change stamped with the current time.
    pub fn append(&mut self, change: CartonChange) -> Result<CartonLedgerEntry, LedgerError> {
        self.append_at(change, Timestamp::now())
    }

    /// Append a change with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`] if an add would overflow the total. The
    /// ledger is left untouched on error.
    pub fn append_at(
        &mut self,
        change: CartonChange,
        at: Timestamp,
    ) -> Result<CartonLedgerEntry, LedgerError> {
        let (delta, total_after) = step(self.total, change.action(), change.amount())?;
        let entry = CartonLedgerEntry {
            id: EntryId::new(),
            employee_name: change.employee_name().to_string(),
            action: change.action(),
            amount: change.amount(),
            delta,
            total_after,
            note: change.note().to_string(),
            timestamp: at,
        };
        self.entries.push(entry.clone());
        self.total = total_after;
        Ok(entry)
    }

    /// Current running total. O(1).
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Up to `limit` entries, most recent first.
    ///
    /// Ordered by descending timestamp; entries sharing a timestamp are
    /// ordered by descending append position.
    pub fn history(&self, limit: usize) -> Vec<CartonLedgerEntry> {
        let mut out: Vec<CartonLedgerEntry> = self.entries.iter().rev().cloned().collect();
        // Stable sort keeps the reversed append order among equal timestamps.
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out.truncate(limit);
        out
    }

    /// [`history`](Self::history) with [`DEFAULT_HISTORY_LIMIT`].
    pub fn recent(&self) -> Vec<CartonLedgerEntry> {
        self.history(DEFAULT_HISTORY_LIMIT)
    }

    /// The most recently appended entry.
    pub fn last_entry(&self) -> Option<&CartonLedgerEntry> {
        self.entries.last()
    }

    /// Remove the most recently appended entry and return it.
    pub fn pop_last(&mut self) -> Option<CartonLedgerEntry> {
        let popped = self.entries.pop()?;
        self.total = self.entries.last().map_or(0, |e| e.total_after);
        Some(popped)
    }

    /// Undo the most recent append. Returns `false` if the ledger is empty.
    pub fn undo_last(&mut self) -> bool {
        self.pop_last().is_some()
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[CartonLedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-check every link of the chain and the cached total.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        verify(&self.entries)?;
        let expected = self.entries.last().map_or(0, |e| e.total_after);
        if self.total != expected {
            return Err(LedgerError::BrokenChain {
                index: self.entries.len(),
                expected,
                actual: self.total,
            });
        }
        Ok(())
    }
}

/// Compute `(delta, new_total)` for an action against `total`.
fn step(total: i64, action: CartonAction, amount: Option<u32>) -> Result<(i64, i64), LedgerError> {
    let requested = match (action.takes_amount(), amount) {
        (true, Some(a)) => i64::from(a),
        (true, None) => return Err(LedgerError::MissingAmount { action }),
        (false, _) => 0,
    };

    let new_total = match action {
        CartonAction::Add => total.checked_add(requested).ok_or(LedgerError::Overflow {
            total,
            amount: amount.unwrap_or_default(),
        })?,
        CartonAction::Remove => (total - requested).max(0),
        CartonAction::Set => requested,
        CartonAction::Reset => 0,
    };

    if new_total < 0 {
        return Err(LedgerError::NegativeTotal { total: new_total });
    }
    Ok((new_total - total, new_total))
}

/// Check each entry against its predecessor: the delta chain, the sign of
/// the total, and that the entry is exactly what replaying its action gives.
fn verify(entries: &[CartonLedgerEntry]) -> Result<(), LedgerError> {
    let mut previous = 0i64;
    for (index, entry) in entries.iter().enumerate() {
        let expected = previous.checked_add(entry.delta);
        if expected != Some(entry.total_after) {
            let expected = expected.unwrap_or(i64::MAX);
            return Err(LedgerError::BrokenChain {
                index,
                expected,
                actual: entry.total_after,
            });
        }
        if entry.total_after < 0 {
            return Err(LedgerError::NegativeTotal {
                total: entry.total_after,
            });
        }
        let inconsistent = LedgerError::InconsistentEntry {
            index,
            action: entry.action,
        };
        if entry.action.takes_amount() != entry.amount.is_some() {
            return Err(inconsistent);
        }
        match step(previous, entry.action, entry.amount) {
            Ok((delta, total_after))
                if delta == entry.delta && total_after == entry.total_after => {}
            _ => return Err(inconsistent),
        }
        previous = entry.total_after;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minute: i64) -> Timestamp {
        Timestamp::parse("2026-03-02T06:00:00Z")
            .unwrap()
            .checked_plus_minutes(minute).unwrap()
    }

    fn seeded(total: u32) -> CartonLedger {
        let mut ledger = CartonLedger::new();
        ledger
            .append_at(CartonChange::add(total, "System").with_note("init"), at(0))
            .unwrap();
        ledger
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = CartonLedger::new();
        assert_eq!(ledger.total(), 0);
        assert!(ledger.is_empty());
        assert!(ledger.last_entry().is_none());
        assert!(ledger.history(10).is_empty());
    }

    #[test]
    fn test_initial_add() {
        let ledger = seeded(150);
        assert_eq!(ledger.total(), 150);
        let history = ledger.history(10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, 150);
        assert_eq!(history[0].total_after, 150);
        assert_eq!(history[0].note, "init");
    }

    #[test]
    fn test_remove_clamps_at_zero_and_records_applied_delta() {
        let mut ledger = seeded(150);
        let entry = ledger
            .append_at(CartonChange::remove(200, "Bob").with_note("oversell"), at(1))
            .unwrap();
        assert_eq!(ledger.total(), 0);
        assert_eq!(entry.amount, Some(200));
        assert_eq!(entry.delta, -150);
        assert!(entry.was_clamped());
        ledger.verify_chain().unwrap();
    }

    #[test]
    fn test_set_computes_delta_from_total() {
        let mut ledger = seeded(150);
        let entry = ledger
            .append_at(CartonChange::set(80, "Alice").with_note("recount"), at(1))
            .unwrap();
        assert_eq!(entry.delta, -70);
        assert_eq!(ledger.total(), 80);
    }

    #[test]
    fn test_reset_zeroes_total() {
        let mut ledger = seeded(42);
        let entry = ledger.append_at(CartonChange::reset("Alice"), at(1)).unwrap();
        assert_eq!(entry.delta, -42);
        assert_eq!(entry.amount, None);
        assert_eq!(ledger.total(), 0);
    }

    #[test]
    fn test_add_overflow_leaves_ledger_untouched() {
        // No verified chain of u32 amounts gets this high, so build it directly.
        let mut ledger = CartonLedger {
            entries: vec![CartonLedgerEntry {
                id: EntryId::new(),
                employee_name: "System".into(),
                action: CartonAction::Set,
                amount: Some(u32::MAX),
                delta: i64::MAX,
                total_after: i64::MAX,
                note: String::new(),
                timestamp: at(0),
            }],
            total: i64::MAX,
        };
        let err = ledger.append_at(CartonChange::add(1, "Bob"), at(1)).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total(), i64::MAX);
    }

    #[test]
    fn test_undo_restores_previous_total() {
        let mut ledger = seeded(150);
        ledger.append_at(CartonChange::add(30, "Bob"), at(1)).unwrap();
        assert!(ledger.undo_last());
        assert_eq!(ledger.total(), 150);
    }

    #[test]
    fn test_undo_sequence_to_empty() {
        let mut ledger = seeded(10);
        ledger.append_at(CartonChange::add(5, "Bob"), at(1)).unwrap();
        ledger.append_at(CartonChange::set(3, "Ana"), at(2)).unwrap();

        assert!(ledger.undo_last());
        assert!(ledger.undo_last());
        assert_eq!(ledger.total(), 10);
        assert!(ledger.undo_last());
        assert_eq!(ledger.total(), 0);
        assert!(ledger.is_empty());
        assert!(!ledger.undo_last());
    }

    #[test]
    fn test_undo_uses_append_order_not_timestamp() {
        let mut ledger = CartonLedger::new();
        ledger.append_at(CartonChange::add(10, "Bob"), at(5)).unwrap();
        // Appended later but stamped earlier.
        let late = ledger.append_at(CartonChange::add(7, "Ana"), at(1)).unwrap();

        assert_eq!(ledger.last_entry().map(|e| e.id), Some(late.id));
        let popped = ledger.pop_last().unwrap();
        assert_eq!(popped.id, late.id);
        assert_eq!(ledger.total(), 10);
    }

    #[test]
    fn test_history_order_and_limit() {
        let mut ledger = CartonLedger::new();
        let first = ledger.append_at(CartonChange::add(1, "A"), at(0)).unwrap();
        let second = ledger.append_at(CartonChange::add(1, "B"), at(0)).unwrap();
        let third = ledger.append_at(CartonChange::add(1, "C"), at(3)).unwrap();

        let ids: Vec<EntryId> = ledger.history(10).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
        assert_eq!(ledger.history(2).len(), 2);
        assert!(ledger.history(0).is_empty());
        assert_eq!(ledger.recent().len(), 3);
    }

    #[test]
    fn test_from_entries_rejects_broken_chain() {
        let mut ledger = seeded(20);
        ledger.append_at(CartonChange::add(5, "Bob"), at(1)).unwrap();
        let mut entries = ledger.entries().to_vec();
        entries[1].total_after = 99;

        let err = CartonLedger::from_entries(entries).unwrap_err();
        assert_eq!(
            err,
            LedgerError::BrokenChain {
                index: 1,
                expected: 25,
                actual: 99
            }
        );
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_from_entries_rejects_negative_total() {
        let ledger = seeded(20);
        let mut entries = ledger.entries().to_vec();
        entries[0].delta = -5;
        entries[0].total_after = -5;
        assert_eq!(
            CartonLedger::from_entries(entries),
            Err(LedgerError::NegativeTotal { total: -5 })
        );
    }

    #[test]
    fn test_from_entries_restores_total() {
        let mut ledger = seeded(20);
        ledger.append_at(CartonChange::remove(4, "Bob"), at(1)).unwrap();
        let rebuilt = CartonLedger::from_entries(ledger.entries().to_vec()).unwrap();
        assert_eq!(rebuilt.total(), 16);
        assert_eq!(rebuilt.len(), 2);
    }

    fn inconsistent(index: usize, action: CartonAction) -> LedgerError {
        LedgerError::InconsistentEntry { index, action }
    }

    #[test]
    fn test_from_entries_rejects_set_with_wrong_total() {
        let mut ledger = seeded(20);
        ledger.append_at(CartonChange::set(8, "Lee"), at(1)).unwrap();
        let mut entries = ledger.entries().to_vec();
        // Chain stays intact: 20 + (-10) = 10, but a set to 8 ends at 8.
        entries[1].delta = -10;
        entries[1].total_after = 10;
        assert_eq!(
            CartonLedger::from_entries(entries),
            Err(inconsistent(1, CartonAction::Set))
        );
    }

    #[test]
    fn test_from_entries_rejects_reset_above_zero() {
        let mut ledger = seeded(20);
        ledger.append_at(CartonChange::reset("Lee"), at(1)).unwrap();
        let mut entries = ledger.entries().to_vec();
        entries[1].delta = -15;
        entries[1].total_after = 5;
        assert_eq!(
            CartonLedger::from_entries(entries),
            Err(inconsistent(1, CartonAction::Reset))
        );
    }

    #[test]
    fn test_from_entries_rejects_add_with_wrong_delta() {
        let ledger = seeded(20);
        let mut entries = ledger.entries().to_vec();
        entries[0].delta = 25;
        entries[0].total_after = 25;
        let err = CartonLedger::from_entries(entries).unwrap_err();
        assert_eq!(err, inconsistent(0, CartonAction::Add));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_from_entries_rejects_remove_not_clamped() {
        let mut ledger = seeded(10);
        ledger.append_at(CartonChange::remove(4, "Bob"), at(1)).unwrap();
        let mut entries = ledger.entries().to_vec();
        entries[1].delta = -2;
        entries[1].total_after = 8;
        assert_eq!(
            CartonLedger::from_entries(entries),
            Err(inconsistent(1, CartonAction::Remove))
        );
    }

    #[test]
    fn test_from_entries_rejects_amount_mismatch_with_action() {
        let mut ledger = seeded(10);
        ledger.append_at(CartonChange::reset("Lee"), at(1)).unwrap();
        let mut missing = ledger.entries().to_vec();
        missing[0].amount = None;
        assert_eq!(
            CartonLedger::from_entries(missing),
            Err(inconsistent(0, CartonAction::Add))
        );

        let mut extra = ledger.entries().to_vec();
        extra[1].amount = Some(3);
        assert_eq!(
            CartonLedger::from_entries(extra),
            Err(inconsistent(1, CartonAction::Reset))
        );
    }
}
