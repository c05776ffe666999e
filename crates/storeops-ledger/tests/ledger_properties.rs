//! # Carton Ledger Properties
//!
//! Property-based verification of the running-total chain:
//! - the cached total always equals the sum of applied deltas
//! - undo right after an append restores the prior total, for every action
//! - history is bounded and ordered newest first

use proptest::prelude::*;
use storeops_core::Timestamp;
use storeops_ledger::{CartonAction, CartonChange, CartonLedger};

fn base() -> Timestamp {
    Timestamp::parse("2026-03-02T06:00:00Z").unwrap()
}

fn any_change() -> impl Strategy<Value = CartonChange> {
    (
        prop::sample::select(CartonAction::all().to_vec()),
        0u32..500,
        "[A-Z][a-z]{2,8}",
    )
        .prop_map(|(action, amount, who)| {
            CartonChange::new(action, Some(amount), who, "").unwrap()
        })
}

/// Changes paired with minute offsets that may repeat or go backwards.
fn any_script() -> impl Strategy<Value = Vec<(CartonChange, i64)>> {
    prop::collection::vec((any_change(), 0i64..30), 0..40)
}

fn replay(script: &[(CartonChange, i64)]) -> CartonLedger {
    let mut ledger = CartonLedger::new();
    for (change, minute) in script {
        ledger
            .append_at(change.clone(), base().checked_plus_minutes(*minute).unwrap())
            .unwrap();
    }
    ledger
}

proptest! {
    #[test]
    fn total_equals_sum_of_deltas(script in any_script()) {
        let mut ledger = CartonLedger::new();
        let mut sum = 0i64;
        for (change, minute) in &script {
            let entry = ledger.append_at(change.clone(), base().checked_plus_minutes(*minute).unwrap()).unwrap();
            sum += entry.delta;
            prop_assert_eq!(ledger.total(), sum);
            prop_assert!(ledger.total() >= 0);
        }
        prop_assert!(ledger.verify_chain().is_ok());
    }

    #[test]
    fn undo_restores_prior_total(script in any_script(), next in any_change()) {
        let mut ledger = replay(&script);
        let before = ledger.total();
        let len = ledger.len();
        ledger.append_at(next, base()).unwrap();
        prop_assert!(ledger.undo_last());
        prop_assert_eq!(ledger.total(), before);
        prop_assert_eq!(ledger.len(), len);
    }

    #[test]
    fn history_is_bounded_and_newest_first(script in any_script(), limit in 0usize..50) {
        let ledger = replay(&script);
        let history = ledger.history(limit);
        prop_assert!(history.len() <= limit.min(ledger.len()));
        for pair in history.windows(2) {
            prop_assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn rebuild_from_entries_is_identical(script in any_script()) {
        let ledger = replay(&script);
        let rebuilt = CartonLedger::from_entries(ledger.entries().to_vec()).unwrap();
        prop_assert_eq!(rebuilt, ledger);
    }
}

#[test]
fn three_appends_then_undo_all() {
    let mut ledger = CartonLedger::new();
    ledger.append(CartonChange::add(150, "System").with_note("init")).unwrap();
    ledger.append(CartonChange::remove(20, "Bob")).unwrap();
    ledger.append(CartonChange::set(80, "Alice").with_note("recount")).unwrap();

    assert!(ledger.undo_last());
    assert!(ledger.undo_last());
    assert_eq!(ledger.total(), 150);

    assert!(ledger.undo_last());
    assert_eq!(ledger.total(), 0);
    assert!(ledger.is_empty());
}
