//! # Integration Tests for storeops-service
//!
//! Snapshot persistence across reopen, refusal of a tampered ledger,
//! configured employee seeding, and concurrent changes through one shared
//! service.

use storeops_core::{Role, Timestamp};
use storeops_ledger::CartonAction;
use storeops_service::{EmployeeSeed, ServiceConfig, StoreService, StoreSnapshot};
use storeops_state::TaskStatus;

fn seeded_config(dir: &std::path::Path) -> ServiceConfig {
    ServiceConfig {
        employees: vec![
            EmployeeSeed {
                name: "Maria".into(),
                role: Role::Manager,
                pin: "9001".into(),
            },
            EmployeeSeed {
                name: "Bob".into(),
                role: Role::Employee,
                pin: "1234".into(),
            },
        ],
        ..ServiceConfig::with_data_dir(dir)
    }
}

fn at(minute: i64) -> Timestamp {
    Timestamp::parse("2026-03-02T06:00:00Z")
        .unwrap()
        .checked_plus_minutes(minute).unwrap()
}

// -- Persistence --------------------------------------------------------------

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let task_id = {
        let service = StoreService::open(seeded_config(dir.path())).unwrap();
        let maria = service.login("9001").unwrap();
        let bob = service.login("1234").unwrap();
        service
            .record_cartons(&bob, CartonAction::Add, Some(24), "truck")
            .unwrap();
        service
            .record_cartons(&bob, CartonAction::Remove, Some(4), "")
            .unwrap();
        service
            .schedule_task(&maria, bob.employee_id(), "Restock cooler", at(60), at(0))
            .unwrap()
            .id
    };

    let service = StoreService::open(seeded_config(dir.path())).unwrap();
    let bob = service.login("1234").unwrap();
    assert_eq!(service.carton_total(&bob).unwrap(), 20);
    let history = service.carton_history(&bob, None).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].note, "");
    assert_eq!(history[1].note, "truck");

    let pending = service.my_pending_tasks(&bob).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, task_id);

    // Seeds are not registered twice.
    let maria = service.login("9001").unwrap();
    assert_eq!(service.list_employees(&maria).unwrap().len(), 2);
}

#[test]
fn test_undo_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    {
        let service = StoreService::open(seeded_config(dir.path())).unwrap();
        let maria = service.login("9001").unwrap();
        service
            .record_cartons(&maria, CartonAction::Set, Some(30), "")
            .unwrap();
        service
            .record_cartons(&maria, CartonAction::Add, Some(5), "")
            .unwrap();
        service.undo_last_carton(&maria).unwrap().unwrap();
    }
    let service = StoreService::open(seeded_config(dir.path())).unwrap();
    let maria = service.login("9001").unwrap();
    assert_eq!(service.carton_total(&maria).unwrap(), 30);
    assert_eq!(service.carton_history(&maria, Some(10)).unwrap().len(), 1);
}

#[test]
fn test_tampered_snapshot_refuses_to_open() {
    let dir = tempfile::tempdir().unwrap();
    {
        let service = StoreService::open(seeded_config(dir.path())).unwrap();
        let bob = service.login("1234").unwrap();
        service
            .record_cartons(&bob, CartonAction::Add, Some(10), "")
            .unwrap();
        service
            .record_cartons(&bob, CartonAction::Add, Some(10), "")
            .unwrap();
    }

    let mut snapshot = StoreSnapshot::load(dir.path()).unwrap().unwrap();
    snapshot.ledger[0].delta = 11;
    snapshot.save(dir.path()).unwrap();

    let err = StoreService::open(seeded_config(dir.path())).unwrap_err();
    assert_eq!(err.code(), "INVARIANT_VIOLATION");
}

#[test]
fn test_in_memory_service_writes_nothing() {
    let service = StoreService::open(ServiceConfig::default()).unwrap();
    service
        .register_employee(None, "Maria", Role::Manager, "9001")
        .unwrap();
    assert!(service.config().data_dir.is_none());
    assert_eq!(service.snapshot().employees.len(), 1);
}

#[test]
fn test_bad_seed_pin_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        employees: vec![EmployeeSeed {
            name: "Bob".into(),
            role: Role::Employee,
            pin: "12".into(),
        }],
        ..ServiceConfig::with_data_dir(dir.path())
    };
    assert_eq!(StoreService::open(config).unwrap_err().code(), "INVALID_INPUT");
}

// -- Tasks --------------------------------------------------------------------

#[test]
fn test_task_status_changes_are_logged_on_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let service = StoreService::open(seeded_config(dir.path())).unwrap();
    let maria = service.login("9001").unwrap();
    let bob = service.login("1234").unwrap();
    let task = service
        .schedule_task(&maria, bob.employee_id(), "Check fuel pumps", at(30), at(0))
        .unwrap();

    service
        .mark_task(&bob, &task.id, TaskStatus::Help, at(10))
        .unwrap();
    let done = service
        .mark_task(&bob, &task.id, TaskStatus::Done, at(40))
        .unwrap()
        .unwrap();
    assert_eq!(done.transitions.len(), 2);
    assert!(!done.completed_on_time());

    let summary = service.task_summary(&maria, None, at(50)).unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.done, 1);
    assert_eq!(summary.done_on_time, 0);
}

// -- Concurrency --------------------------------------------------------------

#[test]
fn test_concurrent_adds_are_serialized() {
    let service = StoreService::in_memory();
    service
        .register_employee(None, "Maria", Role::Manager, "9001")
        .unwrap();
    let maria = service.login("9001").unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..25 {
                    service
                        .record_cartons(&maria, CartonAction::Add, Some(2), "")
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(service.carton_total(&maria).unwrap(), 400);
    assert!(service.verify_ledger().is_ok());
    assert_eq!(service.snapshot().ledger.len(), 200);
}

#[test]
fn test_concurrent_appends_and_undos_keep_chain() {
    let dir = tempfile::tempdir().unwrap();
    let service = StoreService::open(seeded_config(dir.path())).unwrap();
    let maria = service.login("9001").unwrap();
    let bob = service.login("1234").unwrap();

    let (shared, maria_ref, bob_ref) = (&service, &maria, &bob);
    let undone: usize = std::thread::scope(|scope| {
        for worker in 0..4u32 {
            scope.spawn(move || {
                for i in 0..20u32 {
                    let (action, amount) = if (worker + i) % 3 == 0 {
                        (CartonAction::Remove, 4)
                    } else {
                        (CartonAction::Add, 3)
                    };
                    shared
                        .record_cartons(bob_ref, action, Some(amount), "")
                        .unwrap();
                }
            });
        }
        let undoers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(move || {
                    (0..15)
                        .filter(|_| shared.undo_last_carton(maria_ref).unwrap().is_some())
                        .count()
                })
            })
            .collect();
        undoers.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert!(service.verify_ledger().is_ok());
    let snapshot = service.snapshot();
    assert_eq!(snapshot.ledger.len(), 80 - undone);
    let expected = snapshot.ledger.last().map_or(0, |e| e.total_after);
    assert_eq!(service.carton_total(&maria).unwrap(), expected);

    // What reached disk is the same chain.
    let reopened = StoreService::open(seeded_config(dir.path())).unwrap();
    let maria = reopened.login("9001").unwrap();
    assert_eq!(reopened.carton_total(&maria).unwrap(), expected);
    assert_eq!(reopened.snapshot().ledger, snapshot.ledger);
}

#[test]
fn test_concurrent_bootstrap_registers_one_employee() {
    let service = StoreService::in_memory();
    let pins: Vec<String> = (0..8).map(|i| format!("{}", 2000 + i)).collect();

    let shared = &service;
    let registered = std::thread::scope(|scope| {
        let handles: Vec<_> = pins
            .iter()
            .map(|pin| {
                scope.spawn(move || {
                    shared
                        .register_employee(None, "Manager", Role::Manager, pin)
                        .is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(registered, 1);
    let logins = pins.iter().filter(|pin| service.login(pin).is_ok()).count();
    assert_eq!(logins, 1);
    assert_eq!(service.snapshot().employees.len(), 1);
}
