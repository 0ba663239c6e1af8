//! Desk Edge Case Tests
//!
//! Concurrent callers sharing one desk, service lifecycle around live
//! queues, and the error kinds surfaced to callers.

use queuesmart_core::application::{EngineConfig, QueueDesk};
use queuesmart_core::domain::{DomainError, EntryStatus, Outcome, ServiceDraft, ServicePriority};
use queuesmart_core::port::id_provider::UuidProvider;
use queuesmart_core::port::time_provider::mocks::ManualTimeProvider;
use queuesmart_core::port::time_provider::SystemTimeProvider;
use queuesmart_core::AppError;
use std::collections::HashSet;
use std::sync::Arc;

fn desk() -> Arc<QueueDesk> {
    Arc::new(QueueDesk::new(
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
        EngineConfig::default(),
    ))
}

fn support(desk: &QueueDesk) -> String {
    desk.create_service(&ServiceDraft::new(
        "Customer Support",
        "General customer queries and issue resolution",
        15,
        ServicePriority::High,
    ))
    .unwrap()
    .id
}

/// Many callers joining at once: every join lands exactly once and the
/// queue stays contiguous
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_keep_positions_contiguous() {
    let desk = desk();
    let service_id = support(&desk);

    let mut handles = Vec::new();
    for worker in 0..50 {
        let desk = desk.clone();
        let service_id = service_id.clone();
        handles.push(tokio::spawn(async move {
            desk.join(&service_id, &format!("caller-{}", worker))
                .unwrap()
                .id
        }));
    }

    let mut joined = HashSet::new();
    for handle in handles {
        assert!(joined.insert(handle.await.unwrap()), "duplicate entry id");
    }

    let snapshot = desk.snapshot(&service_id).unwrap();
    assert_eq!(snapshot.len(), 50);
    for (i, entry) in snapshot.entries.iter().enumerate() {
        assert_eq!(entry.position, i + 1);
        assert!(joined.contains(&entry.id));
    }

    println!("✅ Concurrent joins: 50 entries, positions contiguous");
}

/// Concurrent serving never hands the same entry to two counters
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_serve_no_duplicates() {
    let desk = desk();
    let service_id = support(&desk);
    for i in 0..10 {
        desk.join(&service_id, &format!("caller-{}", i)).unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..15 {
        let desk = desk.clone();
        let service_id = service_id.clone();
        handles.push(tokio::spawn(async move { desk.serve_next(&service_id) }));
    }

    let mut served = Vec::new();
    let mut empty = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(entry) => served.push(entry.id),
            Err(AppError::Domain(DomainError::EmptyQueue(_))) => empty += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    let unique: HashSet<_> = served.iter().collect();
    assert_eq!(served.len(), 10);
    assert_eq!(unique.len(), 10, "an entry was served twice");
    assert_eq!(empty, 5);
    assert_eq!(desk.snapshot(&service_id).unwrap().served_count, 10);
}

#[test]
fn test_closed_service_rejects_join_but_keeps_queue() {
    let desk = desk();
    let service_id = support(&desk);
    desk.join(&service_id, "James Wilson").unwrap();

    assert!(!desk.toggle_service(&service_id).unwrap());
    let err = desk.join(&service_id, "Sarah Ahmed").unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Admins can still work a closed queue
    let served = desk.serve_next(&service_id).unwrap();
    assert_eq!(served.display_name, "James Wilson");

    assert!(desk.toggle_service(&service_id).unwrap());
    desk.join(&service_id, "Sarah Ahmed").unwrap();
}

#[test]
fn test_leave_already_removed_entry() {
    let desk = desk();
    let service_id = support(&desk);
    let entry = desk.join(&service_id, "Carlos Rivera").unwrap();

    let left = desk.leave(&service_id, &entry.id).unwrap();
    assert_eq!(left.status, EntryStatus::Cancelled);

    let err = desk.leave(&service_id, &entry.id).unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::EntryNotFound { .. })
    ));
    assert!(err.is_recoverable());
}

#[test]
fn test_entry_ids_scoped_to_their_service() {
    let desk = desk();
    let support_id = support(&desk);
    let billing_id = desk
        .create_service(&ServiceDraft::new(
            "Billing Inquiry",
            "Invoice, payment, and billing questions",
            10,
            ServicePriority::Low,
        ))
        .unwrap()
        .id;

    let entry = desk.join(&support_id, "Tom Baker").unwrap();
    assert!(desk.leave(&billing_id, &entry.id).is_err());
    assert_eq!(desk.snapshot(&support_id).unwrap().len(), 1);
}

#[test]
fn test_invalid_service_draft_lists_fields() {
    let desk = desk();
    let err = desk
        .create_service(&ServiceDraft {
            name: "  ".to_string(),
            description: String::new(),
            expected_duration_minutes: Some(0),
            priority: ServicePriority::Medium,
        })
        .unwrap_err();

    match err {
        AppError::Domain(DomainError::InvalidService(fields)) => {
            let names: Vec<_> = fields.iter().map(|f| f.field).collect();
            assert_eq!(names, vec!["name", "description", "duration"]);
        }
        other => panic!("expected InvalidService, got {:?}", other),
    }
    assert!(desk.services().unwrap().is_empty());
}

#[test]
fn test_history_tracks_waits_with_clock() {
    let clock = Arc::new(ManualTimeProvider::new(0));
    let desk = QueueDesk::new(Arc::new(UuidProvider), clock.clone(), EngineConfig::default());
    let service_id = support(&desk);

    desk.join(&service_id, "Mike Johnson").unwrap();
    clock.advance_minutes(12);
    desk.join(&service_id, "Priya Patel").unwrap();
    clock.advance_minutes(18);
    desk.serve_next(&service_id).unwrap();
    desk.remove_service(&service_id).unwrap();

    let history = desk.history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].display_name, "Priya Patel");
    assert_eq!(history[0].outcome, Outcome::Cancelled);
    assert_eq!(history[0].waited_minutes, 18);
    assert_eq!(history[1].display_name, "Mike Johnson");
    assert_eq!(history[1].outcome, Outcome::Completed);
    assert_eq!(history[1].waited_minutes, 30);
}
