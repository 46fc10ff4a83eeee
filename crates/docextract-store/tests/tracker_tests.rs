//! Integration tests for docextract-store
//!
//! These tests verify the tracker lifecycle against a real SQLite database.

use docextract_domain::{DocumentId, DocumentStatus, StatusStore, StatusUpdate};
use docextract_store::{MemoryStatusStore, SqliteTracker, StoreError, MAX_MESSAGE_CHARS};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_store_initialization() {
    let store = SqliteTracker::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_create_and_get() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    let metadata = json!({ "original_filename": "lease.pdf", "size": 1024 });

    let id = tracker.create("app-1", &metadata).unwrap();
    let record = tracker.get(id).unwrap().expect("row should exist");

    assert_eq!(record.id, id);
    assert_eq!(record.application_id, "app-1");
    assert_eq!(record.status, DocumentStatus::Initiated);
    assert_eq!(record.metadata, metadata);
    assert!(record.extracted_data.is_none());
    assert!(record.message.is_none());
    assert_eq!(record.created_at, record.updated_at);
}

#[test]
fn test_get_unknown_id() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    assert!(tracker.get(DocumentId::new()).unwrap().is_none());
}

#[test]
fn test_lifecycle_updates() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    let id = tracker.create("app-1", &json!({})).unwrap();

    tracker
        .apply(&StatusUpdate::new(id, DocumentStatus::InProgress).with_message("Processing document"))
        .unwrap();
    let record = tracker.get(id).unwrap().unwrap();
    assert_eq!(record.status, DocumentStatus::InProgress);
    assert_eq!(record.message.as_deref(), Some("Processing document"));

    tracker
        .apply(
            &StatusUpdate::new(id, DocumentStatus::Failed)
                .with_data(Some(json!({ "title": "Lease" })))
                .with_message("Partial failure at chunk 2/3: Refusal: no")
                .with_errors(json!({ "error": "Partial failure at chunk 2/3: Refusal: no" })),
        )
        .unwrap();
    let record = tracker.get(id).unwrap().unwrap();
    assert_eq!(record.status, DocumentStatus::Failed);
    assert_eq!(record.extracted_data, Some(json!({ "title": "Lease" })));
    assert_eq!(record.errors.unwrap()["error"], "Partial failure at chunk 2/3: Refusal: no");
}

#[test]
fn test_absent_fields_are_kept() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    let id = tracker.create("app-1", &json!({})).unwrap();

    tracker
        .apply(&StatusUpdate::new(id, DocumentStatus::InProgress).with_message("Processing document"))
        .unwrap();
    tracker
        .apply(&StatusUpdate::new(id, DocumentStatus::Success))
        .unwrap();

    let record = tracker.get(id).unwrap().unwrap();
    assert_eq!(record.status, DocumentStatus::Success);
    assert_eq!(record.message.as_deref(), Some("Processing document"));
}

#[test]
fn test_long_message_truncated() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    let id = tracker.create("app-1", &json!({})).unwrap();

    let message = "e".repeat(5000);
    tracker
        .apply(&StatusUpdate::new(id, DocumentStatus::Failed).with_message(message))
        .unwrap();

    let stored = tracker.get(id).unwrap().unwrap().message.unwrap();
    assert_eq!(stored.len(), MAX_MESSAGE_CHARS);
    assert!(stored.ends_with("e..."));
}

#[test]
fn test_update_unknown_id() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    let result = tracker.apply(&StatusUpdate::new(DocumentId::new(), DocumentStatus::Success));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_history_newest_first_with_paging() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    let ids: Vec<DocumentId> = (0..5)
        .map(|i| tracker.create("app-1", &json!({ "n": i })).unwrap())
        .collect();
    tracker.create("app-2", &json!({})).unwrap();

    let all = tracker.history("app-1", 10, 0).unwrap();
    assert_eq!(all.len(), 5);
    let returned: Vec<DocumentId> = all.iter().map(|r| r.id).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(returned, expected);

    let page = tracker.history("app-1", 2, 1).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, ids[3]);
    assert_eq!(page[1].id, ids[2]);

    assert!(tracker.history("app-3", 10, 0).unwrap().is_empty());
}

#[test]
fn test_persists_across_connections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracker.db");

    let id = {
        let tracker = SqliteTracker::new(&path).unwrap();
        let id = tracker.create("app-1", &json!({})).unwrap();
        tracker
            .apply(&StatusUpdate::new(id, DocumentStatus::Success).with_data(Some(json!({ "a": 1 }))))
            .unwrap();
        id
    };

    let reopened = SqliteTracker::new(&path).unwrap();
    let record = reopened.get(id).unwrap().unwrap();
    assert_eq!(record.status, DocumentStatus::Success);
    assert_eq!(record.extracted_data, Some(json!({ "a": 1 })));
}

#[tokio::test]
async fn test_status_store_trait() {
    let tracker = SqliteTracker::new(":memory:").unwrap();
    let id = tracker.create("app-1", &json!({})).unwrap();

    tracker
        .update(StatusUpdate::new(id, DocumentStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(tracker.get(id).unwrap().unwrap().status, DocumentStatus::InProgress);
}

#[tokio::test]
async fn test_memory_store() {
    let store = MemoryStatusStore::new();
    let id = DocumentId::new();

    store.update(StatusUpdate::new(id, DocumentStatus::InProgress)).await.unwrap();
    store.update(StatusUpdate::new(id, DocumentStatus::Success)).await.unwrap();

    let statuses: Vec<DocumentStatus> = store.updates().iter().map(|u| u.status).collect();
    assert_eq!(statuses, vec![DocumentStatus::InProgress, DocumentStatus::Success]);
    assert_eq!(store.last().unwrap().id, id);

    let failing = MemoryStatusStore::failing();
    assert!(failing.update(StatusUpdate::new(id, DocumentStatus::Success)).await.is_err());
    assert!(failing.updates().is_empty());
}
