//! Integration tests for the outcome ledger files

mod common;

use common::{doi, Harness};
use record_importer::core::load::{LoadOptions, LoadStatus};
use record_importer::core::selector::Selection;
use std::io::Write;

fn append(path: &std::path::Path, line: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    writeln!(file, "{line}").unwrap();
}

#[tokio::test]
async fn test_damaged_created_line_is_skipped() {
    let harness = Harness::with_records(2);
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    append(harness.storage.created_path(), "{\"index\": 3, truncated");

    let stats = harness.ledger().await.stats().await.unwrap();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.damaged_created.len(), 1);
    assert_eq!(stats.damaged_created[0].line, 3);
}

#[tokio::test]
async fn test_damaged_failed_line_is_dropped_on_rewrite() {
    let harness = Harness::with_records(2);
    harness.store.fail_writes_for(&doi(2));
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    append(harness.storage.failed_path(), "not json at all");
    let stats = harness.ledger().await.stats().await.unwrap();
    assert_eq!(stats.failed.len(), 1);
    assert_eq!(stats.damaged_failed.len(), 1);

    // A successful retry rewrites the set without the damaged line
    harness.store.clear_failures();
    let options = LoadOptions {
        retry_failed: true,
        ..Default::default()
    };
    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(summary.outcomes[0].status, LoadStatus::Created);

    let stats = harness.ledger().await.stats().await.unwrap();
    assert!(stats.failed.is_empty());
    assert!(stats.damaged_failed.is_empty());
}

#[tokio::test]
async fn test_failed_index_outside_dataset_is_dropped() {
    let harness = Harness::with_records(2);
    append(
        harness.storage.failed_path(),
        r#"{"index":7,"kind":"write_failed","stage":"write","error":"boom","timestamp":"2024-05-01T12:00:00Z"}"#,
    );

    let options = LoadOptions {
        retry_failed: true,
        ..Default::default()
    };
    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(summary.dropped.len(), 1);
    assert_eq!(harness.store.record_count(), 0);

    // Pruned from disk, so later runs no longer report it
    let stats = harness.ledger().await.stats().await.unwrap();
    assert!(stats.failed.is_empty());

    let options = LoadOptions {
        retry_failed: true,
        ..Default::default()
    };
    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert!(summary.dropped.is_empty());
}

#[tokio::test]
async fn test_created_and_failed_sets_stay_disjoint() {
    let harness = Harness::with_records(3);
    harness.store.fail_writes_for(&doi(1));
    harness.store.fail_writes_for(&doi(3));
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    harness.store.clear_failures();
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    let ledger = harness.ledger().await;
    let stats = ledger.stats().await.unwrap();
    assert_eq!(stats.created_keys, 3);
    assert!(stats.failed.is_empty());
    assert!(ledger.failed_indices().await.is_empty());
}
