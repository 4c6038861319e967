//! Integration tests for load runs against an in-memory target store
//!
//! Each test drives the coordinator the way the `load` command does and
//! re-opens the ledger from disk between runs.

mod common;

use common::{doi, record_line, record_value, Harness};
use record_importer::core::aggregation::AggregationOutcome;
use record_importer::core::load::{LoadOptions, LoadStatus};
use record_importer::core::selector::{Locator, Selection};
use record_importer::domain::{ImporterError, LoadStage};
use serde_json::json;

fn select(tokens: &[&str]) -> Selection {
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    Selection::parse(&tokens, None).unwrap()
}

fn statuses(summary: &record_importer::core::load::LoadSummary) -> Vec<(usize, LoadStatus)> {
    summary.outcomes.iter().map(|o| (o.index, o.status)).collect()
}

#[tokio::test]
async fn test_full_run_creates_every_record() {
    let harness = Harness::with_records(3);
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let summary = coordinator.execute_load(&Selection::All).await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.created, 3);
    assert!(summary.is_successful());
    assert_eq!(harness.store.record_count(), 3);

    let stats = harness.ledger().await.stats().await.unwrap();
    assert_eq!(stats.created, 3);
    assert_eq!(stats.created_keys, 3);
    assert!(stats.failed.is_empty());
}

#[tokio::test]
async fn test_created_records_are_published_and_owned() {
    let harness = Harness::with_records(1);
    let coordinator = harness.coordinator(LoadOptions::default()).await;
    coordinator.execute_load(&Selection::All).await.unwrap();

    let records = harness.store.records_with_doi(&doi(1));
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.is_published);
    assert!(!record.draft_open);

    let community = harness.store.community("arlisna").unwrap();
    assert_eq!(record.communities, vec![community.id]);

    let users = harness.store.users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "user1@example.org");
    assert_eq!(record.owner.as_ref(), Some(&users[0].id));
}

#[tokio::test]
async fn test_open_range_starts_at_given_index() {
    let harness = Harness::with_records(5);
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let summary = coordinator.execute_load(&select(&["2-"])).await.unwrap();

    let indices: Vec<usize> = summary.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![2, 3, 4, 5]);
    assert!(harness.store.records_with_doi(&doi(1)).is_empty());
}

#[tokio::test]
async fn test_discrete_indices_keep_order_without_duplicates() {
    let harness = Harness::with_records(5);
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let summary = coordinator
        .execute_load(&select(&["4", "1", "4"]))
        .await
        .unwrap();

    let indices: Vec<usize> = summary.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![4, 1]);
}

#[tokio::test]
async fn test_rerun_with_no_updates_skips_existing() {
    let harness = Harness::with_records(1);

    let first = harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&first), vec![(1, LoadStatus::Created)]);

    let options = LoadOptions {
        no_updates: true,
        ..Default::default()
    };
    let second = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&second), vec![(1, LoadStatus::Skipped)]);
    assert_eq!(second.outcomes[0].record_id, first.outcomes[0].record_id);

    let records = harness.store.records_with_doi(&doi(1));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].publish_count, 1);
}

#[tokio::test]
async fn test_rerun_with_updates_revises_the_same_entity() {
    let harness = Harness::with_records(1);

    let first = harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    let second = harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&second), vec![(1, LoadStatus::Updated)]);
    assert_eq!(second.outcomes[0].record_id, first.outcomes[0].record_id);

    let records = harness.store.records_with_doi(&doi(1));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].publish_count, 2);
    assert!(records[0].is_published);

    // An update is not a creation
    let stats = harness.ledger().await.stats().await.unwrap();
    assert_eq!(stats.created, 1);
}

#[tokio::test]
async fn test_failure_continues_without_stop_on_error() {
    let harness = Harness::with_records(5);
    harness.store.fail_writes_for(&doi(3));
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let summary = coordinator.execute_load(&Selection::All).await.unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.created, 4);
    assert_eq!(summary.failed, 1);
    assert!(!summary.halted);

    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.index, 3);
    assert_eq!(failure.error.as_ref().unwrap().stage, LoadStage::Write);

    let ledger = harness.ledger().await;
    assert_eq!(ledger.failed_indices().await, vec![3]);
    assert_eq!(ledger.stats().await.unwrap().created, 4);
}

#[tokio::test]
async fn test_stop_on_error_halts_after_first_failure() {
    let harness = Harness::with_records(5);
    harness.store.fail_writes_for(&doi(3));
    let options = LoadOptions {
        stop_on_error: true,
        ..Default::default()
    };
    let coordinator = harness.coordinator(options).await;

    let summary = coordinator.execute_load(&Selection::All).await.unwrap();

    assert_eq!(
        statuses(&summary),
        vec![
            (1, LoadStatus::Created),
            (2, LoadStatus::Created),
            (3, LoadStatus::Failed),
        ]
    );
    assert!(summary.halted);
    assert_eq!(summary.remaining, 2);
    assert!(harness.store.records_with_doi(&doi(4)).is_empty());
}

#[tokio::test]
async fn test_retry_failed_reprocesses_only_failed_set() {
    let harness = Harness::with_records(3);
    harness.store.fail_writes_for(&doi(2));
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(harness.ledger().await.failed_indices().await, vec![2]);

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

    assert_eq!(statuses(&summary), vec![(2, LoadStatus::Created)]);

    let ledger = harness.ledger().await;
    assert!(ledger.failed_indices().await.is_empty());
    let stats = ledger.stats().await.unwrap();
    assert_eq!(stats.created, 3);
    assert!(stats.failed.is_empty());
}

#[tokio::test]
async fn test_retry_failed_with_tokens_appends_failed_set() {
    let harness = Harness::with_records(5);
    harness.store.fail_writes_for(&doi(4));
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&select(&["4"]))
        .await
        .unwrap();
    harness.store.clear_failures();

    let options = LoadOptions {
        retry_failed: true,
        ..Default::default()
    };
    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&select(&["1", "4"]))
        .await
        .unwrap();

    let indices: Vec<usize> = summary.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![1, 4]);
    assert!(summary.is_successful());
}

#[tokio::test]
async fn test_repeated_failure_counts_attempts() {
    let harness = Harness::with_records(2);
    harness.store.fail_writes_for(&doi(2));

    for _ in 0..2 {
        harness
            .coordinator(LoadOptions::default())
            .await
            .execute_load(&select(&["2"]))
            .await
            .unwrap();
    }

    let entries = harness.ledger().await.failed_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index, 2);
    assert_eq!(entries[0].attempts, 2);
}

#[tokio::test]
async fn test_unresolvable_locator_aborts_before_loading() {
    let harness = Harness::with_records(3);
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let err = coordinator
        .execute_load(&select(&["1", "9"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ImporterError::NotFound(_)));
    assert_eq!(harness.store.record_count(), 0);
    assert_eq!(harness.ledger().await.stats().await.unwrap().created, 0);
}

#[tokio::test]
async fn test_source_id_selection() {
    let harness = Harness::with_records(3);
    let coordinator = harness.coordinator(LoadOptions::default()).await;
    let selection = Selection::parse(&["hc:1003".to_string()], Some("hclegacy-pid")).unwrap();

    let summary = coordinator.execute_load(&selection).await.unwrap();

    assert_eq!(summary.outcomes.len(), 1);
    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.index, 3);
    assert_eq!(
        outcome.locator,
        Locator::SourceId {
            scheme: "hclegacy-pid".to_string(),
            identifier: "hc:1003".to_string(),
        }
    );
}

#[tokio::test]
async fn test_invalid_payload_fails_at_fetch() {
    let harness = Harness::new(vec![
        record_line(1),
        "{not json".to_string(),
        json!({"doi": doi(3), "metadata": {}}).to_string(),
    ]);
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let summary = coordinator.execute_load(&Selection::All).await.unwrap();

    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed, 2);
    for failure in summary.failures() {
        assert_eq!(failure.error.as_ref().unwrap().stage, LoadStage::Fetch);
    }
    assert_eq!(harness.ledger().await.failed_indices().await, vec![2, 3]);
}

#[tokio::test]
async fn test_provisioning_failure_writes_nothing() {
    let harness = Harness::with_records(1);
    harness.store.fail_user_creation_for("user1@example.org");
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let summary = coordinator.execute_load(&Selection::All).await.unwrap();

    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.error.as_ref().unwrap().stage, LoadStage::Provision);
    assert_eq!(harness.store.record_count(), 0);
    // The community resolved before the user failed is kept
    assert!(harness.store.community("arlisna").is_some());
}

#[tokio::test]
async fn test_sub_community_is_created_under_domain() {
    let mut value = record_value(1);
    value["community"] = json!({"domain": "msu", "sub_community": "msu-history"});
    let harness = Harness::new(vec![value.to_string()]);
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    coordinator.execute_load(&Selection::All).await.unwrap();

    let domain = harness.store.community("msu").unwrap();
    let sub = harness.store.community("msu-history").unwrap();
    assert_eq!(sub.parent, Some(domain.id));

    let record = &harness.store.records_with_doi(&doi(1))[0];
    assert_eq!(record.communities, vec![sub.id]);
}

#[tokio::test]
async fn test_missing_local_file_fails_before_provisioning() {
    let mut value = record_value(1);
    value["files"] = json!([{"filename": "paper.pdf"}]);
    let harness = Harness::new(vec![value.to_string()]);
    let coordinator = harness.coordinator(LoadOptions::default()).await;

    let summary = coordinator.execute_load(&Selection::All).await.unwrap();

    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.error.as_ref().unwrap().stage, LoadStage::Fetch);
    assert!(harness.store.communities().is_empty());
    assert!(harness.store.users().is_empty());
}

#[tokio::test]
async fn test_files_are_uploaded_with_clean_names() {
    let mut value = record_value(1);
    value["files"] = json!([{"filename": "My Paper (final).pdf"}]);
    let harness = Harness::new(vec![value.to_string()]);
    std::fs::write(harness.files_dir.join("My Paper (final).pdf"), b"%PDF-1.4").unwrap();

    let options = LoadOptions {
        clean_filenames: true,
        ..Default::default()
    };
    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    assert!(summary.is_successful());
    let record = &harness.store.records_with_doi(&doi(1))[0];
    assert_eq!(record.files, vec!["My_Paper_final.pdf".to_string()]);
}

#[tokio::test]
async fn test_aggregation_covers_written_records() {
    let harness = Harness::with_records(3);
    harness.store.fail_writes_for(&doi(2));
    let options = LoadOptions {
        aggregate: true,
        ..Default::default()
    };

    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    assert!(matches!(
        summary.aggregation,
        Some(AggregationOutcome::Completed(ref report)) if report.record_count == 2
    ));
    let calls = harness.store.aggregations();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, 2);
    assert!(calls[0].1 <= calls[0].2);
}

#[tokio::test]
async fn test_aggregation_skipped_when_nothing_written() {
    let harness = Harness::with_records(1);
    harness.store.fail_writes_for(&doi(1));
    let options = LoadOptions {
        aggregate: true,
        ..Default::default()
    };

    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    assert!(matches!(
        summary.aggregation,
        Some(AggregationOutcome::Skipped(_))
    ));
    assert!(harness.store.aggregations().is_empty());
}

fn retry_options(no_updates: bool) -> LoadOptions {
    LoadOptions {
        retry_failed: true,
        no_updates,
        ..Default::default()
    }
}

async fn assert_publish_failure_finished_on_retry(no_updates: bool) {
    let harness = Harness::with_records(2);
    harness.store.fail_publish_for(&doi(1));

    let first = harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(
        statuses(&first),
        vec![(1, LoadStatus::Failed), (2, LoadStatus::Created)]
    );
    assert_eq!(
        first.outcomes[0].error.as_ref().unwrap().stage,
        LoadStage::Write
    );

    // The draft was written and submitted before publishing failed
    let community = harness.store.community("arlisna").unwrap();
    let draft = harness.store.records_with_doi(&doi(1))[0].clone();
    assert!(!draft.is_published);
    assert_eq!(draft.communities, vec![community.id.clone()]);

    harness.store.clear_failures();
    let second = harness
        .coordinator(retry_options(no_updates))
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&second), vec![(1, LoadStatus::Created)]);
    assert_eq!(second.outcomes[0].record_id.as_ref(), Some(&draft.id));

    let records = harness.store.records_with_doi(&doi(1));
    assert_eq!(records.len(), 1);
    assert!(records[0].is_published);
    assert!(!records[0].draft_open);
    assert_eq!(records[0].publish_count, 1);
    assert_eq!(records[0].communities, vec![community.id]);
    assert!(records[0].owner.is_some());

    let stats = harness.ledger().await.stats().await.unwrap();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.created_keys, 2);
    assert!(stats.failed.is_empty());
}

#[tokio::test]
async fn test_publish_failure_is_finished_as_create_on_retry() {
    assert_publish_failure_finished_on_retry(false).await;
}

#[tokio::test]
async fn test_unpublished_draft_is_finished_despite_no_updates() {
    assert_publish_failure_finished_on_retry(true).await;
}

#[tokio::test]
async fn test_ownership_failure_is_finished_as_create_on_retry() {
    let harness = Harness::with_records(1);
    harness.store.fail_ownership_for(&doi(1));

    let first = harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&first), vec![(1, LoadStatus::Failed)]);
    assert_eq!(
        first.outcomes[0].error.as_ref().unwrap().stage,
        LoadStage::OwnershipTransfer
    );

    let published = harness.store.records_with_doi(&doi(1))[0].clone();
    assert!(published.is_published);
    assert!(published.owner.is_none());

    let ledger = harness.ledger().await;
    assert_eq!(ledger.failed_indices().await, vec![1]);
    assert_eq!(ledger.stats().await.unwrap().created, 0);

    // Updates are suppressed, but the create never completed
    harness.store.clear_failures();
    let second = harness
        .coordinator(retry_options(true))
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&second), vec![(1, LoadStatus::Created)]);

    let records = harness.store.records_with_doi(&doi(1));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, published.id);
    assert!(records[0].is_published);
    assert_eq!(
        records[0].communities,
        vec![harness.store.community("arlisna").unwrap().id]
    );
    assert_eq!(records[0].owner.as_ref(), Some(&harness.store.users()[0].id));

    let stats = harness.ledger().await.stats().await.unwrap();
    assert_eq!(stats.created, 1);
    assert!(stats.failed.is_empty());
}

#[tokio::test]
async fn test_failed_update_is_retried_as_update() {
    let harness = Harness::with_records(1);
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    harness.store.fail_publish_for(&doi(1));
    let second = harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&second), vec![(1, LoadStatus::Failed)]);

    harness.store.clear_failures();
    let third = harness
        .coordinator(retry_options(false))
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();
    assert_eq!(statuses(&third), vec![(1, LoadStatus::Updated)]);

    let records = harness.store.records_with_doi(&doi(1));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].publish_count, 2);

    // Only the first run created the record
    let stats = harness.ledger().await.stats().await.unwrap();
    assert_eq!(stats.created, 1);
    assert!(stats.failed.is_empty());
}

#[tokio::test]
async fn test_finished_create_is_aggregated() {
    let harness = Harness::with_records(1);
    harness.store.fail_publish_for(&doi(1));
    harness
        .coordinator(LoadOptions::default())
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    harness.store.clear_failures();
    let options = LoadOptions {
        aggregate: true,
        ..retry_options(false)
    };
    let summary = harness
        .coordinator(options)
        .await
        .execute_load(&Selection::All)
        .await
        .unwrap();

    assert!(matches!(
        summary.aggregation,
        Some(AggregationOutcome::Completed(ref report)) if report.record_count == 1
    ));
}
