use super::*;
use crate::test_support::{catalog_item, record_with_ids, test_context, FakeServer};

fn ten_item_catalog() -> Vec<playstate_sources::ServerItem> {
    (1..=10)
        .map(|n| catalog_item(&format!("target-{}", n), Some(&format!("tt{:07}", n)), None, None))
        .collect()
}

fn ten_records() -> Vec<PlaybackRecord> {
    (1..=10)
        .map(|n| {
            let mut record = record_with_ids(Some(&format!("tt{:07}", n)), None, None);
            record.item_name = format!("Title {}", n);
            record.play_count = n;
            record
        })
        .collect()
}

#[tokio::test]
async fn test_partial_failures_do_not_abort_batch() {
    let catalog = ten_item_catalog();
    let index = CatalogIndex::from_items(&catalog);
    let server = FakeServer::new().failing_write("target-7");

    let mut records = ten_records();
    // Record #4 has no counterpart in the target catalog
    records[3].external_ids = playstate_models::ExternalIds::from_raw(Some("tt7654321".to_string()), None, None);

    let summary = apply_records(&server, &test_context(), "target-user", &records, &index).await;

    assert_eq!(summary.total, 10);
    assert_eq!(summary.applied, 8);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.unmatched, 1);
    assert_eq!(summary.write_failures, 1);
    assert_eq!(summary.write_failure_kinds.get("HTTP 500"), Some(&1));
    // Every matched record gets exactly one write attempt, failed one included
    assert_eq!(server.writes().len(), 9);
}

#[tokio::test]
async fn test_record_without_ids_counts_one_failure() {
    let index = CatalogIndex::from_items(&ten_item_catalog());
    let server = FakeServer::new();
    let records = vec![record_with_ids(None, None, None)];

    let summary = apply_records(&server, &test_context(), "target-user", &records, &index).await;

    assert_eq!(summary.unmatched, 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.applied, 0);
    assert!(server.writes().is_empty());
}

#[tokio::test]
async fn test_records_are_applied_in_supplied_order() {
    let index = CatalogIndex::from_items(&ten_item_catalog());
    let server = FakeServer::new();
    let mut records = ten_records();
    records.reverse();

    apply_records(&server, &test_context(), "target-user", &records, &index).await;

    let order: Vec<String> = server.writes().into_iter().map(|(_, item, _)| item).collect();
    let expected: Vec<String> = (1..=10).rev().map(|n| format!("target-{}", n)).collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn test_write_payload_matches_record() {
    let index = CatalogIndex::from_items([&catalog_item("heat", None, Some("949"), None)]);
    let server = FakeServer::new();
    let mut record = record_with_ids(None, Some("949"), None);
    record.playback_position_ticks = 36_000_000_000;
    record.play_count = 0;
    record.played = false;
    record.is_favorite = true;
    record.last_played_date = None;

    apply_records(&server, &test_context(), "u-42", &[record], &index).await;

    let writes = server.writes();
    assert_eq!(writes.len(), 1);
    let (user_id, item_id, update) = &writes[0];
    assert_eq!(user_id, "u-42");
    assert_eq!(item_id, "heat");
    assert_eq!(update.playback_position_ticks, 36_000_000_000);
    assert!(update.is_favorite);
    assert!(!update.played);

    let body = serde_json::to_value(update).unwrap();
    assert!(body.get("LastPlayedDate").is_none());
}

#[tokio::test]
async fn test_missing_last_played_date_keeps_target_value() {
    let index = CatalogIndex::from_items([&catalog_item("heat", Some("tt0113277"), None, None)]);
    let server = FakeServer::new();
    let ctx = test_context();

    let with_date = record_with_ids(Some("tt0113277"), None, None);
    apply_records(&server, &ctx, "u", &[with_date], &index).await;

    let mut without_date = record_with_ids(Some("tt0113277"), None, None);
    without_date.last_played_date = None;
    apply_records(&server, &ctx, "u", &[without_date], &index).await;

    let state = server.user_data("u", "heat").unwrap();
    assert_eq!(state.last_played_date.as_deref(), Some("2024-01-01T00:00:00.0000000Z"));
}

#[tokio::test]
async fn test_reapplying_is_idempotent() {
    let index = CatalogIndex::from_items(&ten_item_catalog());
    let server = FakeServer::new();
    let records = ten_records();
    let ctx = test_context();

    let first = apply_records(&server, &ctx, "target-user", &records, &index).await;
    let after_first: Vec<_> = (1..=10)
        .map(|n| server.user_data("target-user", &format!("target-{}", n)))
        .collect();

    let second = apply_records(&server, &ctx, "target-user", &records, &index).await;
    let after_second: Vec<_> = (1..=10)
        .map(|n| server.user_data("target-user", &format!("target-{}", n)))
        .collect();

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
    assert!(after_second.iter().all(Option::is_some));
}

#[tokio::test]
async fn test_dry_run_issues_no_writes() {
    let index = CatalogIndex::from_items(&ten_item_catalog());
    let server = FakeServer::new();
    let ctx = test_context().with_dry_run(true);
    let mut outcomes = Vec::new();

    let summary = apply_records_with_progress(
        &server,
        &ctx,
        "target-user",
        &ten_records()[..3],
        &index,
        |_, outcome| outcomes.push(outcome.clone()),
    )
    .await;

    assert!(server.writes().is_empty());
    assert!(summary.dry_run);
    assert_eq!(summary.applied, 3);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, RecordOutcome::WouldApply { source: ExternalIdSource::Imdb, .. })));
}

#[tokio::test]
async fn test_outcomes_report_failures() {
    let index = CatalogIndex::from_items(&ten_item_catalog());
    let server = FakeServer::new().failing_write("target-2");
    let records = vec![
        record_with_ids(Some("tt0000001"), None, None),
        record_with_ids(Some("tt0000002"), None, None),
        record_with_ids(None, None, None),
    ];
    let mut outcomes = Vec::new();

    apply_records_with_progress(&server, &test_context(), "u", &records, &index, |_, o| {
        outcomes.push(o.clone())
    })
    .await;

    assert!(matches!(&outcomes[0], RecordOutcome::Applied { item_id, .. } if item_id == "target-1"));
    assert!(matches!(&outcomes[1], RecordOutcome::WriteFailed { item_id, .. } if item_id == "target-2"));
    assert_eq!(outcomes[2], RecordOutcome::Unmatched);
    assert_eq!(outcomes.iter().filter(|o| o.is_failure()).count(), 2);
}

#[tokio::test]
async fn test_timed_out_write_counts_as_failure() {
    let index = CatalogIndex::from_items(&ten_item_catalog());
    let server = FakeServer::new().timing_out_write("target-3");

    let summary = apply_records(&server, &test_context(), "target-user", &ten_records(), &index).await;

    assert_eq!(summary.applied, 9);
    assert_eq!(summary.write_failures, 1);
    assert_eq!(summary.write_failure_kinds.get("timeout"), Some(&1));
    assert!(server.user_data("target-user", "target-3").is_none());
}
