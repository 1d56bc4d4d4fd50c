use std::collections::BTreeMap;
use playstate_models::{ExternalIdSource, PlaybackRecord, UserDataUpdate};
use playstate_sources::{MediaServer, ServerError};
use serde::Serialize;
use tracing::{info, warn};
use crate::catalog_index::CatalogIndex;
use crate::context::RunContext;
use crate::id_resolver::{IdentityResolver, Resolution};
use crate::progress::ProgressTracker;

/// Final tally of one restore run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub total: usize,
    /// Records written to the target (or that would be, in a dry run)
    pub applied: usize,
    /// Records with no external id present in the target catalog
    pub unmatched: usize,
    /// Records whose write the server rejected or never answered
    pub write_failures: usize,
    pub write_failure_kinds: BTreeMap<String, usize>,
    pub dry_run: bool,
}

impl RestoreSummary {
    pub fn failed(&self) -> usize {
        self.unmatched + self.write_failures
    }
}

/// What happened to a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Applied { item_id: String, source: ExternalIdSource },
    WouldApply { item_id: String, source: ExternalIdSource },
    Unmatched,
    WriteFailed { item_id: String, error: String },
}

impl RecordOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RecordOutcome::Unmatched | RecordOutcome::WriteFailed { .. })
    }
}

/// Restore every record onto `target_user_id`, in order.
///
/// A record that does not resolve, or whose write fails, is counted and
/// skipped; nothing here aborts the batch or retries.
pub async fn apply_records<S>(
    server: &S,
    ctx: &RunContext,
    target_user_id: &str,
    records: &[PlaybackRecord],
    index: &CatalogIndex,
) -> RestoreSummary
where
    S: MediaServer + ?Sized,
{
    apply_records_with_progress(server, ctx, target_user_id, records, index, |_, _| {}).await
}

/// Same as [`apply_records`], calling `on_record` after each record is handled
pub async fn apply_records_with_progress<S, F>(
    server: &S,
    ctx: &RunContext,
    target_user_id: &str,
    records: &[PlaybackRecord],
    index: &CatalogIndex,
    mut on_record: F,
) -> RestoreSummary
where
    S: MediaServer + ?Sized,
    F: FnMut(&PlaybackRecord, &RecordOutcome),
{
    info!(
        target_user_id,
        records = records.len(),
        dry_run = ctx.dry_run,
        "Starting data restoration"
    );

    let resolver = IdentityResolver::new(index);
    let mut tracker = ProgressTracker::new(records.len(), ctx.progress_interval);

    for (idx, record) in records.iter().enumerate() {
        info!(
            item = record.display_name(),
            item_type = %record.item_type,
            backup_item_id = %record.source_item_id,
            "Processing backup item"
        );

        let outcome = match resolver.resolve(record) {
            Resolution::Unmatched => {
                if record.is_resolvable() {
                    warn!(
                        item = record.display_name(),
                        backup_item_id = %record.source_item_id,
                        ids = %record.external_ids,
                        "Skipping item, no matching item found in the target library"
                    );
                } else {
                    warn!(
                        item = record.display_name(),
                        backup_item_id = %record.source_item_id,
                        "Skipping item, backup entry has no IMDb, TMDB or TVDB id"
                    );
                }
                tracker.record_unmatched();
                RecordOutcome::Unmatched
            }
            Resolution::Matched { item_id, source, .. } if ctx.dry_run => {
                tracker.record_applied();
                RecordOutcome::WouldApply { item_id, source }
            }
            Resolution::Matched { item_id, source, .. } => {
                let update = UserDataUpdate::from(record);
                match server.update_user_data(target_user_id, &item_id, &update).await {
                    Ok(()) => {
                        info!(item = record.display_name(), item_id = %item_id, "Updated playback state");
                        tracker.record_applied();
                        RecordOutcome::Applied { item_id, source }
                    }
                    Err(e) => {
                        warn!(
                            item = record.display_name(),
                            item_id = %item_id,
                            error = %e,
                            "Failed to update playback state"
                        );
                        tracker.record_write_failure(&failure_category(&e));
                        RecordOutcome::WriteFailed { item_id, error: e.to_string() }
                    }
                }
            }
        };

        on_record(record, &outcome);
        tracker.log_progress(idx + 1);
    }

    tracker.log_summary("Restore");
    tracker.into_summary(ctx.dry_run)
}

fn failure_category(error: &ServerError) -> String {
    match error {
        ServerError::Status { status, .. } => format!("HTTP {}", status),
        ServerError::Timeout { .. } => "timeout".to_string(),
        ServerError::Transport { .. } => "transport".to_string(),
        ServerError::Decode { .. } => "decode".to_string(),
        ServerError::InvalidToken(_) | ServerError::InvalidUrl(_) => "configuration".to_string(),
    }
}

#[cfg(test)]
mod tests;
