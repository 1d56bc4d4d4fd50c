pub mod backup_file;
pub mod catalog_index;
pub mod context;
pub mod error;
pub mod export;
pub mod id_resolver;
pub mod progress;
pub mod reconcile;
pub mod selection;

#[cfg(test)]
mod test_support;

pub use backup_file::{load_backup, save_backup};
pub use catalog_index::{build_catalog_index, build_catalog_index_with_progress, CatalogIndex, CatalogStats};
pub use context::{RunContext, RunKind};
pub use error::CoreError;
pub use export::{export_playback, export_playback_with_progress, record_from_item, ExportResult, ExportSummary};
pub use id_resolver::{IdentityResolver, Resolution};
pub use progress::ProgressTracker;
pub use reconcile::{apply_records, apply_records_with_progress, RecordOutcome, RestoreSummary};
pub use selection::{backup_usernames, find_user, parse_ordinal, records_for_username, select_ordinal, SelectionError, DEFAULT_MAX_ATTEMPTS};
