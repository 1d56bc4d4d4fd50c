use playstate_sources::ServerError;
use std::path::PathBuf;

/// Failures that stop an export or restore phase.
///
/// Per-record problems during restore (no catalog match, a rejected write)
/// are not errors; they are counted in the restore summary instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("could not retrieve users from {server}: {source}")]
    UserListUnavailable {
        server: String,
        #[source]
        source: ServerError,
    },

    #[error("no users found on {server}")]
    NoUsers { server: String },

    #[error("catalog retrieval failed on page {page} after {retrieved} of {total} items; the external id map would be incomplete: {source}")]
    CatalogIncomplete {
        page: usize,
        retrieved: usize,
        total: usize,
        #[source]
        source: ServerError,
    },

    #[error("could not read backup file {}: {source}", .path.display())]
    BackupRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("backup file {} is not valid JSON: {source}", .path.display())]
    BackupParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write backup file {}: {source}", .path.display())]
    BackupWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
