use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use playstate_models::PlaybackRecord;
use tracing::info;
use crate::error::CoreError;

/// Read a backup file: a JSON array of playback records
pub fn load_backup(path: &Path) -> Result<Vec<PlaybackRecord>, CoreError> {
    let file = File::open(path).map_err(|e| CoreError::BackupRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let records: Vec<PlaybackRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            if e.is_io() {
                CoreError::BackupRead {
                    path: path.to_path_buf(),
                    source: e.into(),
                }
            } else {
                CoreError::BackupParse {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

    info!(path = %path.display(), records = records.len(), "Loaded backup data");
    Ok(records)
}

/// Write records as an indented UTF-8 JSON array, replacing any existing file
pub fn save_backup(path: &Path, records: &[PlaybackRecord]) -> Result<(), CoreError> {
    let write_error = |e: std::io::Error| CoreError::BackupWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| write_error(e.into()))?;
    writer.write_all(b"\n").map_err(write_error)?;
    writer.flush().map_err(write_error)?;

    info!(path = %path.display(), records = records.len(), "Exported playback data");
    Ok(())
}
