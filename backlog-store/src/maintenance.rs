//! Offline maintenance of a local data directory: backups, imports, orphan
//! image cleanup, and sample data.
//!
//! These functions work on the files directly. Run them while no
//! [`RecordStore`](crate::RecordStore) has the same directory loaded, or
//! that store's cache will be stale.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use backlog_core::{GameInput, GameRecord};
use chrono::Local;

use crate::backend::RecordBackend;
use crate::error::StoreError;
use crate::local::{LocalFileBackend, TIMESTAMP_FORMAT};
use crate::merge::new_record;

/// Result of [`import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Copy of the data file as it was before the import, if there was one.
    pub backup: Option<PathBuf>,
}

/// Copy the data file to `dest`, or to a timestamped file in the current
/// directory. Returns the path written.
pub async fn export(backend: &LocalFileBackend, dest: Option<&Path>) -> Result<PathBuf, StoreError> {
    let dest = match dest {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!(
            "game_collection_backup_{}.json",
            Local::now().format(TIMESTAMP_FORMAT)
        )),
    };

    if !backend.data_file().exists() {
        return Err(StoreError::persistence(format!(
            "no data file at {}",
            backend.data_file().display()
        )));
    }
    let records = backend.load_all().await?;
    let json = serde_json::to_string_pretty(&records)?;
    tokio::fs::write(&dest, json)
        .await
        .map_err(|e| StoreError::io(&dest, e))?;

    log::debug!("Exported {} records to {}", records.len(), dest.display());
    Ok(dest)
}

/// Replace the data file with the records in `source`, after backing up the
/// current file next to it. `source` must be a JSON array of records with
/// distinct ids.
pub async fn import(backend: &LocalFileBackend, source: &Path) -> Result<ImportSummary, StoreError> {
    let text = tokio::fs::read_to_string(source)
        .await
        .map_err(|e| StoreError::io(source, e))?;
    let records: Vec<GameRecord> = serde_json::from_str(&text)?;

    let mut seen = HashSet::new();
    if let Some(dup) = records.iter().find(|r| !seen.insert(r.id.as_str())) {
        return Err(StoreError::persistence(format!(
            "{} contains duplicate id {}",
            source.display(),
            dup.id
        )));
    }

    let backup = backend.back_up_data_file().await?;

    backend.write_all(&records).await?;
    Ok(ImportSummary {
        imported: records.len(),
        backup,
    })
}

/// Delete files in the image directory that no record references. Returns
/// the removed filenames.
pub async fn cleanup_unused_images(backend: &LocalFileBackend) -> Result<Vec<String>, StoreError> {
    let records = backend.load_all().await?;
    let referenced: HashSet<String> = records
        .iter()
        .filter_map(|r| r.image_path.as_deref())
        .filter(|p| !p.starts_with("data:"))
        .filter_map(|p| Path::new(p).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();

    let mut removed = Vec::new();
    for name in backend.images().list().await? {
        if referenced.contains(&name) {
            continue;
        }
        if backend.images().delete(&name).await? {
            removed.push(name);
        }
    }
    Ok(removed)
}

/// Overwrite the data file with a few example records. Returns how many.
pub async fn create_sample(backend: &LocalFileBackend) -> Result<usize, StoreError> {
    let samples = [
        GameInput::new("The Legend of Zelda: Breath of the Wild", 9.5, "ADV")
            .with_play_time(120.0)
            .with_record_date("2024-01-15T10:30")
            .with_comment("An open world that rewards curiosity."),
        GameInput::new("Hollow Knight", 9.0, "ACT")
            .with_play_time(45.5)
            .with_record_date("2024-02-03T21:00")
            .with_comment("Tough but fair."),
        GameInput::new("Civilization VI", 8.5, "SLG")
            .with_play_time(200.0)
            .with_record_date("2023-11-20T19:45")
            .with_comment("One more turn."),
    ];

    let records: Vec<GameRecord> = samples
        .iter()
        .map(|input| new_record(uuid::Uuid::new_v4().to_string(), input))
        .collect();
    backend.write_all(&records).await?;
    Ok(records.len())
}

#[cfg(test)]
#[path = "tests/maintenance_tests.rs"]
mod tests;
