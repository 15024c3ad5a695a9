//! Local backend: one pretty-printed JSON array plus an image directory.
//!
//! ```text
//! <data_dir>/
//!   games.json     [ {GameRecord}, ... ]
//!   images/        <sanitized-name>_<micros>.<ext>
//! ```
//!
//! Every write replaces the whole file: serialize to `games.json.tmp`, then
//! rename over the original. A data file that failed to parse is copied to
//! `games_backup_<timestamp>.json` before the first write replaces it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use backlog_core::GameRecord;
use chrono::Local;

use crate::backend::{BackendKind, RecordBackend};
use crate::error::StoreError;
use crate::image::{DataUri, ImageStore, PlacementStrategy, sniff_mime};

pub const DATA_FILE_NAME: &str = "games.json";
pub const IMAGES_DIR_NAME: &str = "images";

/// Timestamp suffix for backup and export file names.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// URLs of this shape pointed at a server route that no longer exists.
const LEGACY_IMAGE_ROUTE: &str = "/api/image/";

#[derive(Debug, Clone)]
pub struct LocalFileBackend {
    data_dir: PathBuf,
    data_file: PathBuf,
    images: ImageStore,
    /// Set when the data file did not parse; cleared once it is backed up.
    unreadable: Arc<AtomicBool>,
}

impl LocalFileBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            data_file: data_dir.join(DATA_FILE_NAME),
            images: ImageStore::new(data_dir.join(IMAGES_DIR_NAME)),
            data_dir,
            unreadable: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Atomically replace the data file with `records`.
    pub async fn write_all(&self, records: &[GameRecord]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StoreError::io(&self.data_dir, e))?;

        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.data_file.with_extension("json.tmp");
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.data_file)
            .await
            .map_err(|e| StoreError::io(&self.data_file, e))?;

        log::debug!(
            "Wrote {} records to {}",
            records.len(),
            self.data_file.display()
        );
        Ok(())
    }

    /// Copy the current data file to `games_backup_<timestamp>.json` in the
    /// data directory. `None` if there is no data file.
    pub async fn back_up_data_file(&self) -> Result<Option<PathBuf>, StoreError> {
        if !self.data_file.exists() {
            return Ok(None);
        }
        let backup = self.data_dir.join(format!(
            "games_backup_{}.json",
            Local::now().format(TIMESTAMP_FORMAT)
        ));
        tokio::fs::copy(&self.data_file, &backup)
            .await
            .map_err(|e| StoreError::io(&backup, e))?;
        Ok(Some(backup))
    }

    /// Write `records` as the new data file, first setting aside a data file
    /// that failed to load.
    async fn commit(&self, records: &[GameRecord]) -> Result<(), StoreError> {
        if self.unreadable.load(Ordering::SeqCst) {
            if let Some(backup) = self.back_up_data_file().await? {
                log::warn!(
                    "Saved unreadable {} as {} before rewriting it",
                    self.data_file.display(),
                    backup.display()
                );
            }
            self.unreadable.store(false, Ordering::SeqCst);
        }
        self.write_all(records).await
    }

    /// Embed a stored file as a data URI. `None` if the file is unreadable.
    async fn embed_stored_image(&self, file_name: &str) -> Option<String> {
        match self.images.read(file_name).await {
            Ok(bytes) => {
                let mime = sniff_mime(&bytes, Some(file_name));
                Some(DataUri::encode(&bytes, mime).to_string())
            }
            Err(e) => {
                log::warn!("Could not embed image {file_name}: {e}");
                None
            }
        }
    }
}

impl RecordBackend for LocalFileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn location(&self) -> String {
        self.data_file.display().to_string()
    }

    /// A missing file is created empty. A file that does not parse is an
    /// error; it stays in place until the next write backs it up.
    async fn load_all(&self) -> Result<Vec<GameRecord>, StoreError> {
        match tokio::fs::read_to_string(&self.data_file).await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(records) => {
                    self.unreadable.store(false, Ordering::SeqCst);
                    Ok(records)
                }
                Err(e) => {
                    self.unreadable.store(true, Ordering::SeqCst);
                    Err(e.into())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Creating empty data file {}", self.data_file.display());
                self.write_all(&[]).await?;
                Ok(Vec::new())
            }
            Err(e) => Err(StoreError::io(&self.data_file, e)),
        }
    }

    async fn create(
        &self,
        records: &[GameRecord],
        created: &GameRecord,
    ) -> Result<GameRecord, StoreError> {
        self.commit(records).await?;
        Ok(created.clone())
    }

    async fn replace(
        &self,
        records: &[GameRecord],
        updated: &GameRecord,
    ) -> Result<GameRecord, StoreError> {
        self.commit(records).await?;
        Ok(updated.clone())
    }

    async fn replace_many(
        &self,
        records: &[GameRecord],
        changed: &[GameRecord],
    ) -> Result<Vec<GameRecord>, StoreError> {
        self.commit(records).await?;
        Ok(changed.to_vec())
    }

    async fn remove(&self, records: &[GameRecord], _removed: &GameRecord) -> Result<(), StoreError> {
        self.commit(records).await
    }

    /// Clear URLs pointing at the retired `/api/image/` route, then give
    /// every stored file that has no URL an embedded copy.
    async fn migrate(&self, records: &mut [GameRecord]) -> Result<usize, StoreError> {
        let mut changed = 0;
        for record in records.iter_mut() {
            let mut touched = false;

            if record
                .image_url
                .as_deref()
                .is_some_and(|u| u.starts_with(LEGACY_IMAGE_ROUTE))
            {
                record.image_url = None;
                touched = true;
            }

            if record.image_url.is_none() {
                if let Some(path) = record.image_path.clone() {
                    if let Some(uri) = self.embed_stored_image(&path).await {
                        record.image_url = Some(uri.clone());
                        record.image_data = Some(uri);
                        touched = true;
                    }
                }
            }

            if touched {
                changed += 1;
            }
        }

        if changed > 0 {
            self.commit(records).await?;
            log::info!("Migrated image references on {changed} records");
        }
        Ok(changed)
    }

    fn placement_chain(&self) -> Vec<PlacementStrategy> {
        vec![
            PlacementStrategy::StoreOnDisk(self.images.clone()),
            PlacementStrategy::Embed,
        ]
    }

    async fn release_image(&self, record: &GameRecord) -> Result<(), StoreError> {
        if let Some(path) = &record.image_path {
            self.images.delete(path).await?;
        }
        Ok(())
    }
}
