//! The record store: an in-memory record list kept in step with a backend.
//!
//! Each mutation builds the list it wants, hands it to the backend, and
//! swaps it in only when the backend reports success. A failed call leaves
//! the cache exactly as it was.

use backlog_core::{CategoryRegistry, GameInput, GameRecord, query};
use uuid::Uuid;

use crate::backend::RecordBackend;
use crate::error::StoreError;
use crate::image::{DEFAULT_MAX_IMAGE_BYTES, DataUri, ImageFile, encode_image, place_image};
use crate::merge::{ImageUpdate, merge_update, new_record};

pub struct RecordStore<B> {
    backend: B,
    registry: CategoryRegistry,
    records: Vec<GameRecord>,
    initialized: bool,
    max_image_bytes: u64,
}

impl<B: RecordBackend> RecordStore<B> {
    pub fn new(backend: B, registry: CategoryRegistry) -> Self {
        Self {
            backend,
            registry,
            records: Vec::new(),
            initialized: false,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The cached records. Empty until [`initialize`](Self::initialize) runs.
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&GameRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Load the category registry. Idempotent.
    pub async fn load_categories(&mut self) {
        self.registry.load().await;
    }

    /// Load and migrate records from the backend. Runs once; a load failure
    /// is logged and leaves the store empty.
    pub async fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let loaded = match self.backend.load_all().await {
            Ok(records) => records,
            Err(e) => {
                log::error!("Could not load records from {}: {e}", self.backend.location());
                Vec::new()
            }
        };

        let mut migrated = loaded.clone();
        self.records = match self.backend.migrate(&mut migrated).await {
            Ok(_) => migrated,
            Err(e) => {
                log::warn!("Record migration was not saved: {e}");
                loaded
            }
        };

        log::debug!(
            "Loaded {} records from {}",
            self.records.len(),
            self.backend.location()
        );
    }

    /// A copy of every record, initializing first if needed.
    pub async fn get_all(&mut self) -> Vec<GameRecord> {
        self.initialize().await;
        self.records.clone()
    }

    /// Store a new record, with an optional cover image.
    pub async fn add(
        &mut self,
        mut input: GameInput,
        image: Option<ImageFile>,
    ) -> Result<GameRecord, StoreError> {
        self.initialize().await;
        self.registry.load().await;
        input.category = self.registry.normalize(&input.category).to_string();

        let uri = self.encode(image.as_ref())?;
        let mut record = new_record(self.generate_id(), &input);
        if let Some(uri) = &uri {
            let chain = self.backend.placement_chain();
            let fields = place_image(&chain, uri, &record.name).await?;
            record.set_image_fields(fields);
        }

        let mut candidate = self.records.clone();
        candidate.push(record.clone());
        match self.backend.create(&candidate, &record).await {
            Ok(saved) => {
                if let Some(last) = candidate.last_mut() {
                    *last = saved.clone();
                }
                self.records = candidate;
                log::info!("Added \"{}\" ({})", saved.name, saved.id);
                Ok(saved)
            }
            Err(e) => {
                self.discard_image(&record).await;
                Err(e)
            }
        }
    }

    /// Apply `input` to record `id`. Image fields change only when `image` is
    /// given; the previous stored file is removed before the new one is
    /// placed. If the backend then rejects the update, the cached record
    /// drops its reference to the removed file.
    pub async fn update(
        &mut self,
        id: &str,
        mut input: GameInput,
        image: Option<ImageFile>,
    ) -> Result<GameRecord, StoreError> {
        self.initialize().await;
        let index = self.position(id)?;
        self.registry.load().await;
        input.category = self.registry.normalize(&input.category).to_string();

        let mut released_old = false;
        let image_update = match self.encode(image.as_ref())? {
            None => ImageUpdate::Keep,
            Some(uri) => {
                released_old = self.discard_image(&self.records[index]).await;
                let chain = self.backend.placement_chain();
                match place_image(&chain, &uri, &input.name).await {
                    Ok(fields) => ImageUpdate::Replace(fields),
                    Err(e) => {
                        if released_old {
                            detach_stored_image(&mut self.records[index]);
                        }
                        return Err(e.into());
                    }
                }
            }
        };

        let updated = merge_update(&self.records[index], &input, image_update.clone());
        let mut candidate = self.records.clone();
        candidate[index] = updated.clone();
        match self.backend.replace(&candidate, &updated).await {
            Ok(saved) => {
                candidate[index] = saved.clone();
                self.records = candidate;
                log::info!("Updated \"{}\" ({})", saved.name, saved.id);
                Ok(saved)
            }
            Err(e) => {
                if let ImageUpdate::Replace(_) = image_update {
                    self.discard_image(&updated).await;
                }
                if released_old {
                    detach_stored_image(&mut self.records[index]);
                }
                Err(e)
            }
        }
    }

    /// Remove record `id` and its stored image. Returns the removed record.
    pub async fn delete(&mut self, id: &str) -> Result<GameRecord, StoreError> {
        self.initialize().await;
        let index = self.position(id)?;
        let removed = self.records[index].clone();

        let mut candidate = self.records.clone();
        candidate.remove(index);
        self.discard_image(&removed).await;
        self.backend.remove(&candidate, &removed).await?;

        self.records = candidate;
        log::info!("Deleted \"{}\" ({})", removed.name, removed.id);
        Ok(removed)
    }

    /// Stamp every record whose date does not parse with the current time and
    /// persist the changed records. Returns how many were repaired.
    pub async fn repair_invalid_dates(&mut self) -> Result<usize, StoreError> {
        self.initialize().await;
        let mut candidate = self.records.clone();
        let repaired = query::repair_invalid_dates(&mut candidate);
        if repaired == 0 {
            return Ok(0);
        }

        let changed: Vec<GameRecord> = candidate
            .iter()
            .zip(&self.records)
            .filter(|(new, old)| new.record_date != old.record_date)
            .map(|(new, _)| new.clone())
            .collect();
        let saved = self.backend.replace_many(&candidate, &changed).await?;
        for record in saved {
            if let Some(slot) = candidate.iter_mut().find(|r| r.id == record.id) {
                *slot = record;
            }
        }

        self.records = candidate;
        log::info!("Repaired {repaired} invalid record dates");
        Ok(repaired)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn encode(&self, image: Option<&ImageFile>) -> Result<Option<DataUri>, StoreError> {
        Ok(image
            .map(|f| encode_image(f, self.max_image_bytes))
            .transpose()?)
    }

    /// A fresh v4 UUID not used by any cached record.
    fn generate_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.find(&id).is_none() {
                return id;
            }
        }
    }

    /// Best-effort removal of `record`'s stored file. True if a stored file
    /// was released.
    async fn discard_image(&self, record: &GameRecord) -> bool {
        if record.image_path.is_none() {
            return false;
        }
        match self.backend.release_image(record).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Could not remove image for \"{}\": {e}", record.name);
                false
            }
        }
    }
}

/// Forget a stored file that no longer exists. An embedded copy, if any,
/// stays.
fn detach_stored_image(record: &mut GameRecord) {
    record.image_path = None;
    if record
        .image_url
        .as_deref()
        .is_some_and(|u| !u.starts_with("data:"))
    {
        record.image_url = None;
    }
}
