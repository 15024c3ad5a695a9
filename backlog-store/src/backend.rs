//! The persistence port the record store writes through.
//!
//! Every mutating call receives the full record list as it will look after
//! the change, plus the record being changed. A backend that rewrites a whole
//! file uses the list; a backend that talks to a per-record API uses the
//! record. The store commits its cache only after the call succeeds.

use std::fmt;

use backlog_core::GameRecord;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::image::PlacementStrategy;

/// Which kind of persistence a backend provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }

    /// Case-insensitive parse of `local` or `remote`.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Some(Self::Local),
            "remote" | "api" => Some(Self::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage behind a [`RecordStore`](crate::RecordStore).
#[allow(async_fn_in_trait)]
pub trait RecordBackend {
    fn kind(&self) -> BackendKind;

    /// Human-readable location, for log lines.
    fn location(&self) -> String;

    /// Every stored record.
    async fn load_all(&self) -> Result<Vec<GameRecord>, StoreError>;

    /// Persist a new record. Returns the record as stored, which may differ
    /// from `created` if the backend assigns fields.
    async fn create(
        &self,
        records: &[GameRecord],
        created: &GameRecord,
    ) -> Result<GameRecord, StoreError>;

    /// Persist a changed record. Returns the record as stored.
    async fn replace(
        &self,
        records: &[GameRecord],
        updated: &GameRecord,
    ) -> Result<GameRecord, StoreError>;

    /// Persist several changed records. Stops at the first failure.
    async fn replace_many(
        &self,
        records: &[GameRecord],
        changed: &[GameRecord],
    ) -> Result<Vec<GameRecord>, StoreError> {
        let mut stored = Vec::with_capacity(changed.len());
        for record in changed {
            stored.push(self.replace(records, record).await?);
        }
        Ok(stored)
    }

    /// Remove a record. `records` no longer contains it.
    async fn remove(&self, records: &[GameRecord], removed: &GameRecord)
    -> Result<(), StoreError>;

    /// Upgrade freshly loaded records in place and persist the result.
    /// Returns how many records changed.
    async fn migrate(&self, _records: &mut [GameRecord]) -> Result<usize, StoreError> {
        Ok(0)
    }

    /// Where new images go, in order of preference.
    fn placement_chain(&self) -> Vec<PlacementStrategy>;

    /// Drop any stored file `record` references.
    async fn release_image(&self, _record: &GameRecord) -> Result<(), StoreError> {
        Ok(())
    }

    /// An `imageUrl` as a user can open it.
    fn resolve_image_url(&self, image_url: &str) -> String {
        image_url.to_string()
    }
}
