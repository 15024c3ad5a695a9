use backlog_core::GameRecord;
use backlog_store::{BackendKind, PlacementStrategy, RecordBackend, StoreError};

use crate::client::ApiClient;
use crate::error::ClientError;

/// Records kept by the backlog API server, one HTTP call per change.
///
/// Images travel inline as data URIs; the server decides where they are
/// stored and returns the record with its own image fields.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: ApiClient,
}

impl RemoteBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: ApiClient::new(base_url)?,
        })
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl RecordBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn location(&self) -> String {
        self.client.base_url().to_string()
    }

    async fn load_all(&self) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.client.list_games().await?)
    }

    async fn create(
        &self,
        _records: &[GameRecord],
        created: &GameRecord,
    ) -> Result<GameRecord, StoreError> {
        let saved = self.client.create_game(created).await?;
        if saved.id != created.id {
            log::debug!("Server assigned id {} (sent {})", saved.id, created.id);
        }
        Ok(saved)
    }

    async fn replace(
        &self,
        _records: &[GameRecord],
        updated: &GameRecord,
    ) -> Result<GameRecord, StoreError> {
        Ok(self.client.update_game(updated).await?)
    }

    async fn remove(&self, _records: &[GameRecord], removed: &GameRecord) -> Result<(), StoreError> {
        Ok(self.client.delete_game(&removed.id).await?)
    }

    fn placement_chain(&self) -> Vec<PlacementStrategy> {
        vec![PlacementStrategy::Embed]
    }

    fn resolve_image_url(&self, image_url: &str) -> String {
        self.client.resolve_image_url(image_url)
    }
}
