use backlog_core::GameRecord;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tokio::time::Duration;

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SNIPPET_LEN: usize = 200;

/// HTTP client for the backlog API.
///
/// ```text
/// GET    /api/games          -> [GameRecord]
/// POST   /api/games          -> GameRecord (server-assigned id)
/// PUT    /api/games/{id}     -> GameRecord
/// DELETE /api/games/{id}     -> {"success": true}
/// GET    /api/image/{file}   -> image bytes
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url.trim())
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn list_games(&self) -> Result<Vec<GameRecord>, ClientError> {
        let url = self.endpoint(&["api", "games"])?;
        self.send_json(self.http.request(Method::GET, url)).await
    }

    pub async fn create_game(&self, record: &GameRecord) -> Result<GameRecord, ClientError> {
        let url = self.endpoint(&["api", "games"])?;
        self.send_json(self.http.request(Method::POST, url).json(record))
            .await
    }

    pub async fn update_game(&self, record: &GameRecord) -> Result<GameRecord, ClientError> {
        let url = self.endpoint(&["api", "games", &record.id])?;
        self.send_json(self.http.request(Method::PUT, url).json(record))
            .await
    }

    pub async fn delete_game(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "games", id])?;
        self.send(self.http.request(Method::DELETE, url)).await?;
        Ok(())
    }

    /// Turn a server-relative image URL (`/api/image/...`) into an absolute
    /// one. Absolute URLs and data URIs are returned unchanged.
    pub fn resolve_image_url(&self, image_url: &str) -> String {
        if image_url.starts_with('/') {
            self.base
                .join(image_url)
                .map(String::from)
                .unwrap_or_else(|_| image_url.to_string())
        } else {
            image_url.to_string()
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        log::debug!("{} {}", status.as_u16(), resp.url());
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            snippet(&body).to_string()
        };
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let text = self.send(req).await?.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ClientError::Api(format!(
                "Failed to parse response: {e}. Response: {}",
                snippet(&text)
            ))
        })
    }
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
