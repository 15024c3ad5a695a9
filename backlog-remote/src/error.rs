use backlog_store::StoreError;

/// Errors that can occur talking to the backlog API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),
}

impl From<ClientError> for StoreError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::ServerError { status, message } => StoreError::Http { status, message },
            other => StoreError::persistence(other.to_string()),
        }
    }
}
