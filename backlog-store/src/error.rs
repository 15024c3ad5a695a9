use thiserror::Error;

/// Errors raised while encoding, storing, or placing an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The source file could not be read
    #[error("Could not read image {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    /// The image is larger than the configured limit
    #[error("Image is too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// A string that should have been a data URI was not one
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Writing a file into the image directory failed
    #[error("Could not write image {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    /// Deleting a file from the image directory failed
    #[error("Could not remove image {path}: {source}")]
    Remove {
        path: String,
        source: std::io::Error,
    },

    /// Every placement strategy failed; one message per strategy
    #[error("No image placement succeeded: {}", .0.join("; "))]
    Exhausted(Vec<String>),
}

impl ImageError {
    pub fn invalid_data_uri(msg: impl Into<String>) -> Self {
        Self::InvalidDataUri(msg.into())
    }
}

/// Errors surfaced by the record store and its backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id exists
    #[error("Game record not found: {id}")]
    NotFound { id: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The remote API answered with a non-success status
    #[error("Server returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend could not complete the write for another reason
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
