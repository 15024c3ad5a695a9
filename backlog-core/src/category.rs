//! Category registry: the set of category codes a record may carry.
//!
//! Codes come from an external JSON document (`{"categories": [{"code",
//! "name"}]}`) read once per process. Any failure to read or understand that
//! document swaps in the built-in table; callers never see the error, only
//! [`CategoryRegistry::using_defaults`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::OTHER_CATEGORY;

/// How long a category URL may take before the defaults are used.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Display name given to the [`OTHER_CATEGORY`] entry.
pub const OTHER_NAME: &str = "Other";

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("ADV", "Adventure"),
    ("ACT", "Action"),
    ("RPG", "Role-Playing"),
    ("SLG", "Strategy"),
    ("3DSIM", "3D Simulation"),
    (OTHER_CATEGORY, OTHER_NAME),
];

/// Why a category document could not be used.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Category config returned HTTP {0}")]
    Status(u16),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed category config: {0}")]
    Malformed(String),
}

/// Where the category document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySource {
    File(PathBuf),
    Url(String),
}

impl CategorySource {
    /// `http://` and `https://` strings are URLs, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for CategorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// A known category code and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub code: String,
    pub name: String,
}

#[derive(Deserialize)]
struct CategoryDocument {
    categories: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Ordered code → name table, loaded once.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    source: Option<CategorySource>,
    entries: Vec<CategoryEntry>,
    loaded: bool,
    using_defaults: bool,
    fetch_timeout: Duration,
}

impl CategoryRegistry {
    /// A registry that will read `source` on its first [`load`](Self::load).
    /// Until then it answers from the built-in table.
    pub fn new(source: CategorySource) -> Self {
        Self {
            source: Some(source),
            entries: default_entries(),
            loaded: false,
            using_defaults: false,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// A registry with no external source: the built-in table, already loaded.
    pub fn with_defaults() -> Self {
        Self {
            source: None,
            entries: default_entries(),
            loaded: true,
            using_defaults: true,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }

    /// Read the category document, once. Later calls return immediately.
    pub async fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        let Some(source) = self.source.clone() else {
            self.fall_back();
            return;
        };

        match fetch_document(&source, self.fetch_timeout).await.and_then(|text| parse_document(&text)) {
            Ok(entries) => {
                log::debug!("Loaded {} categories from {source}", entries.len());
                self.entries = entries;
                self.using_defaults = false;
            }
            Err(e) => {
                log::warn!("Could not load categories from {source}: {e}; using defaults");
                self.fall_back();
            }
        }
    }

    fn fall_back(&mut self) {
        self.entries = default_entries();
        self.using_defaults = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True when the built-in table replaced the configured one.
    pub fn using_defaults(&self) -> bool {
        self.using_defaults
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// Known codes, in configuration order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.code.as_str())
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.name.as_str())
    }

    /// `code` if known, [`OTHER_CATEGORY`] otherwise.
    pub fn normalize<'a>(&self, code: &'a str) -> &'a str {
        if self.is_known(code) {
            code
        } else {
            OTHER_CATEGORY
        }
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

async fn fetch_document(
    source: &CategorySource,
    timeout: Duration,
) -> Result<String, CategoryError> {
    match source {
        CategorySource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CategoryError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
        }
        CategorySource::Url(url) => {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            let resp = client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(CategoryError::Status(status.as_u16()));
            }
            Ok(resp.text().await?)
        }
    }
}

/// Parse a category document. `OTHER` is appended when the document lacks it.
pub fn parse_document(text: &str) -> Result<Vec<CategoryEntry>, CategoryError> {
    let doc: CategoryDocument = serde_json::from_str(text)?;

    let mut entries: Vec<CategoryEntry> = Vec::with_capacity(doc.categories.len() + 1);
    for (i, raw) in doc.categories.into_iter().enumerate() {
        let code = raw
            .code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CategoryError::Malformed(format!("entry {i} has no code")))?;
        if entries.iter().any(|e| e.code == code) {
            continue;
        }
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| code.clone());
        entries.push(CategoryEntry { code, name });
    }

    Ok(with_other(entries))
}

fn with_other(mut entries: Vec<CategoryEntry>) -> Vec<CategoryEntry> {
    if !entries.iter().any(|e| e.code == OTHER_CATEGORY) {
        entries.push(CategoryEntry {
            code: OTHER_CATEGORY.to_string(),
            name: OTHER_NAME.to_string(),
        });
    }
    entries
}

fn default_entries() -> Vec<CategoryEntry> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(code, name)| CategoryEntry {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}
