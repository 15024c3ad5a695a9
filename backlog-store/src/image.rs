//! Cover images: data URI encoding, the on-disk image directory, and the
//! placement chain that decides where a new image ends up.
//!
//! An uploaded image always passes through a [`DataUri`] first. A backend
//! then offers an ordered list of [`PlacementStrategy`] values; the first one
//! that succeeds decides which of the record's image fields get filled.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use backlog_core::ImageFields;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::error::ImageError;

/// Default upper bound on an uploaded image.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";
const BARE_PAYLOAD_MIME: &str = "image/png";
const MAX_NAME_CHARS: usize = 50;
const PLACEHOLDER_NAME: &str = "unnamed";
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

// ── Source images ───────────────────────────────────────────────────────────

/// Raw image bytes supplied by a caller, with the file name they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn from_bytes(bytes: Vec<u8>, file_name: Option<String>) -> Self {
        Self { file_name, bytes }
    }

    /// Read an image from disk.
    pub async fn read(path: &Path) -> Result<Self, ImageError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ImageError::Unreadable {
                path: path.display().to_string(),
                source: e,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self { file_name, bytes })
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type sniffed from the content, then the file extension.
    pub fn mime(&self) -> &'static str {
        sniff_mime(&self.bytes, self.file_name.as_deref())
    }
}

/// Guess a MIME type from magic bytes, falling back to the file extension.
pub fn sniff_mime(bytes: &[u8], file_name: Option<&str>) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(ImageFormat::from_extension)
        .map(|f| f.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

/// Encode an image as a data URI, rejecting anything over `max_bytes`.
pub fn encode_image(image: &ImageFile, max_bytes: u64) -> Result<DataUri, ImageError> {
    if image.len() > max_bytes {
        return Err(ImageError::TooLarge {
            size: image.len(),
            limit: max_bytes,
        });
    }
    Ok(DataUri::encode(&image.bytes, image.mime()))
}

// ── Data URIs ───────────────────────────────────────────────────────────────

/// A base64 `data:<mime>;base64,<payload>` string, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    payload: String,
}

impl DataUri {
    pub fn encode(bytes: &[u8], mime: &str) -> Self {
        Self {
            mime: mime.to_string(),
            payload: STANDARD.encode(bytes),
        }
    }

    /// Parse a data URI. A string with no `data:` header is taken to be a
    /// bare base64 PNG payload.
    pub fn parse(s: &str) -> Result<Self, ImageError> {
        let s = s.trim();
        let Some(rest) = s.strip_prefix("data:") else {
            if s.is_empty() {
                return Err(ImageError::invalid_data_uri("empty payload"));
            }
            return Ok(Self {
                mime: BARE_PAYLOAD_MIME.to_string(),
                payload: s.to_string(),
            });
        };

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::invalid_data_uri("missing ',' separator"))?;
        let mut parts = header.split(';');
        let mime = parts.next().unwrap_or_default().trim();
        if !parts.any(|p| p.trim() == "base64") {
            return Err(ImageError::invalid_data_uri("only base64 payloads are supported"));
        }
        if payload.is_empty() {
            return Err(ImageError::invalid_data_uri("empty payload"));
        }

        Ok(Self {
            mime: if mime.is_empty() { FALLBACK_MIME } else { mime }.to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn decode(&self) -> Result<Vec<u8>, ImageError> {
        Ok(STANDARD.decode(&self.payload)?)
    }

    /// File extension for the MIME type; `png` when it is not an image type
    /// we recognize.
    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("png")
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

impl FromStr for DataUri {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── Filenames ───────────────────────────────────────────────────────────────

/// Reduce a game name to something safe to use as a filename stem.
///
/// Reserved characters are dropped, whitespace runs become `_`, and only
/// letters, digits, `-`, `_` and `.` survive. The result is at most 50
/// characters and never empty.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if RESERVED_CHARS.contains(&c) {
            continue;
        }
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
            out.push(c);
        }
    }

    let truncated: String = out.chars().take(MAX_NAME_CHARS).collect();
    if truncated.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        truncated
    }
}

// ── Image directory ─────────────────────────────────────────────────────────

/// The directory that holds stored image files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a stored image. Directory components in `file_name` are
    /// ignored so a record can never point outside the image directory.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        let base = Path::new(file_name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default();
        self.dir.join(base)
    }

    /// Display URL recorded alongside a stored file.
    pub fn url_for(&self, file_name: &str) -> String {
        self.path_for(file_name).to_string_lossy().into_owned()
    }

    /// Decode `uri` and write it under a unique filename derived from
    /// `name_hint`. Returns the filename.
    pub async fn save(&self, uri: &DataUri, name_hint: &str) -> Result<String, ImageError> {
        let bytes = uri.decode()?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ImageError::Write {
                path: self.dir.display().to_string(),
                source: e,
            })?;

        let stem = sanitize_filename(name_hint);
        let ext = uri.extension();
        let mut stamp = chrono::Utc::now().timestamp_micros();
        let (file_name, path) = loop {
            let candidate = format!("{stem}_{stamp}.{ext}");
            let path = self.dir.join(&candidate);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                break (candidate, path);
            }
            stamp += 1;
        };

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ImageError::Write {
                path: path.display().to_string(),
                source: e,
            })?;
        log::debug!("Stored image {} ({} bytes)", path.display(), bytes.len());
        Ok(file_name)
    }

    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, ImageError> {
        let path = self.path_for(file_name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ImageError::Unreadable {
                path: path.display().to_string(),
                source: e,
            })
    }

    /// Remove a stored image. Returns `false` if it was already gone.
    pub async fn delete(&self, file_name: &str) -> Result<bool, ImageError> {
        let path = self.path_for(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                log::debug!("Removed image {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ImageError::Remove {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Filenames currently in the directory. A missing directory is empty.
    pub async fn list(&self) -> Result<Vec<String>, ImageError> {
        let unreadable = |e| ImageError::Unreadable {
            path: self.dir.display().to_string(),
            source: e,
        };
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unreadable(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

// ── Placement ───────────────────────────────────────────────────────────────

/// One way of attaching an image to a record.
#[derive(Debug, Clone)]
pub enum PlacementStrategy {
    /// Write a file into the image directory; fills `imagePath` and `imageUrl`.
    StoreOnDisk(ImageStore),
    /// Keep the data URI inline; fills `imageUrl` and `imageData`.
    Embed,
}

impl PlacementStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StoreOnDisk(_) => "disk",
            Self::Embed => "embed",
        }
    }

    pub async fn place(&self, uri: &DataUri, name_hint: &str) -> Result<ImageFields, ImageError> {
        match self {
            Self::StoreOnDisk(store) => {
                let file_name = store.save(uri, name_hint).await?;
                let url = store.url_for(&file_name);
                Ok(ImageFields::stored(file_name, url))
            }
            Self::Embed => Ok(ImageFields::embedded(uri.to_string())),
        }
    }
}

/// Try each strategy in order and return the first success.
pub async fn place_image(
    chain: &[PlacementStrategy],
    uri: &DataUri,
    name_hint: &str,
) -> Result<ImageFields, ImageError> {
    let mut failures = Vec::new();
    for strategy in chain {
        match strategy.place(uri, name_hint).await {
            Ok(fields) => {
                if !failures.is_empty() {
                    log::info!("Image for \"{name_hint}\" placed by {}", strategy.label());
                }
                return Ok(fields);
            }
            Err(e) => {
                log::warn!("{} placement failed for \"{name_hint}\": {e}", strategy.label());
                failures.push(format!("{}: {e}", strategy.label()));
            }
        }
    }
    Err(ImageError::Exhausted(failures))
}

#[cfg(test)]
#[path = "tests/image_tests.rs"]
mod tests;
