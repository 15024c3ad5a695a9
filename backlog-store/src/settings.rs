//! Application settings: which backend to use and where things live.
//!
//! The settings file is `~/.config/game-backlog/settings.toml`. Values are
//! resolved by priority: explicit override, then environment variable, then
//! the settings file, then the built-in default.

use std::io;
use std::path::{Path, PathBuf};

use backlog_core::CategorySource;
use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::image::DEFAULT_MAX_IMAGE_BYTES;

pub const ENV_MODE: &str = "BACKLOG_MODE";
pub const ENV_DATA_DIR: &str = "BACKLOG_DATA_DIR";
pub const ENV_API_URL: &str = "BACKLOG_API_URL";
pub const ENV_CATEGORIES: &str = "BACKLOG_CATEGORIES";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CATEGORY_SOURCE: &str = "./config.json";

/// Canonical path to the settings file: `~/.config/game-backlog/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("game-backlog").join("settings.toml")
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub categories: CategorySettings,
    pub images: ImageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub mode: BackendKind,
    pub data_dir: PathBuf,
    pub api_base_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            mode: BackendKind::Local,
            data_dir: PathBuf::from("./data"),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySettings {
    /// A file path or an `http(s)://` URL.
    pub source: String,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            source: DEFAULT_CATEGORY_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub max_bytes: u64,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl Settings {
    /// Settings file plus environment overrides.
    pub fn load() -> Self {
        Self::load_from(&settings_path()).with_env()
    }

    /// Read a settings file. A missing or unparseable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Could not read {}: {e}", path.display());
                return Self::default();
            }
        };
        match toml::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Apply `BACKLOG_*` environment variables.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    /// Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key| lookup(key).filter(|v: &String| !v.trim().is_empty());

        if let Some(mode) = get(ENV_MODE) {
            match BackendKind::from_str_loose(&mode) {
                Some(kind) => self.backend.mode = kind,
                None => log::warn!("Ignoring unknown {ENV_MODE} value '{mode}'"),
            }
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.backend.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = get(ENV_API_URL) {
            self.backend.api_base_url = url;
        }
        if let Some(source) = get(ENV_CATEGORIES) {
            self.categories.source = source;
        }
        self
    }

    pub fn category_source(&self) -> CategorySource {
        CategorySource::parse(&self.categories.source)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Write the settings file atomically.
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = self.to_toml_string().map_err(io::Error::other)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_from(&tmp.path().join("settings.toml"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.backend.mode, BackendKind::Local);
        assert_eq!(settings.images.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[backend]\nmode = \"remote\"\n").unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.backend.mode, BackendKind::Remote);
        assert_eq!(settings.backend.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.categories.source, DEFAULT_CATEGORY_SOURCE);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[backend\nmode = ").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn overrides_beat_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_MODE, "REMOTE"),
            (ENV_API_URL, "http://example.test"),
            (ENV_DATA_DIR, "  "),
            (ENV_CATEGORIES, "https://example.test/config.json"),
        ]);
        let settings =
            Settings::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.backend.mode, BackendKind::Remote);
        assert_eq!(settings.backend.api_base_url, "http://example.test");
        assert_eq!(settings.backend.data_dir, PathBuf::from("./data"));
        assert!(matches!(settings.category_source(), CategorySource::Url(_)));
    }

    #[test]
    fn unknown_mode_is_ignored() {
        let settings = Settings::default().with_overrides(|k| {
            (k == ENV_MODE).then(|| "cloud".to_string())
        });
        assert_eq!(settings.backend.mode, BackendKind::Local);
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.backend.data_dir = PathBuf::from("/srv/backlog");
        settings.images.max_bytes = 1024;

        settings.save_to(&path).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(Settings::load_from(&path), settings);
    }
}
