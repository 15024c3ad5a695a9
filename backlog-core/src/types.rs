//! Data model types for the backlog.
//!
//! `GameRecord` is the one persisted entity. Its JSON form (camelCase field
//! names) is shared by the local data file and the remote API.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::parse_record_date;

/// Category code that every unknown or missing category collapses to.
pub const OTHER_CATEGORY: &str = "OTHER";

fn default_category() -> String {
    OTHER_CATEGORY.to_string()
}

/// Read `null` the same as a missing field. Older writers emit `null` for
/// NaN scores and cleared strings.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_other<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_category))
}

// ── Record ──────────────────────────────────────────────────────────────────

/// One user-entered backlog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default = "default_category", deserialize_with = "null_as_other")]
    pub category: String,
    /// Hours played, if the user recorded it.
    #[serde(default)]
    pub play_time: Option<f64>,
    /// Free-form date-time string. May be unparseable; see [`GameRecord::parsed_date`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub record_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    /// Filename inside the image directory (local backend only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Display-ready location: a path, an API URL, or a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Embedded data URI, used when the image could not be stored as a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Fields written by other tools or the server. Round-tripped untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl GameRecord {
    /// Create a record with no image and no extra fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score: 0.0,
            category: default_category(),
            play_time: None,
            record_date: String::new(),
            comment: String::new(),
            image_path: None,
            image_url: None,
            image_data: None,
            extra: BTreeMap::new(),
        }
    }

    /// The record date, or `None` if it cannot be parsed.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_record_date(&self.record_date)
    }

    pub fn has_image(&self) -> bool {
        self.image_path.is_some() || self.image_url.is_some() || self.image_data.is_some()
    }

    /// Current image references as a unit.
    pub fn image_fields(&self) -> ImageFields {
        ImageFields {
            image_path: self.image_path.clone(),
            image_url: self.image_url.clone(),
            image_data: self.image_data.clone(),
        }
    }

    /// Replace all three image references at once.
    pub fn set_image_fields(&mut self, fields: ImageFields) {
        self.image_path = fields.image_path;
        self.image_url = fields.image_url;
        self.image_data = fields.image_data;
    }
}

// ── Image references ────────────────────────────────────────────────────────

/// The three image reference fields of a record, moved together so they
/// never drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageFields {
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub image_data: Option<String>,
}

impl ImageFields {
    /// A file stored on disk and the URL that serves it.
    pub fn stored(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            image_path: Some(path.into()),
            image_url: Some(url.into()),
            image_data: None,
        }
    }

    /// An image carried inline as a data URI.
    pub fn embedded(data_uri: impl Into<String>) -> Self {
        let data_uri = data_uri.into();
        Self {
            image_path: None,
            image_url: Some(data_uri.clone()),
            image_data: Some(data_uri),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image_path.is_none() && self.image_url.is_none() && self.image_data.is_none()
    }
}
