//! Caller-supplied record fields and their validation.
//!
//! Validation happens here, before a request reaches the record store. The
//! store trusts a [`GameInput`] and only normalizes its category.

use thiserror::Error;

use crate::dates::now_stamp;

/// Highest score a game can be given.
pub const MAX_SCORE: f64 = 10.0;

/// Errors raised while turning a submitted form into a [`GameInput`].
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Game name is required")]
    MissingName,

    #[error("Category is required")]
    MissingCategory,

    #[error("Invalid score '{0}': expected a number between 0 and 10")]
    InvalidScore(String),

    #[error("Invalid play time '{0}': expected a non-negative number of hours")]
    InvalidPlayTime(String),
}

/// The mutable fields of a record, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct GameInput {
    pub name: String,
    pub score: f64,
    pub category: String,
    pub play_time: Option<f64>,
    pub record_date: String,
    pub comment: String,
}

impl GameInput {
    /// Input dated now, with no play time and an empty comment.
    pub fn new(name: impl Into<String>, score: f64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score,
            category: category.into(),
            play_time: None,
            record_date: now_stamp(),
            comment: String::new(),
        }
    }

    pub fn with_play_time(mut self, hours: f64) -> Self {
        self.play_time = Some(hours);
        self
    }

    pub fn with_record_date(mut self, date: impl Into<String>) -> Self {
        self.record_date = date.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A record form exactly as submitted: every field a string.
#[derive(Debug, Clone, Default)]
pub struct GameForm {
    pub name: String,
    pub score: String,
    pub category: String,
    pub play_time: String,
    pub record_date: String,
    pub comment: String,
}

impl TryFrom<GameForm> for GameInput {
    type Error = ValidationError;

    fn try_from(form: GameForm) -> Result<Self, Self::Error> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let category = form.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }

        let score = parse_score(&form.score)?;
        let play_time = parse_play_time(&form.play_time)?;
        let record_date = if form.record_date.trim().is_empty() {
            now_stamp()
        } else {
            form.record_date.trim().to_string()
        };

        Ok(Self {
            name: name.to_string(),
            score,
            category: category.to_string(),
            play_time,
            record_date,
            comment: form.comment,
        })
    }
}

/// Parse a score, rounded to one decimal place.
fn parse_score(raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidScore(raw.to_string()))?;
    if !value.is_finite() || !(0.0..=MAX_SCORE).contains(&value) {
        return Err(ValidationError::InvalidScore(raw.to_string()));
    }
    Ok((value * 10.0).round() / 10.0)
}

/// Blank means "not recorded".
fn parse_play_time(raw: &str) -> Result<Option<f64>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let hours: f64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidPlayTime(raw.to_string()))?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(ValidationError::InvalidPlayTime(raw.to_string()));
    }
    Ok(Some(hours))
}
