//! Read-only queries over a slice of records.
//!
//! Every function here takes the records by reference and returns new data;
//! the one exception is [`repair_invalid_dates`], which rewrites dates in
//! place on a list the caller owns.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

use crate::category::CategoryRegistry;
use crate::dates::now_stamp;
use crate::types::GameRecord;

// ── Search ──────────────────────────────────────────────────────────────────

/// Filters applied by [`search`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub year: Option<i32>,
    /// 1–12.
    pub month: Option<u32>,
    /// Normalized against the registry before matching. Empty means unset.
    pub category: Option<String>,
}

/// Records whose name contains `text` (case-insensitive) and that pass every
/// filter, in their original order.
pub fn search(
    records: &[GameRecord],
    text: &str,
    filters: &SearchFilters,
    registry: &CategoryRegistry,
) -> Vec<GameRecord> {
    let needle = text.trim().to_lowercase();
    let category = filters
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| registry.normalize(c));

    records
        .iter()
        .filter(|r| needle.is_empty() || r.name.to_lowercase().contains(&needle))
        .filter(|r| match (filters.year, filters.month) {
            (None, None) => true,
            (year, month) => r.parsed_date().is_some_and(|d| {
                year.is_none_or(|y| d.year() == y) && month.is_none_or(|m| d.month() == m)
            }),
        })
        .filter(|r| category.is_none_or(|c| r.category == c))
        .cloned()
        .collect()
}

// ── Sort ────────────────────────────────────────────────────────────────────

/// Orderings offered for a record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    ScoreDesc,
    ScoreAsc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        Self::DateDesc,
        Self::DateAsc,
        Self::ScoreDesc,
        Self::ScoreAsc,
        Self::NameAsc,
        Self::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::ScoreDesc => "score-desc",
            Self::ScoreAsc => "score-asc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    /// Unrecognized strings fall back to [`SortOrder::DateDesc`].
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "date-asc" => Self::DateAsc,
            "score-desc" => Self::ScoreDesc,
            "score-asc" => Self::ScoreAsc,
            "name-asc" => Self::NameAsc,
            "name-desc" => Self::NameDesc,
            _ => Self::DateDesc,
        }
    }
}

/// A sorted copy of `records`. The sort is stable; records with an invalid
/// date go last in both date orders.
pub fn sort(records: &[GameRecord], order: SortOrder) -> Vec<GameRecord> {
    let mut sorted = records.to_vec();
    match order {
        SortOrder::DateDesc => sort_by_date(&mut sorted, true),
        SortOrder::DateAsc => sort_by_date(&mut sorted, false),
        SortOrder::ScoreDesc => sorted.sort_by(|a, b| b.score.total_cmp(&a.score)),
        SortOrder::ScoreAsc => sorted.sort_by(|a, b| a.score.total_cmp(&b.score)),
        SortOrder::NameAsc => sorted.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortOrder::NameDesc => sorted.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }
    sorted
}

/// Dates are parsed once per record, not once per comparison.
fn sort_by_date(records: &mut Vec<GameRecord>, descending: bool) {
    let mut keyed: Vec<(Option<NaiveDateTime>, GameRecord)> =
        records.drain(..).map(|r| (r.parsed_date(), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| compare_dates(*a, *b, descending));
    records.extend(keyed.into_iter().map(|(_, r)| r));
}

fn compare_dates(
    a: Option<NaiveDateTime>,
    b: Option<NaiveDateTime>,
    descending: bool,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-folded comparison, raw text as tiebreaker.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Aggregate figures over a record list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_games: usize,
    /// Rounded to one decimal; 0 for an empty list.
    pub average_score: f64,
    /// Hours; records without a play time count as 0.
    pub total_play_time: f64,
    pub category_stats: BTreeMap<String, usize>,
    /// Only records with a parseable date are counted.
    pub year_stats: BTreeMap<i32, usize>,
}

pub fn statistics(records: &[GameRecord]) -> Statistics {
    let mut stats = Statistics {
        total_games: records.len(),
        ..Default::default()
    };
    if records.is_empty() {
        return stats;
    }

    let total_score: f64 = records.iter().map(|r| r.score).sum();
    stats.average_score = round_one_decimal(total_score / records.len() as f64);
    stats.total_play_time = records.iter().filter_map(|r| r.play_time).sum();

    for record in records {
        *stats
            .category_stats
            .entry(record.category.clone())
            .or_default() += 1;
        if let Some(date) = record.parsed_date() {
            *stats.year_stats.entry(date.year()).or_default() += 1;
        }
    }

    stats
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Distinct years among parseable record dates, newest first.
pub fn available_years(records: &[GameRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records
        .iter()
        .filter_map(|r| r.parsed_date())
        .map(|d| d.year())
        .collect();
    years.into_iter().rev().collect()
}

// ── Repair ──────────────────────────────────────────────────────────────────

/// Overwrite every unparseable record date with the current time. Returns the
/// number of records changed; the caller persists when it is non-zero.
pub fn repair_invalid_dates(records: &mut [GameRecord]) -> usize {
    repair_invalid_dates_with(records, &now_stamp())
}

/// [`repair_invalid_dates`] with an explicit replacement stamp.
pub fn repair_invalid_dates_with(records: &mut [GameRecord], stamp: &str) -> usize {
    let mut repaired = 0;
    for record in records.iter_mut().filter(|r| r.parsed_date().is_none()) {
        log::warn!(
            "Repairing invalid date {:?} on \"{}\"",
            record.record_date,
            record.name
        );
        record.record_date = stamp.to_string();
        repaired += 1;
    }
    repaired
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
