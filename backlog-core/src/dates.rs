//! Record date parsing.
//!
//! Record dates are stored as the strings users typed (usually the
//! `YYYY-MM-DDTHH:MM` form a datetime picker produces). Anything that fails
//! every accepted format is an invalid date: kept in storage, but left out
//! of date filters and statistics.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Format used when the store writes a date itself.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a record date. Offsets are converted to local time.
pub fn parse_record_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// The current local time in [`RECORD_DATE_FORMAT`].
pub fn now_stamp() -> String {
    Local::now().format(RECORD_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_picker_format() {
        let dt = parse_record_date("2024-05-01T10:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 5, 1));
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn parses_seconds_fractions_and_date_only() {
        assert!(parse_record_date("2024-01-15T20:30:00").is_some());
        assert!(parse_record_date("2024-01-15T20:30:00.123456").is_some());
        assert!(parse_record_date("2024-01-15 20:30").is_some());
        assert_eq!(
            parse_record_date("2023/12/31").map(|d| d.year()),
            Some(2023)
        );
        assert!(parse_record_date("2024-02-10T14:15:00Z").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("   "), None);
        assert_eq!(parse_record_date("yesterday"), None);
        assert_eq!(parse_record_date("2024-13-01T10:00"), None);
    }

    #[test]
    fn now_stamp_round_trips() {
        assert!(parse_record_date(&now_stamp()).is_some());
    }
}
