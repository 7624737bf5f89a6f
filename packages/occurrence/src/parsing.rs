//! Field-level parsing for occurrence rows.
//!
//! Event dates and coordinates arrive as free text in Darwin Core exports;
//! these helpers turn them into typed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use geo::Point;

/// Outcome of parsing an `eventDate` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDate {
    /// The field was blank.
    Missing,
    /// The field held a recognizable date or timestamp.
    Date(NaiveDate),
    /// The field held text that is not a date.
    Invalid,
}

/// Parses an ISO 8601 style event date.
///
/// Accepts full timestamps (with or without fractional seconds and offset),
/// plain dates, and the reduced-precision `YYYY-MM` and `YYYY` forms, which
/// resolve to the first day of the period. Only the calendar date is kept.
#[must_use]
pub fn parse_event_date(s: &str) -> EventDate {
    let s = s.trim();
    if s.is_empty() {
        return EventDate::Missing;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return EventDate::Date(dt.date_naive());
    }
    // Zoned forms RFC 3339 rejects: minute precision and basic offsets.
    for format in [
        "%Y-%m-%dT%H:%M%#z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return EventDate::Date(dt.date_naive());
        }
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return EventDate::Date(naive.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return EventDate::Date(date);
    }

    parse_partial_date(s).map_or(EventDate::Invalid, EventDate::Date)
}

/// Handles `YYYY-MM` and `YYYY`.
fn parse_partial_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(2, '-');
    let year_str = parts.next()?;
    if year_str.len() != 4 || !year_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year_str.parse().ok()?;

    let month = match parts.next() {
        None => 1,
        Some(m) if m.len() == 2 && m.bytes().all(|b| b.is_ascii_digit()) => m.parse().ok()?,
        Some(_) => return None,
    };

    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Builds a WGS84 point from longitude/latitude text.
///
/// Returns `None` if either value is blank, unparseable, non-finite, or
/// outside the valid degree range. `0.0` is a valid coordinate.
#[must_use]
pub fn parse_point(lng: &str, lat: &str) -> Option<Point<f64>> {
    let longitude = lng.trim().parse::<f64>().ok()?;
    let latitude = lat.trim().parse::<f64>().ok()?;
    if !longitude.is_finite() || !latitude.is_finite() {
        return None;
    }
    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return None;
    }
    Some(Point::new(longitude, latitude))
}

/// Treats blank text as absent.
#[must_use]
pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
