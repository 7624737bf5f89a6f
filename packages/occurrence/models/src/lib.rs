#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Darwin Core occurrence record types and the required column schema.
//!
//! An uploaded occurrence file is normalized into [`OccurrenceRecord`]s
//! collected in an [`OccurrenceSet`]. The columns the loader insists on are
//! enumerated by [`OccurrenceField`], so a file is validated against one
//! fixed schema instead of looking columns up by name ad hoc.

use chrono::NaiveDate;
use geo::Point;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default header of the unique record identifier column (GBIF downloads).
pub const DEFAULT_RECORD_ID_COLUMN: &str = "gbifID";

/// A Darwin Core column that every occurrence file must carry.
///
/// The record identifier column is not listed here because its header
/// differs between providers; it is configured separately.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum OccurrenceField {
    /// Scientific species name (`species`).
    Species,
    /// WGS84 longitude in decimal degrees (`decimalLongitude`).
    DecimalLongitude,
    /// WGS84 latitude in decimal degrees (`decimalLatitude`).
    DecimalLatitude,
    /// ISO 8601 event date (`eventDate`).
    EventDate,
    /// First-level administrative division (`stateProvince`).
    StateProvince,
    /// Free-text locality description (`locality`).
    Locality,
}

impl OccurrenceField {
    /// Every column an occurrence file must provide, in canonical order.
    pub const REQUIRED: &[Self] = &[
        Self::Species,
        Self::DecimalLongitude,
        Self::DecimalLatitude,
        Self::EventDate,
        Self::StateProvince,
        Self::Locality,
    ];
}

/// One biodiversity observation after normalization.
///
/// `species` is never empty: rows without a species are dropped during
/// ingestion. `location` is `None` when the coordinates were blank,
/// non-finite, or outside the WGS84 range; such records still show up in
/// tables but never on the map or in boundary counts.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceRecord {
    /// Provider-assigned unique identifier (e.g. a GBIF id).
    pub record_id: String,
    /// Scientific species name.
    pub species: String,
    /// Calendar date of the observation, if one was recorded.
    pub event_date: Option<NaiveDate>,
    /// Observation point (x = longitude, y = latitude, WGS84).
    pub location: Option<Point<f64>>,
    /// Province or state as written in the source file.
    pub state_province: Option<String>,
    /// Locality description as written in the source file.
    pub locality: Option<String>,
}

impl OccurrenceRecord {
    /// Returns `(longitude, latitude)` when the record has a location.
    #[must_use]
    pub fn lng_lat(&self) -> Option<(f64, f64)> {
        self.location.map(|p| (p.x(), p.y()))
    }
}

/// The normalized contents of one uploaded occurrence file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceSet {
    /// Records that survived species filtering, in file order.
    pub records: Vec<OccurrenceRecord>,
    /// Number of data rows read from the file.
    pub rows_read: u64,
    /// Rows dropped because their species field was empty.
    pub dropped_without_species: u64,
    /// Surviving records whose coordinates could not form a valid point.
    pub without_location: u64,
}

impl OccurrenceSet {
    /// Returns `true` when no record survived ingestion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of surviving records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_use_darwin_core_headers() {
        let headers: Vec<&str> = OccurrenceField::REQUIRED
            .iter()
            .map(AsRef::as_ref)
            .collect();
        assert_eq!(
            headers,
            [
                "species",
                "decimalLongitude",
                "decimalLatitude",
                "eventDate",
                "stateProvince",
                "locality",
            ]
        );
    }

    #[test]
    fn parses_field_from_header() {
        let field: OccurrenceField = "stateProvince".parse().unwrap();
        assert_eq!(field, OccurrenceField::StateProvince);
        assert!("StateProvince".parse::<OccurrenceField>().is_err());
    }

    #[test]
    fn lng_lat_reads_point_axes() {
        let record = OccurrenceRecord {
            record_id: "1".to_string(),
            species: "Ateles geoffroyi".to_string(),
            event_date: None,
            location: Some(Point::new(-84.1, 9.9)),
            state_province: None,
            locality: None,
        };
        assert_eq!(record.lng_lat(), Some((-84.1, 9.9)));
    }
}
