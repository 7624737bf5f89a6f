#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative boundary and occurrence aggregate types.
//!
//! Cantons are the finest boundary level and nest inside provinces. Counts
//! are computed per canton and then re-grouped by province according to a
//! [`ProvinceMode`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Attributes of one canton boundary. The polygon itself lives in the
/// spatial index alongside this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPolygon {
    /// Numeric canton code, unique within a boundary dataset.
    pub code: u32,
    /// Canton display name.
    pub canton: String,
    /// Name of the province the canton belongs to.
    pub province: String,
}

/// Occurrence count for one canton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CantonCount {
    /// Canton code.
    pub code: u32,
    /// Canton display name.
    pub canton: String,
    /// Parent province name.
    pub province: String,
    /// Number of occurrences whose point lies inside the canton.
    pub count: u64,
}

/// Occurrence count at province level.
///
/// What a row means depends on the [`ProvinceMode`] that produced it; see
/// the variant docs there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceCount {
    /// Province name.
    pub province: String,
    /// Canton code this row was derived from (`PerCanton` rows only).
    pub code: Option<u32>,
    /// Occurrence count.
    pub count: u64,
}

/// How canton counts are re-grouped to province level.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProvinceMode {
    /// One row per province whose count is the sum over its cantons.
    #[default]
    Summed,
    /// One row per canton, stamped with its province and carrying the
    /// canton's own count. Province names repeat, so these rows are not
    /// additive per province.
    PerCanton,
}

/// Diagnostics from one spatial aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    /// Selected records that had a usable location.
    pub points_considered: u64,
    /// Points inside at least one canton.
    pub points_matched: u64,
    /// Points outside every canton (not counted anywhere).
    pub points_unmatched: u64,
    /// Points inside more than one canton (counted once per canton).
    pub points_multi_matched: u64,
    /// Selected records skipped because they had no location.
    pub records_without_location: u64,
}
