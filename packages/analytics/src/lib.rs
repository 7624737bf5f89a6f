#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial aggregation and presentation views for occurrence data.
//!
//! [`aggregate`] joins occurrence points against the canton index and
//! [`province`] rolls the result up one administrative level. The
//! remaining modules turn those counts into the shapes a front end
//! renders: bar series, choropleth and marker layers, and the record
//! table. [`session::Session`] drives the whole pipeline for one upload.

pub mod aggregate;
pub mod charts;
pub mod map;
pub mod province;
pub mod session;
pub mod table;

use thiserror::Error;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The uploaded file could not be loaded.
    #[error(transparent)]
    Ingest(#[from] species_map_occurrence::IngestError),
}
