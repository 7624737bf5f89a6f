#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Occurrence file ingestion, normalization, and species selection.
//!
//! [`ingest::read_occurrences`] turns a tab-separated Darwin Core upload
//! into an [`OccurrenceSet`](species_map_occurrence_models::OccurrenceSet).
//! The whole file either loads or fails: there is no partial ingestion.
//! [`selection`] then lists the species present and narrows the set to one
//! of them.

pub mod ingest;
pub mod parsing;
pub mod progress;
pub mod selection;

pub use ingest::{IngestOptions, load_occurrences, read_occurrences};

/// Errors that abort loading an occurrence file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file could not be parsed as delimited text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while reading the upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more required columns are absent from the header row.
    ///
    /// A file with the wrong delimiter usually ends up here, since its
    /// whole header collapses into a single column.
    #[error(
        "Missing required column(s): {} (is the file tab-separated?)",
        .missing.join(", ")
    )]
    MissingColumns {
        /// Every required header that was not found.
        missing: Vec<String>,
    },

    /// An event date could not be parsed.
    #[error("Unparseable eventDate {value:?} in record {record_id}")]
    InvalidDate {
        /// Identifier of the offending record.
        record_id: String,
        /// The raw field value.
        value: String,
    },

    /// The upload contained no header row.
    #[error("Occurrence file is empty")]
    EmptyInput,
}
