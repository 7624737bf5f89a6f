//! One upload-and-select cycle, from raw bytes to every derived view.
//!
//! A [`Session`] borrows the static boundary index and holds the options;
//! each call to [`Session::run`] takes an immutable [`SessionRequest`] and
//! returns a fresh [`DashboardView`]. Nothing is cached between calls, so
//! the same request always produces an equal view.

use std::sync::Arc;

use species_map_geography_models::{
    AggregationReport, CantonCount, ProvinceCount, ProvinceMode,
};
use species_map_occurrence::progress::ProgressCallback;
use species_map_occurrence::selection::{default_species, filter_species, species_list};
use species_map_occurrence::{IngestOptions, read_occurrences};
use species_map_occurrence_models::{OccurrenceRecord, OccurrenceSet};
use species_map_spatial::SpatialIndex;

use crate::aggregate::count_by_canton;
use crate::charts::{BarSeries, canton_bars, province_bars};
use crate::map::{ColorScale, Marker, markers};
use crate::province::by_province;
use crate::table::{RecordTable, TableLabels, record_table};
use crate::SessionError;

/// Options fixed for the lifetime of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// How the upload is parsed.
    pub ingest: IngestOptions,
    /// How canton counts roll up to provinces.
    pub province_mode: ProvinceMode,
}

/// The inputs of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRequest<'a> {
    /// Raw bytes of the uploaded occurrence file.
    pub upload: &'a [u8],
    /// Species chosen by the user. `None` selects the first species in
    /// sorted order.
    pub species: Option<&'a str>,
}

/// Everything derived for the selected species.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    /// The selected species.
    pub species: String,
    /// Records of that species, in file order.
    pub records: Vec<OccurrenceRecord>,
    /// Per-canton counts, every canton present.
    pub cantons: Vec<CantonCount>,
    /// Province-level rows, shaped by `province_mode`.
    pub provinces: Vec<ProvinceCount>,
    /// Mode that produced `provinces`.
    pub province_mode: ProvinceMode,
    /// Spatial join diagnostics.
    pub report: AggregationReport,
}

impl SelectionView {
    /// Lazily yields the markers of the selected records that can be
    /// placed on a map.
    pub fn markers(&self) -> impl Iterator<Item = Marker<'_>> {
        markers(&self.records)
    }

    /// Canton bar chart, descending.
    #[must_use]
    pub fn canton_bars(&self) -> BarSeries {
        canton_bars(&self.cantons)
    }

    /// Province bar chart, descending.
    #[must_use]
    pub fn province_bars(&self) -> BarSeries {
        province_bars(&self.provinces)
    }

    /// Record table with the given display labels.
    #[must_use]
    pub fn record_table(&self, labels: &TableLabels) -> RecordTable {
        record_table(&self.records, labels)
    }

    /// A color scale spanning the canton counts.
    #[must_use]
    pub fn canton_scale(&self, classes: usize, ramp: &[String]) -> ColorScale {
        let max = self.cantons.iter().map(|c| c.count).max().unwrap_or(0);
        ColorScale::equal_interval(max, classes, ramp)
    }

    /// A color scale spanning the province rows.
    #[must_use]
    pub fn province_scale(&self, classes: usize, ramp: &[String]) -> ColorScale {
        let max = self.provinces.iter().map(|p| p.count).max().unwrap_or(0);
        ColorScale::equal_interval(max, classes, ramp)
    }
}

/// The result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// All normalized records of the upload.
    pub records: OccurrenceSet,
    /// Distinct species, sorted, for the selection control.
    pub species: Vec<String>,
    /// Views for the selected species; `None` when the upload has no
    /// species at all.
    pub selection: Option<SelectionView>,
}

/// Runs the pipeline against a fixed boundary index.
pub struct Session<'a> {
    boundaries: &'a SpatialIndex,
    options: SessionOptions,
}

impl<'a> Session<'a> {
    /// Creates a session over `boundaries`.
    #[must_use]
    pub const fn new(boundaries: &'a SpatialIndex, options: SessionOptions) -> Self {
        Self {
            boundaries,
            options,
        }
    }

    /// The options this session was created with.
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Parses the upload, picks the species, and computes every view.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Ingest`] if the upload cannot be loaded. An
    /// upload with no species is not an error: the view has no selection.
    pub fn run(
        &self,
        request: &SessionRequest<'_>,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<DashboardView, SessionError> {
        let records = read_occurrences(request.upload, &self.options.ingest, progress)?;
        let species: Vec<String> = species_list(&records)
            .into_iter()
            .map(str::to_owned)
            .collect();

        let chosen = request.species.or_else(|| default_species(&records));
        let selection = match chosen {
            Some(name) => Some(self.select(&records, name)),
            None => {
                log::warn!("Upload contains no species; nothing to select");
                None
            }
        };

        Ok(DashboardView {
            records,
            species,
            selection,
        })
    }

    /// Computes the views for one species of an already-loaded set.
    #[must_use]
    pub fn select(&self, records: &OccurrenceSet, species: &str) -> SelectionView {
        let selected: Vec<OccurrenceRecord> = filter_species(&records.records, species)
            .into_iter()
            .cloned()
            .collect();
        if selected.is_empty() {
            log::warn!("No records for species {species:?}");
        } else {
            log::info!("Selected {} records of {species}", selected.len());
        }

        let aggregation = count_by_canton(self.boundaries, &selected);
        let provinces = by_province(&aggregation.cantons, self.options.province_mode);

        SelectionView {
            species: species.to_owned(),
            records: selected,
            cantons: aggregation.cantons,
            provinces,
            province_mode: self.options.province_mode,
            report: aggregation.report,
        }
    }
}
