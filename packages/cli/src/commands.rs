//! Shared plumbing for the subcommands and the interactive flow.

use std::path::Path;
use std::time::Instant;

use species_map_analytics::charts::BarSeries;
use species_map_analytics::session::{DashboardView, SelectionView, Session, SessionRequest};
use species_map_cli_utils::{IndicatifProgress, MultiProgress};
use species_map_geography_models::AggregationReport;
use species_map_occurrence::load_occurrences;
use species_map_occurrence::selection::species_list;
use species_map_spatial::SpatialIndex;

use crate::config::AppConfig;

/// Loads the canton boundaries named by the config.
///
/// # Errors
///
/// Returns an error if the boundary file cannot be read or is invalid.
pub fn load_boundaries(config: &AppConfig) -> Result<SpatialIndex, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let index = SpatialIndex::load(&config.boundaries.path, &config.boundary_properties())
        .map_err(|e| format!("{}: {e}", config.boundaries.path.display()))?;
    log::info!(
        "Boundaries ready in {:.2}s ({} cantons)",
        start.elapsed().as_secs_f64(),
        index.len()
    );
    Ok(index)
}

/// Reads `file` and runs one pipeline request against `index`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to load.
pub fn run_session(
    config: &AppConfig,
    index: &SpatialIndex,
    multi: &MultiProgress,
    file: &Path,
    species: Option<&str>,
) -> Result<DashboardView, Box<dyn std::error::Error>> {
    let upload = std::fs::read(file).map_err(|e| format!("{}: {e}", file.display()))?;
    let progress = IndicatifProgress::bytes_bar(multi, &format!("Loading {}", file.display()));
    let session = Session::new(index, config.session_options()?);
    Ok(session.run(&SessionRequest { upload: &upload, species }, &progress)?)
}

/// Prints the sorted distinct species of `file`, one per line.
///
/// # Errors
///
/// Returns an error if the file fails to load.
pub fn list_species(
    config: &AppConfig,
    multi: &MultiProgress,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::bytes_bar(multi, &format!("Loading {}", file.display()));
    let records = load_occurrences(file, &config.ingest_options()?, &progress)?;
    let species = species_list(&records);
    if species.is_empty() {
        println!("No species found in {}", file.display());
    }
    for name in species {
        println!("{name}");
    }
    Ok(())
}

/// Prints the bar series and join diagnostics for a selection.
pub fn print_summary(selection: &SelectionView) {
    println!("Species: {} ({} records)", selection.species, selection.records.len());
    println!();
    println!("{}", render_series(&selection.canton_bars()));
    println!(
        "{}",
        render_series(&selection.province_bars()).trim_end()
    );
    println!("  (province mode: {})", selection.province_mode);
    println!();
    println!("{}", render_report(&selection.report));
}

/// Notice printed when an upload has nothing to select.
pub fn print_no_species(file: &Path) {
    println!("No species found in {}; nothing to summarize", file.display());
}

/// Renders a bar series as an aligned two-column text table.
#[must_use]
pub fn render_series(series: &BarSeries) -> String {
    let width = series
        .bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = vec![series.title.clone()];
    lines.extend(
        series
            .bars
            .iter()
            .map(|b| format!("  {:<width$}  {:>8}", b.label, b.count)),
    );
    lines.join("\n") + "\n"
}

/// Renders the spatial join diagnostics.
#[must_use]
pub fn render_report(report: &AggregationReport) -> String {
    [
        ("Points considered", report.points_considered),
        ("Matched a canton", report.points_matched),
        ("Outside every canton", report.points_unmatched),
        ("Matched several cantons", report.points_multi_matched),
        ("Without location", report.records_without_location),
    ]
    .iter()
    .map(|(label, value)| format!("{label:<24}{value:>8}"))
    .collect::<Vec<_>>()
    .join("\n")
}
