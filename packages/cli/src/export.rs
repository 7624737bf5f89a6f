//! Writes the views of one selection to an output directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use species_map_analytics::map::{canton_choropleth, marker_layer, province_choropleth};
use species_map_analytics::session::SelectionView;
use species_map_spatial::SpatialIndex;
use thiserror::Error;

use crate::config::PresentationConfig;

/// Errors that can occur while writing export files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Creating or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the record table failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing a JSON document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the record table, bar series, and map layers into `out`,
/// creating the directory if needed. Returns the paths written.
///
/// # Errors
///
/// Returns an error if any file cannot be created or written.
pub fn write_selection(
    out: &Path,
    selection: &SelectionView,
    index: &SpatialIndex,
    presentation: &PresentationConfig,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(out)?;
    let mut written = Vec::with_capacity(6);

    let path = out.join("records.tsv");
    selection
        .record_table(&presentation.labels)
        .write_tsv(BufWriter::new(File::create(&path)?))?;
    written.push(path);

    written.push(write_json(out, "cantons.json", &selection.canton_bars())?);
    written.push(write_json(out, "provinces.json", &selection.province_bars())?);

    let classes = presentation.choropleth_classes;
    let ramp = &presentation.color_ramp;
    written.push(write_json(
        out,
        "cantons.geojson",
        &canton_choropleth(
            index,
            &selection.cantons,
            &selection.canton_scale(classes, ramp),
        ),
    )?);
    written.push(write_json(
        out,
        "provinces.geojson",
        &province_choropleth(
            index,
            &selection.provinces,
            &selection.province_scale(classes, ramp),
        ),
    )?);
    written.push(write_json(
        out,
        "markers.geojson",
        &marker_layer(selection.markers()),
    )?);

    for path in &written {
        log::debug!("Wrote {}", path.display());
    }
    log::info!(
        "Exported {} files for {} to {}",
        written.len(),
        selection.species,
        out.display()
    );

    Ok(written)
}

fn write_json<T: Serialize>(out: &Path, name: &str, value: &T) -> Result<PathBuf, ExportError> {
    let path = out.join(name);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(path)
}
