//! TOML configuration for the species map CLI.
//!
//! Every field has a default, so an absent config file and an empty one
//! behave the same. Command-line flags are applied on top in `main`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use species_map_analytics::map::DEFAULT_RAMP;
use species_map_analytics::session::SessionOptions;
use species_map_analytics::table::TableLabels;
use species_map_geography_models::ProvinceMode;
use species_map_occurrence::IngestOptions;
use species_map_spatial::BoundaryProperties;
use thiserror::Error;

/// Errors raised while loading or applying the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The delimiter is not a single-byte character.
    #[error("Delimiter {0:?} must be a single ASCII character")]
    InvalidDelimiter(char),
}

/// Full application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `[boundaries]`: canton polygon source.
    pub boundaries: BoundariesConfig,
    /// `[occurrences]`: upload parsing.
    pub occurrences: OccurrencesConfig,
    /// `[aggregation]`: province roll-up.
    pub aggregation: AggregationConfig,
    /// `[presentation]`: maps and tables.
    pub presentation: PresentationConfig,
}

/// Where the canton polygons live and which properties describe them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundariesConfig {
    /// Canton `GeoJSON` feature collection.
    pub path: PathBuf,
    /// Feature property holding the numeric canton code.
    pub code_property: String,
    /// Feature property holding the canton name.
    pub canton_property: String,
    /// Feature property holding the province name.
    pub province_property: String,
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        let properties = BoundaryProperties::default();
        Self {
            path: PathBuf::from("datos/Cantones.geojson"),
            code_property: properties.code,
            canton_property: properties.canton,
            province_property: properties.province,
        }
    }
}

/// How occurrence uploads are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OccurrencesConfig {
    /// Header of the unique record identifier column.
    pub record_id_column: String,
    /// Field delimiter; must be a single ASCII character.
    pub delimiter: char,
}

impl Default for OccurrencesConfig {
    fn default() -> Self {
        let ingest = IngestOptions::default();
        Self {
            record_id_column: ingest.record_id_column,
            delimiter: char::from(ingest.delimiter),
        }
    }
}

/// How canton counts roll up to provinces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    /// `summed` or `per_canton`.
    pub province_mode: ProvinceMode,
}

/// Rendering options for maps and tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresentationConfig {
    /// Number of graduated color classes in choropleths.
    pub choropleth_classes: usize,
    /// Hex colors sampled for the classes, lightest first.
    pub color_ramp: Vec<String>,
    /// Record table headings.
    pub labels: TableLabels,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            choropleth_classes: 6,
            color_ramp: DEFAULT_RAMP.iter().map(|c| (*c).to_owned()).collect(),
            labels: TableLabels::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Loads the config at `path`, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::debug!("No config file given, using defaults");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Property names used to read the boundary file.
    #[must_use]
    pub fn boundary_properties(&self) -> BoundaryProperties {
        BoundaryProperties {
            code: self.boundaries.code_property.clone(),
            canton: self.boundaries.canton_property.clone(),
            province: self.boundaries.province_property.clone(),
        }
    }

    /// Options for ingestion alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDelimiter`] for a non-ASCII delimiter.
    pub fn ingest_options(&self) -> Result<IngestOptions, ConfigError> {
        let delimiter = self.occurrences.delimiter;
        let delimiter = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::InvalidDelimiter(delimiter))?;
        Ok(IngestOptions {
            delimiter,
            record_id_column: self.occurrences.record_id_column.clone(),
        })
    }

    /// Options for a full pipeline run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDelimiter`] for a non-ASCII delimiter.
    pub fn session_options(&self) -> Result<SessionOptions, ConfigError> {
        Ok(SessionOptions {
            ingest: self.ingest_options()?,
            province_mode: self.aggregation.province_mode,
        })
    }
}
