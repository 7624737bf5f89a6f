//! Map layers: graduated-color choropleths and point markers.
//!
//! Layers are emitted as `GeoJSON` feature collections. Each choropleth
//! feature carries its count, class index, and fill color so that any
//! web map can render it without recomputing the classification.

use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, feature::Id};
use species_map_geography_models::{CantonCount, ProvinceCount};
use species_map_occurrence_models::OccurrenceRecord;
use species_map_spatial::SpatialIndex;

/// Yellow-orange-red, six classes.
pub const DEFAULT_RAMP: &[&str] = &[
    "#ffffb2", "#fed976", "#feb24c", "#fd8d3c", "#f03b20", "#bd0026",
];

/// A point marker for one located occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker<'a> {
    /// Marker position (x = longitude, y = latitude).
    pub position: Point<f64>,
    /// The record the marker stands for.
    pub record: &'a OccurrenceRecord,
}

impl Marker<'_> {
    /// Popup text: species, province, and date, skipping absent parts.
    #[must_use]
    pub fn label(&self) -> String {
        let date = self.record.event_date.map(|d| d.format("%Y-%m-%d").to_string());
        [
            Some(self.record.species.as_str()),
            self.record.state_province.as_deref(),
            date.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Lazily yields one marker per record that has a finite location.
pub fn markers<'a, I>(records: I) -> impl Iterator<Item = Marker<'a>>
where
    I: IntoIterator<Item = &'a OccurrenceRecord>,
{
    records.into_iter().filter_map(|record| {
        record
            .location
            .filter(|p| p.x().is_finite() && p.y().is_finite())
            .map(|position| Marker { position, record })
    })
}

/// Equal-interval classification of counts onto a color ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    max: u64,
    colors: Vec<String>,
}

/// One legend entry of a [`ColorScale`].
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Inclusive lower bound (exclusive for every class but the first).
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Fill color.
    pub color: String,
}

impl ColorScale {
    /// Splits `[0, max]` into `classes` equal intervals and assigns each a
    /// color sampled evenly from `ramp` (or [`DEFAULT_RAMP`] when `ramp` is
    /// empty).
    #[must_use]
    pub fn equal_interval(max: u64, classes: usize, ramp: &[String]) -> Self {
        let classes = classes.max(1);
        let ramp: Vec<&str> = if ramp.is_empty() {
            DEFAULT_RAMP.to_vec()
        } else {
            ramp.iter().map(String::as_str).collect()
        };

        let colors = (0..classes)
            .map(|i| {
                let pick = if classes == 1 {
                    ramp.len() - 1
                } else {
                    i * (ramp.len() - 1) / (classes - 1)
                };
                ramp[pick].to_owned()
            })
            .collect();

        Self { max, colors }
    }

    /// Number of classes.
    #[must_use]
    pub fn classes(&self) -> usize {
        self.colors.len()
    }

    /// Class index of a count. Zero is always class 0 and `max` is always
    /// the top class.
    #[must_use]
    pub fn class_of(&self, count: u64) -> usize {
        if self.max == 0 {
            return 0;
        }
        let classes = self.classes();
        let scaled = (u128::from(count) * classes as u128).div_ceil(u128::from(self.max));
        usize::try_from(scaled)
            .unwrap_or(usize::MAX)
            .saturating_sub(1)
            .min(classes - 1)
    }

    /// Fill color of a count.
    #[must_use]
    pub fn color_of(&self, count: u64) -> &str {
        &self.colors[self.class_of(count)]
    }

    /// Bounds and color of every class.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn legend(&self) -> Vec<LegendEntry> {
        let step = self.max as f64 / self.classes() as f64;
        self.colors
            .iter()
            .enumerate()
            .map(|(i, color)| LegendEntry {
                min: step * i as f64,
                max: step * (i + 1) as f64,
                color: color.clone(),
            })
            .collect()
    }
}

fn object(value: JsonValue) -> Option<JsonObject> {
    match value {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Canton layer keyed by canton code.
///
/// Cantons missing from `index` are skipped.
#[must_use]
pub fn canton_choropleth(
    index: &SpatialIndex,
    cantons: &[CantonCount],
    scale: &ColorScale,
) -> FeatureCollection {
    let features = cantons
        .iter()
        .filter_map(|c| {
            let geometry = index.geometry(c.code)?;
            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(geometry))),
                id: Some(Id::Number(c.code.into())),
                properties: object(serde_json::json!({
                    "code": c.code,
                    "canton": c.canton,
                    "province": c.province,
                    "count": c.count,
                    "class": scale.class_of(c.count),
                    "fill": scale.color_of(c.count),
                })),
                foreign_members: None,
            })
        })
        .collect();

    collection(features)
}

/// Province layer, one feature per canton keyed by canton code.
///
/// Provinces are drawn as their cantons. A summed row colors every canton
/// of its province with the province total; a per-canton row colors only
/// the canton it came from.
#[must_use]
pub fn province_choropleth(
    index: &SpatialIndex,
    provinces: &[ProvinceCount],
    scale: &ColorScale,
) -> FeatureCollection {
    let features = provinces
        .iter()
        .flat_map(move |row| {
            index
                .polygons()
                .filter(move |p| match row.code {
                    Some(code) => p.code == code,
                    None => p.province == row.province,
                })
                .filter_map(move |p| {
                    let geometry = index.geometry(p.code)?;
                    Some(Feature {
                        bbox: None,
                        geometry: Some(Geometry::new(geojson::Value::from(geometry))),
                        id: Some(Id::Number(p.code.into())),
                        properties: object(serde_json::json!({
                            "province": row.province,
                            "code": p.code,
                            "count": row.count,
                            "class": scale.class_of(row.count),
                            "fill": scale.color_of(row.count),
                        })),
                        foreign_members: None,
                    })
                })
        })
        .collect();

    collection(features)
}

/// Point layer with one feature per marker, for client-side clustering.
pub fn marker_layer<'a, I>(markers: I) -> FeatureCollection
where
    I: IntoIterator<Item = Marker<'a>>,
{
    let features = markers
        .into_iter()
        .map(|m| Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::Point(vec![
                m.position.x(),
                m.position.y(),
            ]))),
            id: Some(Id::String(m.record.record_id.clone())),
            properties: object(serde_json::json!({
                "label": m.label(),
                "species": m.record.species,
                "province": m.record.state_province,
                "date": m.record.event_date.map(|d| d.format("%Y-%m-%d").to_string()),
            })),
            foreign_members: None,
        })
        .collect();

    collection(features)
}
