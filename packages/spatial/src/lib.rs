#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for canton attribution.
//!
//! Loads canton polygons from a `GeoJSON` feature collection, builds an
//! R-tree over their bounding boxes, and answers point-in-polygon queries
//! with an exact containment test on the candidates.
//!
//! Containment follows [`geo::Contains`]: a point lying exactly on a
//! polygon's boundary (edge or vertex) is *not* inside it. A point on the
//! shared edge of two cantons therefore belongs to neither.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use geojson::{Feature, GeoJson, JsonValue};
use rstar::{AABB, RTree, RTreeObject};
use species_map_geography_models::AdminPolygon;

/// Errors that can occur while loading a boundary dataset.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// The boundary file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The top-level object is not a `FeatureCollection`.
    #[error("Boundary file must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A feature lacks one of the configured attribute properties.
    #[error("Feature {index} has no usable {property:?} property")]
    MissingProperty {
        /// Position of the feature in the collection.
        index: usize,
        /// Name of the missing property.
        property: String,
    },

    /// A feature's code property is not a non-negative integer.
    #[error("Feature {index} has invalid code {value}")]
    InvalidCode {
        /// Position of the feature in the collection.
        index: usize,
        /// The raw property value.
        value: String,
    },

    /// A feature's geometry is absent or not a (multi)polygon.
    #[error("Canton {code} has no Polygon or MultiPolygon geometry")]
    UnsupportedGeometry {
        /// Code of the offending canton.
        code: u32,
    },

    /// Two features share the same code.
    #[error("Duplicate canton code {code}")]
    DuplicateCode {
        /// The repeated code.
        code: u32,
    },
}

/// Property names holding canton attributes in the boundary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryProperties {
    /// Numeric canton code (join key).
    pub code: String,
    /// Canton display name.
    pub canton: String,
    /// Province display name.
    pub province: String,
}

impl Default for BoundaryProperties {
    fn default() -> Self {
        Self {
            code: "cod_canton".to_owned(),
            canton: "canton".to_owned(),
            province: "provincia".to_owned(),
        }
    }
}

/// A canton and its geometry.
struct BoundaryEntry {
    polygon: AdminPolygon,
    geometry: MultiPolygon<f64>,
}

/// Bounding box of one entry, stored in the R-tree by position.
struct IndexedEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Canton polygons with an R-tree over their envelopes.
///
/// Entries are kept sorted by code so that iteration order is stable and
/// geometry lookups by code are a binary search.
pub struct SpatialIndex {
    entries: Vec<BoundaryEntry>,
    tree: RTree<IndexedEnvelope>,
}

impl SpatialIndex {
    /// Builds an index from already-parsed cantons.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::DuplicateCode`] if two cantons share a code.
    pub fn from_polygons(
        polygons: Vec<(AdminPolygon, MultiPolygon<f64>)>,
    ) -> Result<Self, BoundaryError> {
        let mut entries: Vec<BoundaryEntry> = polygons
            .into_iter()
            .map(|(polygon, geometry)| BoundaryEntry { polygon, geometry })
            .collect();
        entries.sort_by_key(|e| e.polygon.code);

        if let Some(pair) = entries
            .windows(2)
            .find(|w| w[0].polygon.code == w[1].polygon.code)
        {
            return Err(BoundaryError::DuplicateCode {
                code: pair[0].polygon.code,
            });
        }

        let envelopes = entries
            .iter()
            .enumerate()
            .map(|(index, e)| IndexedEnvelope {
                index,
                envelope: compute_envelope(&e.geometry),
            })
            .collect();

        Ok(Self {
            entries,
            tree: RTree::bulk_load(envelopes),
        })
    }

    /// Parses a `GeoJSON` feature collection of cantons.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a feature collection, a feature
    /// lacks a configured property or (multi)polygon geometry, or codes
    /// repeat.
    pub fn from_reader<R: Read>(
        reader: R,
        properties: &BoundaryProperties,
    ) -> Result<Self, BoundaryError> {
        let parsed = GeoJson::from_reader(reader).map_err(geojson::Error::from)?;
        let GeoJson::FeatureCollection(collection) = parsed else {
            return Err(BoundaryError::NotFeatureCollection);
        };

        let polygons = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| parse_feature(index, feature, properties))
            .collect::<Result<Vec<_>, _>>()?;

        let index = Self::from_polygons(polygons)?;
        log::info!("Loaded {} cantons into spatial index", index.len());
        Ok(index)
    }

    /// Opens and parses a boundary file.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Io`] if the file cannot be opened, otherwise
    /// the same errors as [`Self::from_reader`].
    pub fn load(path: &Path, properties: &BoundaryProperties) -> Result<Self, BoundaryError> {
        log::debug!("Reading boundaries from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), properties)
    }

    /// Number of cantons in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the index holds no cantons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All cantons, ordered by code.
    pub fn polygons(&self) -> impl Iterator<Item = &AdminPolygon> {
        self.entries.iter().map(|e| &e.polygon)
    }

    /// Looks up a canton's attributes by code.
    #[must_use]
    pub fn polygon(&self, code: u32) -> Option<&AdminPolygon> {
        self.entry(code).map(|e| &e.polygon)
    }

    /// Looks up a canton's geometry by code.
    #[must_use]
    pub fn geometry(&self, code: u32) -> Option<&MultiPolygon<f64>> {
        self.entry(code).map(|e| &e.geometry)
    }

    fn entry(&self, code: u32) -> Option<&BoundaryEntry> {
        self.entries
            .binary_search_by_key(&code, |e| e.polygon.code)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Every canton whose interior contains the point.
    ///
    /// Valid boundary data yields at most one canton; overlapping polygons
    /// yield each of them. Non-finite coordinates yield nothing.
    pub fn containing(&self, lng: f64, lat: f64) -> impl Iterator<Item = &AdminPolygon> {
        let finite = lng.is_finite() && lat.is_finite();
        let point = Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(move |_| finite)
            .map(move |candidate| &self.entries[candidate.index])
            .filter(move |entry| entry.geometry.contains(&point))
            .map(|entry| &entry.polygon)
    }

    /// Looks up the canton containing a point.
    ///
    /// Cantons tile the country without overlap, so first match wins.
    #[must_use]
    pub fn lookup_canton(&self, lng: f64, lat: f64) -> Option<&AdminPolygon> {
        self.containing(lng, lat).next()
    }
}

fn parse_feature(
    index: usize,
    feature: Feature,
    properties: &BoundaryProperties,
) -> Result<(AdminPolygon, MultiPolygon<f64>), BoundaryError> {
    let code_value =
        feature
            .property(&properties.code)
            .ok_or_else(|| BoundaryError::MissingProperty {
                index,
                property: properties.code.clone(),
            })?;
    let code = parse_code(code_value).ok_or_else(|| BoundaryError::InvalidCode {
        index,
        value: code_value.to_string(),
    })?;

    let text = |name: &str| {
        feature
            .property(name)
            .and_then(JsonValue::as_str)
            .map(|s| s.trim().to_owned())
            .ok_or_else(|| BoundaryError::MissingProperty {
                index,
                property: name.to_owned(),
            })
    };
    let canton = text(&properties.canton)?;
    let province = text(&properties.province)?;

    let geometry = feature
        .geometry
        .and_then(|g| geo::Geometry::<f64>::try_from(g).ok())
        .and_then(|g| match g {
            geo::Geometry::MultiPolygon(mp) => Some(mp),
            geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
            _ => None,
        })
        .filter(|mp| !mp.0.is_empty())
        .ok_or(BoundaryError::UnsupportedGeometry { code })?;

    Ok((
        AdminPolygon {
            code,
            canton,
            province,
        },
        geometry,
    ))
}

/// Accepts a JSON integer or a string holding one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_code(value: &JsonValue) -> Option<u32> {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}


#[cfg(test)]
mod tests {
    use super::fixtures::{collection, square_feature};
    use super::*;

    fn two_cantons() -> SpatialIndex {
        let json = collection(&[
            square_feature("202", "Escazú", "San José", 10.0, 0.0, 20.0, 10.0),
            square_feature("101", "San José", "San José", 0.0, 0.0, 10.0, 10.0),
        ]);
        SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default()).unwrap()
    }

    #[test]
    fn loads_and_orders_by_code() {
        let index = two_cantons();
        let codes: Vec<u32> = index.polygons().map(|p| p.code).collect();
        assert_eq!(codes, [101, 202]);
        assert_eq!(index.polygon(202).unwrap().canton, "Escazú");
        assert!(index.geometry(101).is_some());
        assert!(index.geometry(303).is_none());
    }

    #[test]
    fn accepts_string_codes() {
        let json = collection(&[square_feature(r#""305""#, "Tarrazú", "San José", 0.0, 0.0, 1.0, 1.0)]);
        let index = SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default()).unwrap();
        assert_eq!(index.polygon(305).unwrap().canton, "Tarrazú");
    }

    #[test]
    fn finds_containing_canton() {
        let index = two_cantons();
        assert_eq!(index.lookup_canton(5.0, 5.0).map(|p| p.code), Some(101));
        assert_eq!(index.lookup_canton(15.0, 5.0).map(|p| p.code), Some(202));
        assert!(index.lookup_canton(25.0, 5.0).is_none());
    }

    #[test]
    fn boundary_points_are_not_contained() {
        let index = two_cantons();
        // Shared edge between 101 and 202.
        assert_eq!(index.containing(10.0, 5.0).count(), 0);
        // Outer edge and corner of 101.
        assert_eq!(index.containing(0.0, 5.0).count(), 0);
        assert_eq!(index.containing(0.0, 0.0).count(), 0);
    }

    #[test]
    fn overlapping_polygons_all_match() {
        let json = collection(&[
            square_feature("1", "A", "P", 0.0, 0.0, 10.0, 10.0),
            square_feature("2", "B", "P", 5.0, 5.0, 15.0, 15.0),
        ]);
        let index = SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default()).unwrap();
        let mut codes: Vec<u32> = index.containing(7.0, 7.0).map(|p| p.code).collect();
        codes.sort_unstable();
        assert_eq!(codes, [1, 2]);
    }

    #[test]
    fn non_finite_points_match_nothing() {
        let index = two_cantons();
        assert_eq!(index.containing(f64::NAN, 5.0).count(), 0);
        assert_eq!(index.containing(5.0, f64::INFINITY).count(), 0);
    }

    #[test]
    fn rejects_duplicate_codes() {
        let json = collection(&[
            square_feature("101", "A", "P", 0.0, 0.0, 1.0, 1.0),
            square_feature("101", "B", "P", 1.0, 0.0, 2.0, 1.0),
        ]);
        let err = SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default())
            .err()
            .unwrap();
        assert!(matches!(err, BoundaryError::DuplicateCode { code: 101 }));
    }

    #[test]
    fn rejects_missing_property() {
        let json = collection(&[square_feature("101", "A", "P", 0.0, 0.0, 1.0, 1.0)]);
        let props = BoundaryProperties {
            province: "province".to_owned(),
            ..BoundaryProperties::default()
        };
        let err = SpatialIndex::from_reader(json.as_bytes(), &props).err().unwrap();
        assert!(
            matches!(err, BoundaryError::MissingProperty { index: 0, ref property } if property == "province")
        );
    }

    #[test]
    fn rejects_invalid_code() {
        let json = collection(&[square_feature(r#""abc""#, "A", "P", 0.0, 0.0, 1.0, 1.0)]);
        let err = SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default())
            .err()
            .unwrap();
        assert!(matches!(err, BoundaryError::InvalidCode { index: 0, .. }));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let json = collection(&[r#"{"type":"Feature","properties":{"cod_canton":7,"canton":"A","provincia":"P"},"geometry":{"type":"Point","coordinates":[0.0,0.0]}}"#.to_string()]);
        let err = SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default())
            .err()
            .unwrap();
        assert!(matches!(err, BoundaryError::UnsupportedGeometry { code: 7 }));
    }

    #[test]
    fn rejects_bare_geometry() {
        let json = r#"{"type":"Point","coordinates":[0.0,0.0]}"#;
        let err = SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default())
            .err()
            .unwrap();
        assert!(matches!(err, BoundaryError::NotFeatureCollection));
    }

    #[test]
    fn rejects_malformed_json() {
        let json = r#"{"type":"FeatureCollection","features":[{"#;
        let err = SpatialIndex::from_reader(json.as_bytes(), &BoundaryProperties::default())
            .err()
            .unwrap();
        assert!(matches!(err, BoundaryError::GeoJson(_)));
    }
}
