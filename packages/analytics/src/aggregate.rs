//! Point-in-polygon occurrence counting per canton.

use std::collections::BTreeMap;

use species_map_geography_models::{AggregationReport, CantonCount};
use species_map_occurrence_models::OccurrenceRecord;
use species_map_spatial::SpatialIndex;

/// Per-canton counts and the diagnostics gathered while computing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CantonAggregation {
    /// One row per canton in the index, ordered by code.
    pub cantons: Vec<CantonCount>,
    /// Match statistics for the counted records.
    pub report: AggregationReport,
}

impl CantonAggregation {
    /// Sum of all canton counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cantons.iter().map(|c| c.count).sum()
    }
}

/// Counts how many records fall inside each canton.
///
/// Every canton appears in the output, with zero when no point falls inside
/// it. Records without a location are skipped. A point outside every canton
/// is not counted anywhere. A point inside several (overlapping) cantons
/// counts once for each of them and is reported in
/// [`AggregationReport::points_multi_matched`].
pub fn count_by_canton<'a, I>(index: &SpatialIndex, records: I) -> CantonAggregation
where
    I: IntoIterator<Item = &'a OccurrenceRecord>,
{
    let mut counts: BTreeMap<u32, u64> = index.polygons().map(|p| (p.code, 0)).collect();
    let mut report = AggregationReport::default();

    for record in records {
        let Some((lng, lat)) = record.lng_lat() else {
            report.records_without_location += 1;
            continue;
        };
        report.points_considered += 1;

        let mut matches = 0u64;
        for polygon in index.containing(lng, lat) {
            if let Some(count) = counts.get_mut(&polygon.code) {
                *count += 1;
            }
            matches += 1;
        }

        match matches {
            0 => report.points_unmatched += 1,
            1 => report.points_matched += 1,
            _ => {
                report.points_matched += 1;
                report.points_multi_matched += 1;
            }
        }
    }

    if report.points_unmatched > 0 {
        log::warn!(
            "{} of {} points fall outside every canton and were not counted",
            report.points_unmatched,
            report.points_considered
        );
    }
    if report.points_multi_matched > 0 {
        log::warn!(
            "{} points fall inside more than one canton and were counted in each",
            report.points_multi_matched
        );
    }

    let cantons = index
        .polygons()
        .map(|p| CantonCount {
            code: p.code,
            canton: p.canton.clone(),
            province: p.province.clone(),
            count: counts.get(&p.code).copied().unwrap_or(0),
        })
        .collect();

    CantonAggregation { cantons, report }
}
