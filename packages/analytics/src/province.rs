//! Re-aggregation of canton counts to province level.

use std::collections::BTreeMap;

use species_map_geography_models::{CantonCount, ProvinceCount, ProvinceMode};

/// Groups canton counts by their parent province.
///
/// With [`ProvinceMode::Summed`] the result has one row per province,
/// sorted by name, whose count is the sum over its cantons. With
/// [`ProvinceMode::PerCanton`] each canton row is kept and only relabelled
/// with its province, in the input order.
#[must_use]
pub fn by_province(cantons: &[CantonCount], mode: ProvinceMode) -> Vec<ProvinceCount> {
    match mode {
        ProvinceMode::PerCanton => cantons
            .iter()
            .map(|c| ProvinceCount {
                province: c.province.clone(),
                code: Some(c.code),
                count: c.count,
            })
            .collect(),
        ProvinceMode::Summed => {
            let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
            for canton in cantons {
                *totals.entry(canton.province.as_str()).or_default() += canton.count;
            }
            totals
                .into_iter()
                .map(|(province, count)| ProvinceCount {
                    province: province.to_owned(),
                    code: None,
                    count,
                })
                .collect()
        }
    }
}
