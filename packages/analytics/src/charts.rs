//! Bar chart series for canton and province counts.

use serde::Serialize;
use species_map_geography_models::{CantonCount, ProvinceCount};

/// One bar of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Axis label shown to the user.
    pub label: String,
    /// Stable key of the underlying row (canton code or province name).
    pub key: String,
    /// Bar height.
    pub count: u64,
}

/// A titled, descending-sorted series of bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarSeries {
    /// Chart title.
    pub title: String,
    /// Bars, highest count first; ties ordered by label then key.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    fn sorted(title: &str, mut bars: Vec<Bar>) -> Self {
        bars.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.key.cmp(&b.key))
        });
        Self {
            title: title.to_owned(),
            bars,
        }
    }
}

/// Occurrences per canton, one bar per canton.
#[must_use]
pub fn canton_bars(cantons: &[CantonCount]) -> BarSeries {
    BarSeries::sorted(
        "Occurrences by canton",
        cantons
            .iter()
            .map(|c| Bar {
                label: c.canton.clone(),
                key: c.code.to_string(),
                count: c.count,
            })
            .collect(),
    )
}

/// Occurrences per province. Rows produced in per-canton mode keep their
/// canton code as key, so repeated province labels stay distinguishable.
#[must_use]
pub fn province_bars(provinces: &[ProvinceCount]) -> BarSeries {
    BarSeries::sorted(
        "Occurrences by province",
        provinces
            .iter()
            .map(|p| Bar {
                label: p.province.clone(),
                key: p
                    .code
                    .map_or_else(|| p.province.clone(), |code| code.to_string()),
                count: p.count,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canton(code: u32, name: &str, count: u64) -> CantonCount {
        CantonCount {
            code,
            canton: name.to_owned(),
            province: "San José".to_owned(),
            count,
        }
    }

    #[test]
    fn canton_bars_sort_descending() {
        let series = canton_bars(&[
            canton(202, "Escazú", 0),
            canton(101, "San José", 3),
            canton(303, "Desamparados", 1),
        ]);
        let keys: Vec<&str> = series.bars.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["101", "303", "202"]);
        assert_eq!(series.bars[0].label, "San José");
    }

    #[test]
    fn ties_break_by_label() {
        let series = canton_bars(&[canton(2, "Mora", 1), canton(1, "Acosta", 1)]);
        let labels: Vec<&str> = series.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Acosta", "Mora"]);
    }

    #[test]
    fn province_bars_key_by_name_or_code() {
        let series = province_bars(&[
            ProvinceCount {
                province: "Limón".to_owned(),
                code: None,
                count: 2,
            },
            ProvinceCount {
                province: "Cartago".to_owned(),
                code: Some(301),
                count: 5,
            },
        ]);
        let keys: Vec<&str> = series.bars.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["301", "Limón"]);
    }
}
