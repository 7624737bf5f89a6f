//! Species listing and selection.

use std::collections::BTreeSet;

use species_map_occurrence_models::{OccurrenceRecord, OccurrenceSet};

/// Returns the distinct species in `set`, sorted lexicographically.
#[must_use]
pub fn species_list(set: &OccurrenceSet) -> Vec<&str> {
    set.records
        .iter()
        .map(|r| r.species.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The species a selection control would preselect: the first in sorted
/// order, or `None` when the set holds no species at all.
#[must_use]
pub fn default_species(set: &OccurrenceSet) -> Option<&str> {
    set.records.iter().map(|r| r.species.as_str()).min()
}

/// Keeps the records whose species equals `species` exactly
/// (case-sensitive, no trimming).
pub fn filter_species<'a, I>(records: I, species: &str) -> Vec<&'a OccurrenceRecord>
where
    I: IntoIterator<Item = &'a OccurrenceRecord>,
{
    records
        .into_iter()
        .filter(|r| r.species == species)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, species: &str) -> OccurrenceRecord {
        OccurrenceRecord {
            record_id: id.to_owned(),
            species: species.to_owned(),
            event_date: None,
            location: None,
            state_province: None,
            locality: None,
        }
    }

    fn set(records: Vec<OccurrenceRecord>) -> OccurrenceSet {
        OccurrenceSet {
            records,
            ..OccurrenceSet::default()
        }
    }

    #[test]
    fn lists_distinct_sorted_species() {
        let set = set(vec![
            record("1", "Tapirus bairdii"),
            record("2", "Ateles geoffroyi"),
            record("3", "Tapirus bairdii"),
            record("4", "Alouatta palliata"),
        ]);
        assert_eq!(
            species_list(&set),
            ["Alouatta palliata", "Ateles geoffroyi", "Tapirus bairdii"]
        );
    }

    #[test]
    fn default_is_first_sorted_species() {
        let set = set(vec![record("1", "Tapirus bairdii"), record("2", "Ateles geoffroyi")]);
        assert_eq!(default_species(&set), Some("Ateles geoffroyi"));
    }

    #[test]
    fn empty_set_has_no_species() {
        let set = OccurrenceSet::default();
        assert!(species_list(&set).is_empty());
        assert_eq!(default_species(&set), None);
    }

    #[test]
    fn filter_is_exact_and_case_sensitive() {
        let set = set(vec![
            record("1", "Ateles geoffroyi"),
            record("2", "ateles geoffroyi"),
            record("3", "Ateles geoffroyi "),
            record("4", "Ateles geoffroyi"),
        ]);
        let ids: Vec<&str> = filter_species(&set.records, "Ateles geoffroyi")
            .iter()
            .map(|r| r.record_id.as_str())
            .collect();
        assert_eq!(ids, ["1", "4"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let set = set(vec![
            record("1", "Ateles geoffroyi"),
            record("2", "Tapirus bairdii"),
            record("3", "Ateles geoffroyi"),
        ]);
        let once = filter_species(&set.records, "Ateles geoffroyi");
        let twice = filter_species(once.iter().copied(), "Ateles geoffroyi");
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_species_yields_nothing() {
        let set = set(vec![record("1", "Ateles geoffroyi")]);
        assert!(filter_species(&set.records, "Panthera onca").is_empty());
    }
}
