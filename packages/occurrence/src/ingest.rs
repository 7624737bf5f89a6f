//! Tab-separated occurrence file loader.
//!
//! The header row is validated against [`OccurrenceField::REQUIRED`] plus
//! the configured record id column before any data row is read. Rows
//! without a species are dropped; a single unparseable event date fails
//! the whole load.

use std::path::Path;
use std::sync::Arc;

use species_map_occurrence_models::{
    DEFAULT_RECORD_ID_COLUMN, OccurrenceField, OccurrenceRecord, OccurrenceSet,
};

use crate::IngestError;
use crate::parsing::{EventDate, non_empty, parse_event_date, parse_point};
use crate::progress::ProgressCallback;

/// How often (in rows) the byte position is reported to the progress bar.
const PROGRESS_INTERVAL: u64 = 5_000;

/// Options controlling how an occurrence upload is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Field delimiter byte. Darwin Core archives use tabs.
    pub delimiter: u8,
    /// Header of the unique record identifier column.
    pub record_id_column: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            record_id_column: DEFAULT_RECORD_ID_COLUMN.to_owned(),
        }
    }
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    species: usize,
    longitude: usize,
    latitude: usize,
    event_date: usize,
    state_province: usize,
    locality: usize,
    record_id: usize,
}

impl ColumnIndex {
    /// Resolves every required column at once so a malformed header is
    /// reported with the complete list of what is missing.
    fn resolve(headers: &csv::StringRecord, record_id_column: &str) -> Result<Self, IngestError> {
        let names: Vec<&str> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if i == 0 { h.trim_start_matches('\u{feff}') } else { h }
            })
            .collect();

        let position = |name: &str| names.iter().position(|h| *h == name);

        let mut missing = Vec::new();
        let mut lookup = |name: &str| {
            position(name).unwrap_or_else(|| {
                missing.push(name.to_owned());
                usize::MAX
            })
        };

        let index = Self {
            species: lookup(OccurrenceField::Species.as_ref()),
            longitude: lookup(OccurrenceField::DecimalLongitude.as_ref()),
            latitude: lookup(OccurrenceField::DecimalLatitude.as_ref()),
            event_date: lookup(OccurrenceField::EventDate.as_ref()),
            state_province: lookup(OccurrenceField::StateProvince.as_ref()),
            locality: lookup(OccurrenceField::Locality.as_ref()),
            record_id: lookup(record_id_column),
        };

        if missing.is_empty() {
            Ok(index)
        } else {
            Err(IngestError::MissingColumns { missing })
        }
    }
}

/// Parses an uploaded occurrence file.
///
/// # Errors
///
/// * [`IngestError::EmptyInput`] if there is no header row.
/// * [`IngestError::MissingColumns`] if any required column is absent.
/// * [`IngestError::Csv`] if a row is malformed (e.g. wrong field count).
/// * [`IngestError::InvalidDate`] if any surviving row has an unparseable
///   `eventDate`.
pub fn read_occurrences(
    upload: &[u8],
    options: &IngestOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<OccurrenceSet, IngestError> {
    progress.set_total(upload.len() as u64);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .from_reader(upload);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestError::EmptyInput);
    }
    let columns = ColumnIndex::resolve(&headers, &options.record_id_column)?;
    progress.set_message("Parsing occurrence rows".to_owned());

    let mut set = OccurrenceSet::default();
    let mut row = csv::StringRecord::new();

    while reader.read_record(&mut row)? {
        set.rows_read += 1;
        if set.rows_read % PROGRESS_INTERVAL == 0 {
            progress.set_position(reader.position().byte());
            progress.set_message(format!("Parsed {} rows", set.rows_read));
        }

        let field = |i: usize| row.get(i).unwrap_or("");

        let Some(species) = non_empty(field(columns.species)) else {
            set.dropped_without_species += 1;
            continue;
        };

        let record_id = field(columns.record_id).trim().to_owned();

        let raw_date = field(columns.event_date);
        let event_date = match parse_event_date(raw_date) {
            EventDate::Date(date) => Some(date),
            EventDate::Missing => None,
            EventDate::Invalid => {
                return Err(IngestError::InvalidDate {
                    record_id,
                    value: raw_date.to_owned(),
                });
            }
        };

        let location = parse_point(field(columns.longitude), field(columns.latitude));
        if location.is_none() {
            set.without_location += 1;
        }

        set.records.push(OccurrenceRecord {
            record_id,
            species,
            event_date,
            location,
            state_province: non_empty(field(columns.state_province)),
            locality: non_empty(field(columns.locality)),
        });
    }

    if set.dropped_without_species > 0 {
        log::info!(
            "Dropped {} of {} rows with no species",
            set.dropped_without_species,
            set.rows_read
        );
    }
    if set.without_location > 0 {
        log::warn!(
            "{} records have missing or invalid coordinates and will not be mapped",
            set.without_location
        );
    }
    log::info!("Loaded {} occurrence records", set.records.len());

    progress.set_position(upload.len() as u64);
    progress.finish(format!("Loaded {} occurrence records", set.records.len()));

    Ok(set)
}

/// Reads an occurrence file from disk and parses it.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read, otherwise the
/// same errors as [`read_occurrences`].
pub fn load_occurrences(
    path: &Path,
    options: &IngestOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<OccurrenceSet, IngestError> {
    let upload = std::fs::read(path)?;
    log::debug!("Read {} bytes from {}", upload.len(), path.display());
    read_occurrences(&upload, options, progress)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::progress::null_progress;

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<String>>,
        total: Mutex<Option<u64>>,
        position: Mutex<u64>,
    }

    impl ProgressCallback for Recorder {
        fn set_total(&self, total: u64) {
            *self.total.lock().unwrap() = Some(total);
        }
        fn set_position(&self, pos: u64) {
            *self.position.lock().unwrap() = pos;
        }
        fn set_message(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
        fn finish(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
    }

    const HEADER: &str = "gbifID\tspecies\tdecimalLongitude\tdecimalLatitude\teventDate\tstateProvince\tlocality";

    fn load(body: &str) -> Result<OccurrenceSet, IngestError> {
        let upload = format!("{HEADER}\n{body}");
        read_occurrences(upload.as_bytes(), &IngestOptions::default(), &null_progress())
    }

    #[test]
    fn loads_valid_rows() {
        let set = load(
            "1\tAteles geoffroyi\t-84.05\t9.93\t2020-05-01\tSan José\tZapote\n\
             2\tAlouatta palliata\t-85.4\t10.6\t2019-11-20T07:15:00\tGuanacaste\t\n",
        )
        .unwrap();

        assert_eq!(set.rows_read, 2);
        assert_eq!(set.len(), 2);
        let first = &set.records[0];
        assert_eq!(first.record_id, "1");
        assert_eq!(first.species, "Ateles geoffroyi");
        assert_eq!(first.state_province.as_deref(), Some("San José"));
        assert_eq!(first.lng_lat(), Some((-84.05, 9.93)));
        assert_eq!(set.records[1].locality, None);
        assert_eq!(
            set.records[1].event_date,
            chrono::NaiveDate::from_ymd_opt(2019, 11, 20)
        );
    }

    #[test]
    fn drops_rows_without_species() {
        let set = load(
            "1\t\t-84.05\t9.93\t2020-05-01\tSan José\tZapote\n\
             2\t  \t-84.05\t9.93\t2020-05-01\tSan José\tZapote\n\
             3\tAteles geoffroyi\t-84.05\t9.93\t2020-05-01\tSan José\tZapote\n",
        )
        .unwrap();

        assert_eq!(set.rows_read, 3);
        assert_eq!(set.dropped_without_species, 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.records[0].record_id, "3");
    }

    #[test]
    fn keeps_records_with_invalid_coordinates_without_location() {
        let set = load(
            "1\tAteles geoffroyi\tNaN\t9.93\t2020-05-01\tSan José\tZapote\n\
             2\tAteles geoffroyi\t\t\t2020-05-01\tSan José\tZapote\n",
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.without_location, 2);
        assert!(set.records.iter().all(|r| r.location.is_none()));
    }

    #[test]
    fn blank_date_is_kept_as_none() {
        let set = load("1\tAteles geoffroyi\t-84.05\t9.93\t\tSan José\tZapote\n").unwrap();
        assert_eq!(set.records[0].event_date, None);
    }

    #[test]
    fn unparseable_date_fails_whole_load() {
        let err = load(
            "1\tAteles geoffroyi\t-84.05\t9.93\t2020-05-01\tSan José\tZapote\n\
             2\tAteles geoffroyi\t-84.05\t9.93\tsometime\tSan José\tZapote\n",
        )
        .unwrap_err();

        match err {
            IngestError::InvalidDate { record_id, value } => {
                assert_eq!(record_id, "2");
                assert_eq!(value, "sometime");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_date_on_row_without_species_is_ignored() {
        let set = load("1\t\t-84.05\t9.93\tsometime\tSan José\tZapote\n").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn reports_all_missing_columns() {
        let upload = "gbifID\tspecies\tdecimalLatitude\n1\tAteles geoffroyi\t9.9\n";
        let err =
            read_occurrences(upload.as_bytes(), &IngestOptions::default(), &null_progress())
                .unwrap_err();

        match err {
            IngestError::MissingColumns { missing } => assert_eq!(
                missing,
                ["decimalLongitude", "eventDate", "stateProvince", "locality"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn comma_delimited_upload_is_rejected() {
        let upload = "gbifID,species,decimalLongitude,decimalLatitude,eventDate,stateProvince,locality\n\
                      1,Ateles geoffroyi,-84.05,9.93,2020-05-01,San José,Zapote\n";
        let err =
            read_occurrences(upload.as_bytes(), &IngestOptions::default(), &null_progress())
                .unwrap_err();
        assert!(matches!(err, IngestError::MissingColumns { missing } if missing.len() == 7));
    }

    #[test]
    fn ragged_row_is_an_error() {
        let err = load("1\tAteles geoffroyi\t-84.05\n").unwrap_err();
        assert!(matches!(err, IngestError::Csv(_)));
    }

    #[test]
    fn empty_upload_is_rejected() {
        let err = read_occurrences(b"", &IngestOptions::default(), &null_progress()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyInput));
    }

    #[test]
    fn honours_custom_record_id_column() {
        let upload = "occurrenceID\tspecies\tdecimalLongitude\tdecimalLatitude\teventDate\tstateProvince\tlocality\n\
                      urn:x:1\tAteles geoffroyi\t-84.05\t9.93\t2020\tSan José\tZapote\n";
        let options = IngestOptions {
            record_id_column: "occurrenceID".to_owned(),
            ..IngestOptions::default()
        };
        let set = read_occurrences(upload.as_bytes(), &options, &null_progress()).unwrap();
        assert_eq!(set.records[0].record_id, "urn:x:1");
    }

    #[test]
    fn ignores_extra_columns_and_byte_order_mark() {
        let upload = "\u{feff}gbifID\tkingdom\tspecies\tdecimalLongitude\tdecimalLatitude\teventDate\tstateProvince\tlocality\n\
                      7\tAnimalia\tAteles geoffroyi\t-84.05\t9.93\t2020-05-01\tSan José\tZapote\n";
        let set =
            read_occurrences(upload.as_bytes(), &IngestOptions::default(), &null_progress())
                .unwrap();
        assert_eq!(set.records[0].record_id, "7");
        assert_eq!(set.records[0].species, "Ateles geoffroyi");
    }

    #[test]
    fn reports_progress_phases() {
        let upload = format!("{HEADER}\n1\tAteles geoffroyi\t-84.05\t9.93\t2020-05-01\tSan José\tZapote\n");
        let recorder = Arc::new(Recorder::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();

        read_occurrences(upload.as_bytes(), &IngestOptions::default(), &progress).unwrap();

        assert_eq!(*recorder.total.lock().unwrap(), Some(upload.len() as u64));
        assert_eq!(*recorder.position.lock().unwrap(), upload.len() as u64);
        assert_eq!(
            *recorder.messages.lock().unwrap(),
            ["Parsing occurrence rows", "Loaded 1 occurrence records"]
        );
    }
}
