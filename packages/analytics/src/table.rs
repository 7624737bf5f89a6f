//! Tabular view of the selected records with display labels.

use std::io::Write;

use serde::{Deserialize, Serialize};
use species_map_occurrence_models::OccurrenceRecord;

/// Column headings for the record table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TableLabels {
    /// Heading of the event date column.
    pub date: String,
    /// Heading of the species column.
    pub species: String,
    /// Heading of the province column.
    pub province: String,
    /// Heading of the locality column.
    pub locality: String,
}

impl Default for TableLabels {
    fn default() -> Self {
        Self {
            date: "Fecha".to_owned(),
            species: "Especie".to_owned(),
            province: "Provincia".to_owned(),
            locality: "Localidad".to_owned(),
        }
    }
}

/// Records projected onto date, species, province, and locality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    /// Display headings, in column order.
    pub header: [String; 4],
    /// One row per record; absent values are empty strings.
    pub rows: Vec<[String; 4]>,
}

/// Builds the record table in input order.
pub fn record_table<'a, I>(records: I, labels: &TableLabels) -> RecordTable
where
    I: IntoIterator<Item = &'a OccurrenceRecord>,
{
    let rows = records
        .into_iter()
        .map(|r| {
            [
                r.event_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                r.species.clone(),
                r.state_province.clone().unwrap_or_default(),
                r.locality.clone().unwrap_or_default(),
            ]
        })
        .collect();

    RecordTable {
        header: [
            labels.date.clone(),
            labels.species.clone(),
            labels.province.clone(),
            labels.locality.clone(),
        ],
        rows,
    }
}

impl RecordTable {
    /// Writes the table as tab-separated text with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        out.write_record(&self.header)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record() -> OccurrenceRecord {
        OccurrenceRecord {
            record_id: "1".to_owned(),
            species: "Tapirus bairdii".to_owned(),
            event_date: NaiveDate::from_ymd_opt(2022, 8, 9),
            location: None,
            state_province: Some("Limón".to_owned()),
            locality: None,
        }
    }

    #[test]
    fn projects_records_with_labels() {
        let records = [record()];
        let table = record_table(&records, &TableLabels::default());
        assert_eq!(table.header, ["Fecha", "Especie", "Provincia", "Localidad"]);
        assert_eq!(
            table.rows,
            [[
                "2022-08-09".to_owned(),
                "Tapirus bairdii".to_owned(),
                "Limón".to_owned(),
                String::new(),
            ]]
        );
    }

    #[test]
    fn writes_tab_separated() {
        let records = [record()];
        let labels = TableLabels {
            date: "date".to_owned(),
            species: "species".to_owned(),
            province: "province".to_owned(),
            locality: "locality".to_owned(),
        };
        let mut buf = Vec::new();
        record_table(&records, &labels).write_tsv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date\tspecies\tprovince\tlocality\n2022-08-09\tTapirus bairdii\tLimón\t\n"
        );
    }
}
