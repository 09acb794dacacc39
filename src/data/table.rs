//! Delimited text tables keyed by their first column.

use crate::error::{Result, TranslocationError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use std::io::Read;

/// Tokens treated as a missing value.
pub(crate) fn is_missing(raw: &str) -> bool {
    matches!(raw.trim(), "" | "NA" | "na" | "NaN" | "nan" | "NULL" | "null")
}

/// A parsed delimited table: header plus identifier-keyed rows of raw strings.
#[derive(Debug, Clone)]
pub(crate) struct KeyedTable {
    /// Table name used in error messages.
    pub name: &'static str,
    /// Column names, excluding the identifier column.
    pub columns: Vec<String>,
    /// Rows as (identifier, values), in file order.
    pub rows: Vec<(String, Vec<String>)>,
}

impl KeyedTable {
    /// Read a table from any reader.
    ///
    /// The first header field names the identifier column and may be empty
    /// (row-name exports write `""` there).
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, name: &'static str) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let header = csv_reader.headers()?.clone();
        if header.len() < 2 {
            return Err(TranslocationError::EmptyData(format!(
                "{} table must have an identifier column and at least one data column",
                name
            )));
        }
        let columns: Vec<String> = header.iter().skip(1).map(String::from).collect();
        let mut seen_columns = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !seen_columns.insert(c.as_str())) {
            return Err(TranslocationError::DuplicateKey {
                table: name.to_string(),
                key: dup.clone(),
            });
        }

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        let mut record = StringRecord::new();
        while csv_reader.read_record(&mut record)? {
            let Some(key) = record.get(0) else {
                continue;
            };
            if key.is_empty() && record.iter().all(str::is_empty) {
                continue;
            }
            if !seen.insert(key.to_string()) {
                return Err(TranslocationError::DuplicateKey {
                    table: name.to_string(),
                    key: key.to_string(),
                });
            }
            let values: Vec<String> = record.iter().skip(1).map(String::from).collect();
            rows.push((key.to_string(), values));
        }

        if rows.is_empty() {
            return Err(TranslocationError::EmptyData(format!("No rows in {} table", name)));
        }

        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    /// Position of a required column among the data columns.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(column))
            .ok_or_else(|| TranslocationError::missing_column(self.name, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_semicolon_table() {
        let text = "sample;Disease;SampleType\nP1_F;Healthy;Stool\nP1_B;Healthy;Plasma\n";
        let table = KeyedTable::from_reader(text.as_bytes(), b';', "metadata").unwrap();
        assert_eq!(table.columns, vec!["Disease", "SampleType"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].0, "P1_B");
        assert_eq!(table.require_column("sampletype").unwrap(), 1);
    }

    #[test]
    fn test_quoted_rowname_header() {
        let text = "\"\",\"Viral\"\n\"vOTU_1\",\"Yes\"\n";
        let table = KeyedTable::from_reader(text.as_bytes(), b',', "taxonomy").unwrap();
        assert_eq!(table.rows[0].0, "vOTU_1");
        assert_eq!(table.rows[0].1, vec!["Yes"]);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let text = "id,Viral\nA,Yes\n";
        let table = KeyedTable::from_reader(text.as_bytes(), b',', "taxonomy").unwrap();
        let err = table.require_column("HostPhylum").unwrap_err();
        assert!(matches!(err, TranslocationError::Schema { .. }));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let text = "id,Viral\nA,Yes\nA,No\n";
        let err = KeyedTable::from_reader(text.as_bytes(), b',', "taxonomy").unwrap_err();
        assert!(matches!(err, TranslocationError::DuplicateKey { .. }));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let text = "vOTU\tP1_F\tP1_B\tP1_F\nA\t1\t2\t3\n";
        let err = KeyedTable::from_reader(text.as_bytes(), b'\t', "abundance").unwrap_err();
        assert!(matches!(err, TranslocationError::DuplicateKey { ref key, .. } if key == "P1_F"));
    }

    #[test]
    fn test_missing_tokens() {
        assert!(is_missing("NA"));
        assert!(is_missing("  "));
        assert!(!is_missing("Bacillota"));
    }
}
