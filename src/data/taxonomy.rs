//! vOTU taxonomic and quality-control annotations.

use super::table::{is_missing, KeyedTable};
use crate::error::{Result, TranslocationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column names required in the taxonomy table.
pub mod columns {
    pub const CONTAMINANT: &str = "Contaminant";
    pub const VIRAL: &str = "Viral";
    pub const FAMILY: &str = "Family";
    pub const HOST_PHYLUM: &str = "HostPhylum";
}

/// Annotations of a single vOTU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRecord {
    /// Flagged as a contaminant by QC.
    pub contaminant: bool,
    /// Classified as viral.
    pub viral: bool,
    /// Viral family, if assigned.
    pub family: Option<String>,
    /// Predicted bacterial host phylum, if assigned.
    pub host_phylum: Option<String>,
}

impl TaxonRecord {
    /// Viral and not a contaminant.
    pub fn passes_qc(&self) -> bool {
        self.viral && !self.contaminant
    }
}

/// Categorical annotation columns usable for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Annotation {
    /// Predicted host phylum.
    HostPhylum,
    /// Viral family.
    Family,
}

impl Annotation {
    /// Column name in the taxonomy table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::HostPhylum => columns::HOST_PHYLUM,
            Self::Family => columns::FAMILY,
        }
    }
}

/// Taxonomy table keyed by vOTU identifier.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTable {
    /// Taxon IDs in file order.
    taxon_ids: Vec<String>,
    records: HashMap<String, TaxonRecord>,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" => Some(true),
        "no" | "n" | "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

fn optional_label(raw: &str) -> Option<String> {
    if is_missing(raw) {
        None
    } else {
        Some(raw.trim().to_string())
    }
}

impl TaxonomyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Fails on a duplicate identifier.
    pub fn insert(&mut self, taxon_id: &str, record: TaxonRecord) -> Result<()> {
        if self.records.contains_key(taxon_id) {
            return Err(TranslocationError::DuplicateKey {
                table: "taxonomy".to_string(),
                key: taxon_id.to_string(),
            });
        }
        self.taxon_ids.push(taxon_id.to_string());
        self.records.insert(taxon_id.to_string(), record);
        Ok(())
    }

    /// Load the taxonomy from a comma-delimited file.
    ///
    /// Required columns: `Contaminant` and `Viral` (Yes/No), `Family` and
    /// `HostPhylum` (strings, NA allowed). Extra columns are ignored.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load the taxonomy from comma-delimited text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let table = KeyedTable::from_reader(reader, b',', "taxonomy")?;
        let contaminant_col = table.require_column(columns::CONTAMINANT)?;
        let viral_col = table.require_column(columns::VIRAL)?;
        let family_col = table.require_column(columns::FAMILY)?;
        let host_col = table.require_column(columns::HOST_PHYLUM)?;

        let mut taxonomy = Self::new();
        for (taxon_id, values) in &table.rows {
            let flag = |col: usize, name: &str| -> Result<bool> {
                let raw = values.get(col).map(String::as_str).unwrap_or("");
                parse_flag(raw).ok_or_else(|| TranslocationError::InvalidValue {
                    table: "taxonomy".to_string(),
                    key: taxon_id.clone(),
                    column: name.to_string(),
                    value: raw.to_string(),
                })
            };
            let label = |col: usize| values.get(col).and_then(|raw| optional_label(raw));

            let record = TaxonRecord {
                contaminant: flag(contaminant_col, columns::CONTAMINANT)?,
                viral: flag(viral_col, columns::VIRAL)?,
                family: label(family_col),
                host_phylum: label(host_col),
            };
            taxonomy.insert(taxon_id, record)?;
        }

        Ok(taxonomy)
    }

    /// Taxon IDs in order.
    pub fn taxon_ids(&self) -> &[String] {
        &self.taxon_ids
    }

    /// Number of taxa.
    pub fn len(&self) -> usize {
        self.taxon_ids.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.taxon_ids.is_empty()
    }

    /// Get the record of a taxon.
    pub fn get(&self, taxon_id: &str) -> Option<&TaxonRecord> {
        self.records.get(taxon_id)
    }

    /// Check if a taxon exists.
    pub fn has_taxon(&self, taxon_id: &str) -> bool {
        self.records.contains_key(taxon_id)
    }

    /// Annotation value of a taxon; `None` when the annotation is missing.
    pub fn annotation(&self, taxon_id: &str, annotation: Annotation) -> Option<&str> {
        let record = self.records.get(taxon_id)?;
        match annotation {
            Annotation::HostPhylum => record.host_phylum.as_deref(),
            Annotation::Family => record.family.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAXONOMY: &str = "\
\"\",\"Contaminant\",\"Viral\",\"Family\",\"HostPhylum\",\"Length\"
\"vOTU_1\",\"No\",\"Yes\",\"Microviridae\",\"Bacteroidota\",5400
\"vOTU_2\",\"Yes\",\"Yes\",\"Siphoviridae\",NA,41000
\"vOTU_3\",\"No\",\"No\",NA,\"Bacillota\",12000
";

    #[test]
    fn test_load_taxonomy() {
        let taxonomy = TaxonomyTable::from_reader(TAXONOMY.as_bytes()).unwrap();
        assert_eq!(taxonomy.len(), 3);
        assert_eq!(taxonomy.taxon_ids(), &["vOTU_1", "vOTU_2", "vOTU_3"]);

        let first = taxonomy.get("vOTU_1").unwrap();
        assert!(first.passes_qc());
        assert_eq!(first.family.as_deref(), Some("Microviridae"));

        let second = taxonomy.get("vOTU_2").unwrap();
        assert!(second.contaminant);
        assert_eq!(second.host_phylum, None);

        assert!(!taxonomy.get("vOTU_3").unwrap().passes_qc());
    }

    #[test]
    fn test_annotation_lookup() {
        let taxonomy = TaxonomyTable::from_reader(TAXONOMY.as_bytes()).unwrap();
        assert_eq!(taxonomy.annotation("vOTU_3", Annotation::HostPhylum), Some("Bacillota"));
        assert_eq!(taxonomy.annotation("vOTU_3", Annotation::Family), None);
        assert_eq!(taxonomy.annotation("missing", Annotation::Family), None);
    }

    #[test]
    fn test_missing_required_column() {
        let text = "id,Contaminant,Viral,Family\nvOTU_1,No,Yes,Microviridae\n";
        let err = TaxonomyTable::from_reader(text.as_bytes()).unwrap_err();
        match err {
            TranslocationError::Schema { column, .. } => assert_eq!(column, "HostPhylum"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_flag_is_invalid() {
        let text = "id,Contaminant,Viral,Family,HostPhylum\nvOTU_1,NA,Yes,Microviridae,NA\n";
        let err = TaxonomyTable::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, TranslocationError::InvalidValue { .. }));
    }
}
