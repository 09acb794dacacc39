//! Sample metadata: disease status and sample type per sample.

use super::sample_id::Compartment;
use super::table::KeyedTable;
use crate::error::{Result, TranslocationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column names required in the metadata table.
pub mod columns {
    pub const DISEASE: &str = "Disease";
    pub const SAMPLE_TYPE: &str = "SampleType";
}

/// Disease status of the individual a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Disease {
    /// Healthy control.
    Healthy,
    /// Crohn's disease.
    Crohns,
}

impl Disease {
    /// Parse a metadata label.
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "healthy" | "control" | "hc" | "h" | "non-ibd" | "nonibd" => Some(Self::Healthy),
            "cd" | "crohn" | "crohns" | "crohn's" | "crohn's disease" | "crohns disease" => {
                Some(Self::Crohns)
            }
            _ => None,
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Crohns => "Crohn's",
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub disease: Disease,
    pub sample_type: Compartment,
}

/// Sample metadata keyed by sample identifier.
#[derive(Debug, Clone, Default)]
pub struct SampleMetadata {
    /// Sample IDs in order.
    sample_ids: Vec<String>,
    data: HashMap<String, SampleRecord>,
}

impl SampleMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample. Fails on a duplicate identifier.
    pub fn insert(&mut self, sample_id: &str, record: SampleRecord) -> Result<()> {
        if self.data.contains_key(sample_id) {
            return Err(TranslocationError::DuplicateKey {
                table: "metadata".to_string(),
                key: sample_id.to_string(),
            });
        }
        self.sample_ids.push(sample_id.to_string());
        self.data.insert(sample_id.to_string(), record);
        Ok(())
    }

    /// Load metadata from a semicolon-delimited file.
    ///
    /// Required columns: `Disease` and `SampleType`. Extra columns are ignored.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load metadata from semicolon-delimited text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let table = KeyedTable::from_reader(reader, b';', "metadata")?;
        let disease_col = table.require_column(columns::DISEASE)?;
        let type_col = table.require_column(columns::SAMPLE_TYPE)?;

        let mut metadata = Self::new();
        for (sample_id, values) in &table.rows {
            let invalid = |column: &str, raw: &str| TranslocationError::InvalidValue {
                table: "metadata".to_string(),
                key: sample_id.clone(),
                column: column.to_string(),
                value: raw.to_string(),
            };

            let raw_disease = values.get(disease_col).map(String::as_str).unwrap_or("");
            let disease =
                Disease::parse(raw_disease).ok_or_else(|| invalid(columns::DISEASE, raw_disease))?;

            let raw_type = values.get(type_col).map(String::as_str).unwrap_or("");
            let sample_type = Compartment::from_sample_type(raw_type)
                .ok_or_else(|| invalid(columns::SAMPLE_TYPE, raw_type))?;

            metadata.insert(
                sample_id,
                SampleRecord {
                    disease,
                    sample_type,
                },
            )?;
        }

        Ok(metadata)
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Get the record of a sample.
    pub fn get(&self, sample_id: &str) -> Option<&SampleRecord> {
        self.data.get(sample_id)
    }

    /// Get the record of a sample, failing when absent.
    pub fn require(&self, sample_id: &str) -> Result<&SampleRecord> {
        self.get(sample_id).ok_or_else(|| {
            TranslocationError::key_mismatch("abundance", "metadata", &[sample_id.to_string()])
        })
    }

    /// Check if a sample exists.
    pub fn has_sample(&self, sample_id: &str) -> bool {
        self.data.contains_key(sample_id)
    }

}
