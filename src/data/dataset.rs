//! The three input tables, validated against each other.

use super::{AbundanceMatrix, SampleId, SampleMetadata, TaxonomyTable};
use crate::error::{Result, TranslocationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locations of the three input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPaths {
    /// Tab-delimited vOTU × sample abundance table.
    pub abundance: PathBuf,
    /// Comma-delimited taxonomy table.
    pub taxonomy: PathBuf,
    /// Semicolon-delimited sample metadata.
    pub metadata: PathBuf,
}

impl InputPaths {
    pub fn new<A, T, M>(abundance: A, taxonomy: T, metadata: M) -> Self
    where
        A: AsRef<Path>,
        T: AsRef<Path>,
        M: AsRef<Path>,
    {
        Self {
            abundance: abundance.as_ref().to_path_buf(),
            taxonomy: taxonomy.as_ref().to_path_buf(),
            metadata: metadata.as_ref().to_path_buf(),
        }
    }
}

/// Abundance matrix, taxonomy and metadata whose identifiers join cleanly.
///
/// Every abundance taxon has a taxonomy row, every abundance sample has a
/// metadata row, and every sample identifier follows `<individual>_<F|B>`
/// with a suffix matching its metadata `SampleType`.
#[derive(Debug, Clone)]
pub struct Dataset {
    abundance: AbundanceMatrix,
    taxonomy: TaxonomyTable,
    metadata: SampleMetadata,
}

impl Dataset {
    /// Validate three loaded tables as one dataset.
    pub fn new(
        abundance: AbundanceMatrix,
        taxonomy: TaxonomyTable,
        metadata: SampleMetadata,
    ) -> Result<Self> {
        let missing_taxa: Vec<String> = abundance
            .taxon_ids()
            .iter()
            .filter(|id| !taxonomy.has_taxon(id))
            .cloned()
            .collect();
        if !missing_taxa.is_empty() {
            return Err(TranslocationError::key_mismatch("abundance", "taxonomy", &missing_taxa));
        }

        let missing_samples: Vec<String> = abundance
            .sample_ids()
            .iter()
            .filter(|id| !metadata.has_sample(id))
            .cloned()
            .collect();
        if !missing_samples.is_empty() {
            return Err(TranslocationError::key_mismatch("abundance", "metadata", &missing_samples));
        }

        for sample_id in abundance.sample_ids() {
            let parsed = SampleId::parse(sample_id)?;
            let record = metadata.require(sample_id)?;
            if record.sample_type != parsed.compartment {
                return Err(TranslocationError::InvalidValue {
                    table: "metadata".to_string(),
                    key: sample_id.clone(),
                    column: super::metadata::columns::SAMPLE_TYPE.to_string(),
                    value: format!("{} (identifier suffix says {})", record.sample_type, parsed.compartment),
                });
            }
        }

        debug!(
            unused_taxonomy_rows = taxonomy.len().saturating_sub(abundance.n_taxa()),
            unused_metadata_rows = metadata.n_samples().saturating_sub(abundance.n_samples()),
            "tables joined"
        );

        Ok(Self {
            abundance,
            taxonomy,
            metadata,
        })
    }

    /// Load and validate the three input files.
    pub fn load(paths: &InputPaths) -> Result<Self> {
        let abundance = AbundanceMatrix::from_tsv(&paths.abundance)?;
        let taxonomy = TaxonomyTable::from_csv(&paths.taxonomy)?;
        let metadata = SampleMetadata::from_csv(&paths.metadata)?;
        info!(
            taxa = abundance.n_taxa(),
            samples = abundance.n_samples(),
            "loaded abundance table"
        );
        Self::new(abundance, taxonomy, metadata)
    }

    pub fn abundance(&self) -> &AbundanceMatrix {
        &self.abundance
    }

    pub fn taxonomy(&self) -> &TaxonomyTable {
        &self.taxonomy
    }

    pub fn metadata(&self) -> &SampleMetadata {
        &self.metadata
    }
}
