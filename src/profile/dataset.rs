//! Overview of a loaded dataset before any filtering.

use super::library_size::{profile_library_size, LibrarySizeProfile};
use crate::data::{Compartment, Dataset, Disease};
use crate::error::Result;
use crate::filter::pair_samples;
use serde::{Deserialize, Serialize};

/// Counts describing the three input tables as loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub n_taxa: usize,
    /// Taxa flagged as contaminants.
    pub n_contaminant: usize,
    /// Non-contaminant taxa not flagged viral.
    pub n_non_viral: usize,
    /// Taxa passing both quality flags.
    pub n_viral: usize,
    pub n_stool_samples: usize,
    pub n_blood_samples: usize,
    pub n_healthy_samples: usize,
    pub n_crohns_samples: usize,
    /// Individuals with both a stool and a blood sample.
    pub n_pairs: usize,
    /// Samples whose counterpart is absent.
    pub orphans: Vec<String>,
    /// Fraction of zero cells in the abundance matrix.
    pub sparsity: f64,
    pub library_size: LibrarySizeProfile,
}

impl std::fmt::Display for DatasetProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dataset Profile")?;
        writeln!(f, "  vOTUs:        {}", self.n_taxa)?;
        writeln!(f, "    viral:       {}", self.n_viral)?;
        writeln!(f, "    contaminant: {}", self.n_contaminant)?;
        writeln!(f, "    non-viral:   {}", self.n_non_viral)?;
        writeln!(
            f,
            "  Samples:      {} stool, {} blood",
            self.n_stool_samples, self.n_blood_samples
        )?;
        writeln!(
            f,
            "  Disease:      {} healthy, {} Crohn's",
            self.n_healthy_samples, self.n_crohns_samples
        )?;
        writeln!(f, "  Pairs:        {}", self.n_pairs)?;
        if !self.orphans.is_empty() {
            writeln!(f, "  Orphans:      {}", self.orphans.join(", "))?;
        }
        writeln!(f, "  Sparsity:     {:.2}%", self.sparsity * 100.0)?;
        writeln!(f)?;
        write!(f, "{}", self.library_size)
    }
}

/// Profile a dataset as loaded.
pub fn profile_dataset(dataset: &Dataset) -> Result<DatasetProfile> {
    let abundance = dataset.abundance();
    let taxonomy = dataset.taxonomy();
    let metadata = dataset.metadata();

    let mut n_contaminant = 0;
    let mut n_non_viral = 0;
    for taxon_id in abundance.taxon_ids() {
        if let Some(record) = taxonomy.get(taxon_id) {
            if record.contaminant {
                n_contaminant += 1;
            } else if !record.viral {
                n_non_viral += 1;
            }
        }
    }

    let mut n_stool_samples = 0;
    let mut n_healthy_samples = 0;
    for sample_id in abundance.sample_ids() {
        let record = metadata.require(sample_id)?;
        if record.sample_type == Compartment::Stool {
            n_stool_samples += 1;
        }
        if record.disease == Disease::Healthy {
            n_healthy_samples += 1;
        }
    }

    let n_samples = abundance.n_samples();
    let cells = abundance.n_taxa() * n_samples;
    let pairing = pair_samples(abundance.sample_ids())?;

    Ok(DatasetProfile {
        n_taxa: abundance.n_taxa(),
        n_contaminant,
        n_non_viral,
        n_viral: abundance.n_taxa() - n_contaminant - n_non_viral,
        n_stool_samples,
        n_blood_samples: n_samples - n_stool_samples,
        n_healthy_samples,
        n_crohns_samples: n_samples - n_healthy_samples,
        n_pairs: pairing.n_pairs(),
        orphans: pairing.orphans,
        sparsity: if cells == 0 {
            0.0
        } else {
            (cells - abundance.nnz()) as f64 / cells as f64
        },
        library_size: profile_library_size(abundance),
    })
}
