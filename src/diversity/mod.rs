//! Alpha diversity of vOTU communities.
//!
//! Shannon entropy uses the natural logarithm; a proportion of exactly zero
//! contributes nothing (the `p ln p → 0` limit).

use crate::data::{Compartment, Disease, SampleId, SampleMetadata};
use crate::error::Result;
use crate::normalize::RelativeAbundance;
use serde::{Deserialize, Serialize};

/// Shannon index: H = -Σ p_i ln(p_i) over p_i > 0.
///
/// `proportions` is expected to sum to 1; zero entries are skipped.
pub fn shannon_index(proportions: &[f64]) -> f64 {
    proportions
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum()
}

/// Number of taxa with non-zero proportion.
pub fn observed_richness(proportions: &[f64]) -> usize {
    proportions.iter().filter(|&&p| p > 0.0).count()
}

/// Diversity of one sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDiversity {
    pub sample_id: String,
    pub individual: String,
    pub compartment: Compartment,
    pub disease: Disease,
    pub shannon: f64,
    pub richness: usize,
}

/// Shannon index and richness of every sample in `rel`.
pub fn sample_diversity(
    rel: &RelativeAbundance,
    metadata: &SampleMetadata,
) -> Result<Vec<SampleDiversity>> {
    rel.sample_ids
        .iter()
        .enumerate()
        .map(|(col, sample_id)| {
            let parsed = SampleId::parse(sample_id)?;
            let record = metadata.require(sample_id)?;
            let proportions = rel.col(col);
            Ok(SampleDiversity {
                sample_id: sample_id.clone(),
                individual: parsed.individual,
                compartment: parsed.compartment,
                disease: record.disease,
                shannon: shannon_index(&proportions),
                richness: observed_richness(&proportions),
            })
        })
        .collect()
}
