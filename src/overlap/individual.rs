//! Per-individual presence sets and their intersection.

use crate::data::{Disease, SampleMetadata};
use crate::error::{Result, TranslocationError};
use crate::filter::SamplePair;
use crate::normalize::RelativeAbundance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Shared taxa as a percentage of a compartment's taxa.
///
/// An empty compartment shares nothing, so `0 / 0` is reported as `0.0`
/// rather than NaN.
pub fn overlap_percent(shared: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        shared as f64 / total as f64 * 100.0
    }
}

/// Taxa with strictly positive proportion in the named sample.
pub fn presence_set(rel: &RelativeAbundance, sample_id: &str) -> Result<BTreeSet<String>> {
    let col = rel.sample_index(sample_id).ok_or_else(|| {
        TranslocationError::key_mismatch("pairing", "relative abundance", &[sample_id.to_string()])
    })?;
    Ok(rel.presence(col))
}

/// Stool/blood overlap of one individual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualOverlap {
    /// Individual identifier.
    pub individual: String,
    /// Disease status.
    pub disease: Disease,
    /// Taxa present in the stool sample.
    pub feces: BTreeSet<String>,
    /// Taxa present in the blood sample.
    pub blood: BTreeSet<String>,
    /// Taxa present in both.
    pub shared: BTreeSet<String>,
    /// Number of taxa in stool.
    pub feces_count: usize,
    /// Number of taxa in blood.
    pub blood_count: usize,
    /// Number of shared taxa.
    pub shared_count: usize,
    /// Shared taxa as a percentage of stool taxa.
    pub percent_of_feces: f64,
    /// Shared taxa as a percentage of blood taxa.
    pub percent_of_blood: f64,
}

impl IndividualOverlap {
    /// Build the record from the two presence sets.
    pub fn new(
        individual: &str,
        disease: Disease,
        feces: BTreeSet<String>,
        blood: BTreeSet<String>,
    ) -> Self {
        let shared: BTreeSet<String> = feces.intersection(&blood).cloned().collect();
        let (feces_count, blood_count, shared_count) = (feces.len(), blood.len(), shared.len());
        Self {
            individual: individual.to_string(),
            disease,
            percent_of_feces: overlap_percent(shared_count, feces_count),
            percent_of_blood: overlap_percent(shared_count, blood_count),
            feces,
            blood,
            shared,
            feces_count,
            blood_count,
            shared_count,
        }
    }
}

/// Compute the stool/blood overlap of every complete pair.
///
/// Disease status is read from metadata; both samples of a pair must carry
/// the same label.
pub fn reconcile_individuals(
    rel: &RelativeAbundance,
    pairs: &[SamplePair],
    metadata: &SampleMetadata,
) -> Result<Vec<IndividualOverlap>> {
    pairs
        .iter()
        .map(|pair| {
            let disease = metadata.require(&pair.stool)?.disease;
            let blood_disease = metadata.require(&pair.blood)?.disease;
            if disease != blood_disease {
                return Err(TranslocationError::InvalidValue {
                    table: "metadata".to_string(),
                    key: pair.blood.clone(),
                    column: crate::data::metadata::columns::DISEASE.to_string(),
                    value: format!("{} (stool sample says {})", blood_disease, disease),
                });
            }

            let overlap = IndividualOverlap::new(
                &pair.individual,
                disease,
                presence_set(rel, &pair.stool)?,
                presence_set(rel, &pair.blood)?,
            );
            debug!(
                individual = %overlap.individual,
                feces = overlap.feces_count,
                blood = overlap.blood_count,
                shared = overlap.shared_count,
                "reconciled individual"
            );
            Ok(overlap)
        })
        .collect()
}
