//! Sample exclusion and stool/blood pairing.

use crate::data::{AbundanceMatrix, Compartment, SampleId};
use crate::error::{Result, TranslocationError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

/// Result of removing the configured low-depth samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleFilterResult {
    /// Number of samples before filtering.
    pub n_before: usize,
    /// Number of samples after filtering.
    pub n_after: usize,
    /// IDs of removed samples, in matrix order.
    pub removed_samples: Vec<String>,
    /// Exclusions that named no sample in the matrix.
    pub unknown_exclusions: Vec<String>,
}

impl std::fmt::Display for SampleFilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sample Exclusion Result")?;
        writeln!(f, "  Samples before:  {}", self.n_before)?;
        writeln!(f, "  Samples after:   {}", self.n_after)?;
        writeln!(f, "  Samples removed: {}", self.removed_samples.len())?;
        if !self.removed_samples.is_empty() {
            writeln!(f, "  Removed: {:?}", self.removed_samples)?;
        }
        if !self.unknown_exclusions.is_empty() {
            writeln!(f, "  Not found: {:?}", self.unknown_exclusions)?;
        }
        Ok(())
    }
}

/// Remove the listed samples (low sequencing depth, decided upstream by QC).
///
/// Exclusions that do not name a sample in the matrix are reported and
/// otherwise ignored.
pub fn exclude_samples(
    abundance: &AbundanceMatrix,
    exclusions: &[String],
) -> Result<(AbundanceMatrix, SampleFilterResult)> {
    let excluded: HashSet<&str> = exclusions.iter().map(String::as_str).collect();

    let unknown_exclusions: Vec<String> = exclusions
        .iter()
        .filter(|id| abundance.sample_index(id).is_none())
        .cloned()
        .collect();
    for id in &unknown_exclusions {
        warn!(sample = %id, "excluded sample is not in the abundance table");
    }

    let (keep, removed): (Vec<usize>, Vec<usize>) =
        (0..abundance.n_samples()).partition(|&i| !excluded.contains(abundance.sample_ids()[i].as_str()));

    if keep.is_empty() {
        return Err(TranslocationError::EmptyData(
            "every sample was excluded".to_string(),
        ));
    }

    let filtered = abundance.subset_samples(&keep)?;
    let result = SampleFilterResult {
        n_before: abundance.n_samples(),
        n_after: filtered.n_samples(),
        removed_samples: removed
            .iter()
            .map(|&i| abundance.sample_ids()[i].clone())
            .collect(),
        unknown_exclusions,
    };
    info!(
        before = result.n_before,
        after = result.n_after,
        "excluded low-depth samples"
    );

    Ok((filtered, result))
}

/// The stool and blood sample of one individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePair {
    pub individual: String,
    pub stool: String,
    pub blood: String,
}

/// Samples grouped by individual.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pairing {
    /// Individuals with both samples retained, ordered by individual ID.
    pub pairs: Vec<SamplePair>,
    /// Samples whose counterpart is absent, in input order.
    pub orphans: Vec<String>,
}

impl Pairing {
    /// Number of complete pairs.
    pub fn n_pairs(&self) -> usize {
        self.pairs.len()
    }
}

/// Group samples by individual, dropping any sample whose counterpart is missing.
pub fn pair_samples(sample_ids: &[String]) -> Result<Pairing> {
    let mut by_individual: BTreeMap<String, (Option<String>, Option<String>)> = BTreeMap::new();

    for raw in sample_ids {
        let parsed = SampleId::parse(raw)?;
        let slot = by_individual.entry(parsed.individual).or_default();
        let target = match parsed.compartment {
            Compartment::Stool => &mut slot.0,
            Compartment::Blood => &mut slot.1,
        };
        if target.replace(raw.clone()).is_some() {
            return Err(TranslocationError::DuplicateKey {
                table: "abundance".to_string(),
                key: raw.clone(),
            });
        }
    }

    let mut pairing = Pairing::default();
    let mut orphaned: HashSet<String> = HashSet::new();
    for (individual, slot) in by_individual {
        match slot {
            (Some(stool), Some(blood)) => pairing.pairs.push(SamplePair {
                individual,
                stool,
                blood,
            }),
            (Some(single), None) | (None, Some(single)) => {
                orphaned.insert(single);
            }
            (None, None) => {}
        }
    }
    pairing.orphans = sample_ids
        .iter()
        .filter(|id| orphaned.contains(*id))
        .cloned()
        .collect();

    info!(
        pairs = pairing.n_pairs(),
        orphans = pairing.orphans.len(),
        "paired stool and blood samples"
    );
    Ok(pairing)
}
