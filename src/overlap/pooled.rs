//! Taxa seen anywhere in stool versus anywhere in blood.

use crate::data::{Compartment, SampleId};
use crate::error::Result;
use crate::normalize::RelativeAbundance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Union of presence sets per compartment over all retained samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompartmentUnion {
    /// Taxa present in at least one stool sample.
    pub stool: BTreeSet<String>,
    /// Taxa present in at least one blood sample.
    pub blood: BTreeSet<String>,
}

/// Region sizes of the two-set Venn diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VennCounts {
    pub stool_only: usize,
    pub blood_only: usize,
    pub shared: usize,
}

impl VennCounts {
    /// Taxa in either compartment.
    pub fn total(&self) -> usize {
        self.stool_only + self.blood_only + self.shared
    }
}

impl CompartmentUnion {
    /// Taxa present in both compartments.
    pub fn shared(&self) -> BTreeSet<String> {
        self.stool.intersection(&self.blood).cloned().collect()
    }

    /// Taxa present in stool but never in blood.
    pub fn stool_only(&self) -> BTreeSet<String> {
        self.stool.difference(&self.blood).cloned().collect()
    }

    /// Taxa present in blood but never in stool.
    pub fn blood_only(&self) -> BTreeSet<String> {
        self.blood.difference(&self.stool).cloned().collect()
    }

    /// Taxa present in either compartment.
    pub fn all(&self) -> BTreeSet<String> {
        self.stool.union(&self.blood).cloned().collect()
    }

    pub fn venn(&self) -> VennCounts {
        let shared = self.stool.intersection(&self.blood).count();
        VennCounts {
            stool_only: self.stool.len() - shared,
            blood_only: self.blood.len() - shared,
            shared,
        }
    }
}

/// Pool the presence sets of every sample by compartment.
///
/// All samples of `rel` contribute, paired or not.
pub fn compartment_union(rel: &RelativeAbundance) -> Result<CompartmentUnion> {
    let mut pooled = CompartmentUnion::default();
    for (col, sample_id) in rel.sample_ids.iter().enumerate() {
        let target = match SampleId::parse(sample_id)?.compartment {
            Compartment::Stool => &mut pooled.stool,
            Compartment::Blood => &mut pooled.blood,
        };
        target.extend(rel.presence(col));
    }
    Ok(pooled)
}
