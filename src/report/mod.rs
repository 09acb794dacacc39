//! Prepared figure tables and their export.
//!
//! A [`TranslocationReport`] holds, in figure order, everything a renderer
//! needs: host phylum composition of all taxa, the stool/blood Venn counts,
//! host phylum and family composition of the shared taxa, per-individual
//! overlap and per-sample Shannon diversity, with the significance tests
//! annotating the two boxplots.

mod export;
mod significance;

pub use export::{
    FIG1_HOST_PHYLUM_ALL, FIG2_VENN, FIG3_HOST_PHYLUM_SHARED, FIG4_FAMILY_SHARED,
    FIG5_INDIVIDUAL_OVERLAP, FIG6_SHANNON, SIGNIFICANCE_TESTS, SUMMARY_JSON,
};
pub use significance::{diversity_tests, overlap_tests, SignificanceTest, TestKind};

use crate::aggregate::CategoryFrequencies;
use crate::diversity::SampleDiversity;
use crate::filter::{Pairing, SampleFilterResult, TaxonFilterResult};
use crate::overlap::{IndividualOverlap, VennCounts};
use serde::{Deserialize, Serialize};

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslocationReport {
    /// Pipeline name from the configuration.
    pub pipeline: String,
    pub sample_filter: SampleFilterResult,
    pub taxon_filter: TaxonFilterResult,
    pub pairing: Pairing,
    /// Figure 1: host phyla of every retained taxon present in any sample.
    pub host_phylum_all: CategoryFrequencies,
    /// Figure 2: stool vs blood overlap over all retained samples.
    pub venn: VennCounts,
    /// Figure 3: host phyla of the taxa found in both compartments.
    pub host_phylum_shared: CategoryFrequencies,
    /// Figure 4: families of the taxa found in both compartments.
    pub family_shared: CategoryFrequencies,
    /// Figure 5: overlap per individual with both samples retained.
    pub individuals: Vec<IndividualOverlap>,
    /// Figure 6: diversity of every retained sample.
    pub diversity: Vec<SampleDiversity>,
    /// Boxplot annotations for figures 5 and 6.
    pub tests: Vec<SignificanceTest>,
}

impl TranslocationReport {
    /// Tests annotating one figure.
    pub fn tests_for(&self, figure: u8) -> impl Iterator<Item = &SignificanceTest> {
        self.tests.iter().filter(move |t| t.figure == figure)
    }
}

impl std::fmt::Display for TranslocationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Translocation Report: {}", self.pipeline)?;
        write!(f, "{}", self.sample_filter)?;
        write!(f, "{}", self.taxon_filter)?;
        writeln!(
            f,
            "  Pairs: {} ({} orphaned samples)",
            self.pairing.n_pairs(),
            self.pairing.orphans.len()
        )?;
        writeln!(
            f,
            "  Venn: {} stool only, {} shared, {} blood only",
            self.venn.stool_only, self.venn.shared, self.venn.blood_only
        )?;
        for test in &self.tests {
            writeln!(
                f,
                "  Fig {} {} [{}] {} vs {}: {} p = {:.4}",
                test.figure,
                test.metric,
                test.scope,
                test.group_a,
                test.group_b,
                test.kind.name(),
                test.result.p_value
            )?;
        }
        Ok(())
    }
}
