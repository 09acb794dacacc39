//! Pipeline runner executing the translocation stages in order.

use crate::aggregate::{aggregate_taxa, CategoryFrequencies, CategoryOrder, FAMILIES, HOST_PHYLA, UNKNOWN};
use crate::data::{AbundanceMatrix, Annotation, Dataset};
use crate::diversity::{sample_diversity, SampleDiversity};
use crate::error::{Result, TranslocationError};
use crate::filter::{
    exclude_samples, filter_viral_taxa, pair_samples, Pairing, SampleFilterResult,
    TaxonFilterResult,
};
use crate::normalize::{norm_relative, RelativeAbundance};
use crate::overlap::{compartment_union, reconcile_individuals, CompartmentUnion, IndividualOverlap};
use crate::report::{diversity_tests, overlap_tests, SignificanceTest, TranslocationReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A stage of the translocation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Drop the configured low-depth samples.
    ExcludeSamples,
    /// Group the remaining samples into stool/blood pairs.
    PairSamples,
    /// Keep viral, non-contaminant taxa.
    FilterTaxa,
    /// Rescale each sample to proportions.
    Normalize,
    /// Per-individual and pooled stool/blood presence sets.
    Reconcile,
    /// Host phylum and family frequency tables.
    Aggregate,
    /// Shannon diversity per sample.
    Diversity,
    /// Significance tests for the boxplots.
    Compare,
}

impl PipelineStage {
    /// Every stage, in execution order.
    pub const ALL: [PipelineStage; 8] = [
        PipelineStage::ExcludeSamples,
        PipelineStage::PairSamples,
        PipelineStage::FilterTaxa,
        PipelineStage::Normalize,
        PipelineStage::Reconcile,
        PipelineStage::Aggregate,
        PipelineStage::Diversity,
        PipelineStage::Compare,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::ExcludeSamples => "exclude-samples",
            PipelineStage::PairSamples => "pair-samples",
            PipelineStage::FilterTaxa => "filter-taxa",
            PipelineStage::Normalize => "normalize",
            PipelineStage::Reconcile => "reconcile",
            PipelineStage::Aggregate => "aggregate",
            PipelineStage::Diversity => "diversity",
            PipelineStage::Compare => "compare",
        }
    }
}

/// Pipeline configuration for serialization.
///
/// Every field is optional in YAML; absent fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the pipeline.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Samples removed before anything else (low sequencing depth).
    pub exclude_samples: Vec<String>,
    /// Host phylum categories, in chart order.
    pub host_phylum_order: Vec<String>,
    /// Family categories, in chart order.
    pub family_order: Vec<String>,
    /// Category for taxa without an annotation.
    pub unknown_label: String,
    /// Category for families outside `family_order`; unlisted host phyla
    /// always count as unknown.
    pub other_label: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "phage-translocation".to_string(),
            description: None,
            exclude_samples: Vec::new(),
            host_phylum_order: HOST_PHYLA.iter().map(|s| s.to_string()).collect(),
            family_order: FAMILIES.iter().map(|s| s.to_string()).collect(),
            unknown_label: UNKNOWN.to_string(),
            other_label: Some("Other".to_string()),
        }
    }
}

impl PipelineConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(TranslocationError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(TranslocationError::from)
    }

    fn host_order(&self) -> Result<CategoryOrder> {
        CategoryOrder::new(&self.host_phylum_order, &self.unknown_label, None)
    }

    fn family_order(&self) -> Result<CategoryOrder> {
        CategoryOrder::new(&self.family_order, &self.unknown_label, self.other_label.as_deref())
    }
}

/// Builder for configuring and running the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the default category orders and no exclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// Add samples to exclude.
    pub fn exclude_samples<S: AsRef<str>>(mut self, samples: &[S]) -> Self {
        self.config
            .exclude_samples
            .extend(samples.iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Replace the host phylum category order.
    pub fn host_phylum_order<S: AsRef<str>>(mut self, order: &[S]) -> Self {
        self.config.host_phylum_order = order.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Replace the family category order.
    pub fn family_order<S: AsRef<str>>(mut self, order: &[S]) -> Self {
        self.config.family_order = order.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Set the label for missing annotations.
    pub fn unknown_label(mut self, label: &str) -> Self {
        self.config.unknown_label = label.to_string();
        self
    }

    /// Set or clear the catch-all family label.
    pub fn other_label(mut self, label: Option<&str>) -> Self {
        self.config.other_label = label.map(String::from);
        self
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> PipelineConfig {
        PipelineConfig {
            description: description.map(String::from),
            ..self.config.clone()
        }
    }

    /// Run every stage on a validated dataset.
    ///
    /// The first failing stage aborts the run; its error is wrapped with the
    /// stage number and name.
    pub fn run(&self, dataset: &Dataset) -> Result<TranslocationReport> {
        let orders = (self.config.host_order()?, self.config.family_order()?);
        let mut state = PipelineState::new(dataset, dataset.abundance().clone());

        for (i, stage) in PipelineStage::ALL.iter().enumerate() {
            debug!(stage = stage.name(), "running stage");
            state = state.apply(*stage, &self.config, &orders).map_err(|e| {
                TranslocationError::Pipeline(format!(
                    "Stage {} ({}) failed: {}",
                    i + 1,
                    stage.name(),
                    e
                ))
            })?;
        }

        state.finalize(&self.config.name)
    }
}

/// Internal state during pipeline execution.
struct PipelineState<'a> {
    dataset: &'a Dataset,
    abundance: AbundanceMatrix,
    sample_filter: Option<SampleFilterResult>,
    pairing: Option<Pairing>,
    taxon_filter: Option<TaxonFilterResult>,
    relative: Option<RelativeAbundance>,
    individuals: Option<Vec<IndividualOverlap>>,
    pooled: Option<CompartmentUnion>,
    frequencies: Option<[CategoryFrequencies; 3]>,
    diversity: Option<Vec<SampleDiversity>>,
    tests: Option<Vec<SignificanceTest>>,
}

impl<'a> PipelineState<'a> {
    fn new(dataset: &'a Dataset, abundance: AbundanceMatrix) -> Self {
        Self {
            dataset,
            abundance,
            sample_filter: None,
            pairing: None,
            taxon_filter: None,
            relative: None,
            individuals: None,
            pooled: None,
            frequencies: None,
            diversity: None,
            tests: None,
        }
    }

    fn apply(
        mut self,
        stage: PipelineStage,
        config: &PipelineConfig,
        (host_order, family_order): &(CategoryOrder, CategoryOrder),
    ) -> Result<Self> {
        match stage {
            PipelineStage::ExcludeSamples => {
                let (filtered, result) = exclude_samples(&self.abundance, &config.exclude_samples)?;
                info!(removed = result.removed_samples.len(), "excluded samples");
                self.abundance = filtered;
                self.sample_filter = Some(result);
            }

            PipelineStage::PairSamples => {
                self.pairing = Some(pair_samples(self.abundance.sample_ids())?);
            }

            PipelineStage::FilterTaxa => {
                let (filtered, result) = filter_viral_taxa(&self.abundance, self.dataset.taxonomy())?;
                self.abundance = filtered;
                self.taxon_filter = Some(result);
            }

            PipelineStage::Normalize => {
                self.relative = Some(norm_relative(&self.abundance)?);
            }

            PipelineStage::Reconcile => {
                let rel = self.relative.as_ref().ok_or_else(|| {
                    TranslocationError::Pipeline("Must normalize before reconciling".to_string())
                })?;
                let pairing = self.pairing.as_ref().ok_or_else(|| {
                    TranslocationError::Pipeline("Must pair samples before reconciling".to_string())
                })?;
                self.individuals = Some(reconcile_individuals(
                    rel,
                    &pairing.pairs,
                    self.dataset.metadata(),
                )?);
                self.pooled = Some(compartment_union(rel)?);
            }

            PipelineStage::Aggregate => {
                let pooled = self.pooled.as_ref().ok_or_else(|| {
                    TranslocationError::Pipeline("Must reconcile before aggregating".to_string())
                })?;
                let taxonomy = self.dataset.taxonomy();
                let shared = pooled.shared();
                self.frequencies = Some([
                    aggregate_taxa(&pooled.all(), taxonomy, Annotation::HostPhylum, host_order)?,
                    aggregate_taxa(&shared, taxonomy, Annotation::HostPhylum, host_order)?,
                    aggregate_taxa(&shared, taxonomy, Annotation::Family, family_order)?,
                ]);
            }

            PipelineStage::Diversity => {
                let rel = self.relative.as_ref().ok_or_else(|| {
                    TranslocationError::Pipeline("Must normalize before diversity".to_string())
                })?;
                self.diversity = Some(sample_diversity(rel, self.dataset.metadata())?);
            }

            PipelineStage::Compare => {
                let individuals = self.individuals.as_ref().ok_or_else(|| {
                    TranslocationError::Pipeline("Must reconcile before comparing".to_string())
                })?;
                let diversity = self.diversity.as_ref().ok_or_else(|| {
                    TranslocationError::Pipeline("Must compute diversity before comparing".to_string())
                })?;
                let pairs = self
                    .pairing
                    .as_ref()
                    .map(|p| p.pairs.as_slice())
                    .unwrap_or_default();
                let mut tests = overlap_tests(individuals)?;
                tests.extend(diversity_tests(diversity, pairs)?);
                self.tests = Some(tests);
            }
        }
        Ok(self)
    }

    fn finalize(self, name: &str) -> Result<TranslocationReport> {
        let missing = |what: &str| TranslocationError::Pipeline(format!("{} not computed", what));

        let pooled = self.pooled.ok_or_else(|| missing("Compartment union"))?;
        let [host_phylum_all, host_phylum_shared, family_shared] =
            self.frequencies.ok_or_else(|| missing("Frequency tables"))?;

        Ok(TranslocationReport {
            pipeline: name.to_string(),
            sample_filter: self.sample_filter.ok_or_else(|| missing("Sample filter"))?,
            taxon_filter: self.taxon_filter.ok_or_else(|| missing("Taxon filter"))?,
            pairing: self.pairing.ok_or_else(|| missing("Pairing"))?,
            venn: pooled.venn(),
            host_phylum_all,
            host_phylum_shared,
            family_shared,
            individuals: self.individuals.ok_or_else(|| missing("Individual overlap"))?,
            diversity: self.diversity.ok_or_else(|| missing("Diversity"))?,
            tests: self.tests.ok_or_else(|| missing("Significance tests"))?,
        })
    }
}

/// Run the default pipeline with the given exclusions.
pub fn run_translocation<S: AsRef<str>>(
    dataset: &Dataset,
    exclusions: &[S],
) -> Result<TranslocationReport> {
    Pipeline::new().exclude_samples(exclusions).run(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleMetadata, TaxonomyTable};

    // V1..V4 viral; V5 contaminant; V6 non-viral.
    // P1 and P2 healthy, P3 and P4 Crohn's; P4_B is excluded below.
    fn create_test_dataset() -> Dataset {
        let taxa: Vec<String> = (1..=6).map(|i| format!("V{}", i)).collect();
        let samples: Vec<String> = ["P1_F", "P1_B", "P2_F", "P2_B", "P3_F", "P3_B", "P4_F", "P4_B"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec![10.0, 2.0, 5.0, 0.0, 8.0, 1.0, 3.0, 1.0],
            vec![5.0, 0.0, 5.0, 3.0, 0.0, 0.0, 2.0, 0.0],
            vec![0.0, 4.0, 2.0, 2.0, 4.0, 3.0, 0.0, 2.0],
            vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 1.0, 0.0],
            vec![7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0],
            vec![0.0, 9.0, 0.0, 9.0, 0.0, 9.0, 0.0, 9.0],
        ];
        let abundance = AbundanceMatrix::from_rows(&rows, taxa, samples).unwrap();
        let taxonomy = TaxonomyTable::from_reader(
            "id,Contaminant,Viral,Family,HostPhylum\n\
             V1,No,Yes,Microviridae,Bacteroidota\n\
             V2,No,Yes,Siphoviridae,Bacillota\n\
             V3,No,Yes,Inoviridae,NA\n\
             V4,No,Yes,NA,Pseudomonadota\n\
             V5,Yes,Yes,Microviridae,Bacteroidota\n\
             V6,No,No,NA,NA\n"
                .as_bytes(),
        )
        .unwrap();
        let metadata = SampleMetadata::from_reader(
            "Sample;Disease;SampleType\n\
             P1_F;Healthy;Stool\nP1_B;Healthy;Plasma\n\
             P2_F;Healthy;Stool\nP2_B;Healthy;Plasma\n\
             P3_F;CD;Stool\nP3_B;CD;Plasma\n\
             P4_F;CD;Stool\nP4_B;CD;Plasma\n"
                .as_bytes(),
        )
        .unwrap();
        Dataset::new(abundance, taxonomy, metadata).unwrap()
    }

    #[test]
    fn test_pipeline_run() {
        crate::logging::init_test_logging();
        let report = Pipeline::new()
            .name("test")
            .exclude_samples(&["P4_B"])
            .run(&create_test_dataset())
            .unwrap();

        assert_eq!(report.pipeline, "test");
        assert_eq!(report.sample_filter.n_after, 7);
        assert_eq!(report.pairing.n_pairs(), 3);
        assert_eq!(report.pairing.orphans, vec!["P4_F"]);
        assert_eq!(report.taxon_filter.n_after, 4);
        assert_eq!(report.taxon_filter.n_contaminant, 1);
        assert_eq!(report.taxon_filter.n_non_viral, 1);

        // P1: stool {V1, V2, V4}, blood {V1, V3}
        let p1 = &report.individuals[0];
        assert_eq!(p1.individual, "P1");
        assert_eq!((p1.feces_count, p1.blood_count, p1.shared_count), (3, 2, 1));

        // Stool anywhere {V1..V4}, blood anywhere {V1, V2, V3}
        assert_eq!(report.venn.shared, 3);
        assert_eq!(report.venn.stool_only, 1);
        assert_eq!(report.venn.blood_only, 0);
        assert_eq!(report.host_phylum_all.total, 4);
        assert_eq!(report.host_phylum_shared.count("Unknown"), Some(1));
        assert_eq!(report.family_shared.count("Other"), Some(1));
        assert_eq!(report.diversity.len(), 7);
    }

    #[test]
    fn test_pipeline_tests_cover_boxplots() {
        let report = run_translocation(&create_test_dataset(), &["P4_B"]).unwrap();

        assert_eq!(report.tests_for(5).count(), 2);
        // Rank-sum in each compartment plus the paired signed-rank test.
        assert_eq!(report.tests_for(6).count(), 3);
        assert!(report
            .tests
            .iter()
            .all(|t| (0.0..=1.0).contains(&t.result.p_value)));
    }

    #[test]
    fn test_pipeline_config_yaml() {
        let pipeline = Pipeline::new()
            .name("example")
            .exclude_samples(&["P4_B", "P7_F"])
            .other_label(None);

        let config = pipeline.to_config(Some("Example pipeline"));
        let yaml = config.to_yaml().unwrap();
        let parsed = PipelineConfig::from_yaml(&yaml).unwrap();

        assert_eq!(parsed, config);
        assert_eq!(parsed.exclude_samples.len(), 2);
        assert_eq!(parsed.other_label, None);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = PipelineConfig::from_yaml("name: minimal\nexclude_samples: [P4_B]\n").unwrap();

        assert_eq!(config.name, "minimal");
        assert_eq!(config.host_phylum_order, vec!["Bacteroidota", "Bacillota", "Pseudomonadota"]);
        assert_eq!(config.unknown_label, "Unknown");
        assert_eq!(config.other_label.as_deref(), Some("Other"));
    }

    #[test]
    fn test_pipeline_error_names_stage() {
        // Dropping the contaminant V2 leaves P1_B with nothing to normalize.
        let rows = vec![vec![1.0, 0.0], vec![0.0, 2.0]];
        let abundance = AbundanceMatrix::from_rows(
            &rows,
            vec!["V1".into(), "V2".into()],
            vec!["P1_F".into(), "P1_B".into()],
        )
        .unwrap();
        let taxonomy = TaxonomyTable::from_reader(
            "id,Contaminant,Viral,Family,HostPhylum\nV1,No,Yes,NA,NA\nV2,Yes,Yes,NA,NA\n".as_bytes(),
        )
        .unwrap();
        let metadata = SampleMetadata::from_reader(
            "Sample;Disease;SampleType\nP1_F;Healthy;Stool\nP1_B;Healthy;Plasma\n".as_bytes(),
        )
        .unwrap();
        let dataset = Dataset::new(abundance, taxonomy, metadata).unwrap();

        let err = Pipeline::new().run(&dataset).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, TranslocationError::Pipeline(_)));
        assert!(msg.contains("Stage 4 (normalize)"));
        assert!(msg.contains("P1_B"));
    }

    #[test]
    fn test_invalid_order_rejected() {
        let result = Pipeline::new().unknown_label("").run(&create_test_dataset());
        assert!(matches!(result, Err(TranslocationError::InvalidParameter(_))));

        let config = PipelineConfig::from_yaml("other_label: Unknown\n").unwrap();
        let result = Pipeline::from_config(&config).run(&create_test_dataset());
        assert!(matches!(result, Err(TranslocationError::InvalidParameter(_))));
    }
}
