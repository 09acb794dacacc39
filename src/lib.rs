//! Phage Translocation Data Preparation Library
//!
//! This library prepares the tables behind a study of bacteriophage
//! translocation from the gut into the blood in health and Crohn's disease.
//!
//! # Overview
//!
//! The library is organized into modules following the data flow:
//!
//! - **data**: Input tables (abundance matrix, taxonomy, sample metadata)
//! - **profile**: Dataset profiling (read depth, quality flags, pairing)
//! - **filter**: Sample exclusion, stool/blood pairing, viral taxon filter
//! - **normalize**: Per-sample relative abundance
//! - **overlap**: Per-individual and pooled stool/blood presence sets
//! - **aggregate**: Host phylum and family frequency tables
//! - **diversity**: Shannon diversity per sample
//! - **test**: Wilcoxon rank tests for group comparisons
//! - **pipeline**: Configured execution of all stages
//! - **report**: Figure tables and their export
//!
//! # Example
//!
//! ```no_run
//! use phage_translocation::prelude::*;
//!
//! let paths = InputPaths::new("abundance.tsv", "taxonomy.csv", "metadata.csv");
//! let dataset = Dataset::load(&paths).unwrap();
//!
//! let report = Pipeline::new()
//!     .exclude_samples(&["P12_B", "P30_F"])
//!     .run(&dataset)
//!     .unwrap();
//!
//! report.write_dir("figures").unwrap();
//! ```

pub mod aggregate;
pub mod data;
pub mod diversity;
pub mod error;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod overlap;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::{
        aggregate_taxa, CategoryCount, CategoryFrequencies, CategoryOrder, FAMILIES, HOST_PHYLA,
        UNKNOWN,
    };
    pub use crate::data::{
        AbundanceMatrix, Annotation, Compartment, Dataset, Disease, InputPaths, SampleId,
        SampleMetadata, SampleRecord, TaxonRecord, TaxonomyTable,
    };
    pub use crate::diversity::{observed_richness, sample_diversity, shannon_index, SampleDiversity};
    pub use crate::error::{Result, TranslocationError};
    pub use crate::filter::{
        exclude_samples, filter_viral_taxa, pair_samples, Pairing, SampleFilterResult, SamplePair,
        TaxonFilterResult,
    };
    pub use crate::normalize::{norm_relative, RelativeAbundance, SUM_TOLERANCE};
    pub use crate::overlap::{
        compartment_union, overlap_percent, presence_set, reconcile_individuals, CompartmentUnion,
        IndividualOverlap, VennCounts,
    };
    pub use crate::pipeline::{run_translocation, Pipeline, PipelineConfig, PipelineStage};
    pub use crate::profile::{profile_dataset, profile_library_size, DatasetProfile, LibrarySizeProfile};
    pub use crate::report::{SignificanceTest, TestKind, TranslocationReport};
    pub use crate::test::{compare_groups, rank_sum_test, signed_rank_test, GroupComparison, WilcoxonResult};
}
