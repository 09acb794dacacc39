//! Filtering primitives for samples and taxa.

pub mod samples;
pub mod taxa;

pub use samples::{exclude_samples, pair_samples, Pairing, SampleFilterResult, SamplePair};
pub use taxa::{filter_viral_taxa, TaxonFilterResult};
