//! Taxonomic aggregation of vOTU sets for composition charts.

mod category;

pub use category::{
    aggregate_taxa, CategoryCount, CategoryFrequencies, CategoryOrder, FAMILIES, HOST_PHYLA, UNKNOWN,
};
