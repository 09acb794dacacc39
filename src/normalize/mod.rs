//! Normalization of vOTU counts.

pub mod relative;

pub use relative::{norm_relative, RelativeAbundance, SUM_TOLERANCE};
