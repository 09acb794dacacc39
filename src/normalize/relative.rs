//! Relative abundance (total sum scaling) for vOTU counts.
//!
//! Each count is divided by the total of its sample, so every sample column
//! of the result sums to 1.

use crate::data::AbundanceMatrix;
use crate::error::{Result, TranslocationError};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Tolerance for column sums of a relative abundance matrix.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Relative abundances (taxa × samples), each column summing to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeAbundance {
    /// The proportions (taxa × samples).
    #[serde(skip, default = "empty_matrix")]
    pub data: DMatrix<f64>,
    /// Taxon identifiers.
    pub taxon_ids: Vec<String>,
    /// Sample identifiers.
    pub sample_ids: Vec<String>,
    /// Sample totals before normalization.
    pub library_sizes: Vec<f64>,
}

fn empty_matrix() -> DMatrix<f64> {
    DMatrix::zeros(0, 0)
}

impl RelativeAbundance {
    /// Get the proportion for a taxon and sample.
    pub fn get(&self, taxon: usize, sample: usize) -> f64 {
        self.data[(taxon, sample)]
    }

    /// Number of taxa.
    pub fn n_taxa(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Column index of a sample.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample_id)
    }

    /// Get a column (sample) as a vector.
    pub fn col(&self, sample: usize) -> Vec<f64> {
        self.data.column(sample).iter().cloned().collect()
    }

    /// Sum of a column; 1 within [`SUM_TOLERANCE`] for every sample.
    pub fn col_sum(&self, sample: usize) -> f64 {
        self.data.column(sample).sum()
    }

    /// Taxa with strictly positive proportion in a sample.
    pub fn presence(&self, sample: usize) -> BTreeSet<String> {
        self.data
            .column(sample)
            .iter()
            .zip(&self.taxon_ids)
            .filter(|(&p, _)| p > 0.0)
            .map(|(_, id)| id.clone())
            .collect()
    }
}

/// Convert counts to per-sample proportions.
///
/// For sample j: p_ij = x_ij / sum_i(x_ij)
///
/// A sample whose total is zero (all of its reads fell in removed taxa)
/// cannot be normalized and fails with [`TranslocationError::EmptySample`].
pub fn norm_relative(abundance: &AbundanceMatrix) -> Result<RelativeAbundance> {
    let n_taxa = abundance.n_taxa();
    let n_samples = abundance.n_samples();

    if n_taxa == 0 || n_samples == 0 {
        return Err(TranslocationError::EmptyData(
            "Cannot normalize an empty abundance matrix".to_string(),
        ));
    }

    let library_sizes = abundance.col_sums();
    if let Some(j) = library_sizes.iter().position(|&total| total <= 0.0) {
        return Err(TranslocationError::EmptySample {
            sample_id: abundance.sample_ids()[j].clone(),
        });
    }

    let normalized_cols: Vec<Vec<f64>> = (0..n_samples)
        .into_par_iter()
        .map(|j| {
            let total = library_sizes[j];
            abundance
                .col_dense(j)
                .into_iter()
                .map(|count| count / total)
                .collect()
        })
        .collect();

    let mut data = DMatrix::zeros(n_taxa, n_samples);
    for (j, col) in normalized_cols.iter().enumerate() {
        for (i, &val) in col.iter().enumerate() {
            data[(i, j)] = val;
        }
    }
    debug!(taxa = n_taxa, samples = n_samples, "normalized to relative abundance");

    Ok(RelativeAbundance {
        data,
        taxon_ids: abundance.taxon_ids().to_vec(),
        sample_ids: abundance.sample_ids().to_vec(),
        library_sizes,
    })
}
