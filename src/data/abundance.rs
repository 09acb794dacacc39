//! Abundance matrix with sparse storage for vOTU read counts.

use super::table::KeyedTable;
use crate::error::{Result, TranslocationError};
use sprs::{CsMat, TriMat};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A sparse abundance matrix storing vOTU counts across samples.
///
/// Rows represent taxa (vOTUs), columns represent samples.
/// Counts are non-negative and may be fractional (coverage-scaled counts).
#[derive(Debug, Clone)]
pub struct AbundanceMatrix {
    /// Sparse matrix in CSR format (taxa × samples)
    data: CsMat<f64>,
    /// Taxon identifiers (row names)
    taxon_ids: Vec<String>,
    /// Sample identifiers (column names)
    sample_ids: Vec<String>,
}

impl AbundanceMatrix {
    /// Create a new AbundanceMatrix from a sparse matrix and identifiers.
    pub fn new(data: CsMat<f64>, taxon_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != taxon_ids.len() {
            return Err(TranslocationError::InvalidParameter(format!(
                "matrix has {} rows but {} taxon identifiers",
                nrows,
                taxon_ids.len()
            )));
        }
        if ncols != sample_ids.len() {
            return Err(TranslocationError::InvalidParameter(format!(
                "matrix has {} columns but {} sample identifiers",
                ncols,
                sample_ids.len()
            )));
        }
        Ok(Self {
            data,
            taxon_ids,
            sample_ids,
        })
    }

    /// Build from dense rows (one `Vec` per taxon).
    pub fn from_rows(rows: &[Vec<f64>], taxon_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let mut tri_mat = TriMat::new((rows.len(), sample_ids.len()));
        for (row, values) in rows.iter().enumerate() {
            if values.len() != sample_ids.len() {
                return Err(TranslocationError::InvalidParameter(format!(
                    "row {} has {} values, expected {}",
                    row,
                    values.len(),
                    sample_ids.len()
                )));
            }
            for (col, &val) in values.iter().enumerate() {
                if val > 0.0 {
                    tri_mat.add_triplet(row, col, val);
                }
            }
        }
        Self::new(tri_mat.to_csr(), taxon_ids, sample_ids)
    }

    /// Load an abundance matrix from a tab-delimited file.
    ///
    /// Expected format:
    /// - First row: header with sample IDs (first column is the taxon ID header)
    /// - Subsequent rows: taxon ID followed by counts
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load an abundance matrix from tab-delimited text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let table = KeyedTable::from_reader(reader, b'\t', "abundance")?;
        let sample_ids = table.columns.clone();
        let n_samples = sample_ids.len();

        let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
        let mut taxon_ids: Vec<String> = Vec::with_capacity(table.rows.len());

        for (row_idx, (taxon_id, values)) in table.rows.into_iter().enumerate() {
            for (col_idx, raw) in values.iter().enumerate().take(n_samples) {
                let value: f64 = raw
                    .parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite() && *v >= 0.0)
                    .ok_or_else(|| TranslocationError::InvalidValue {
                        table: "abundance".to_string(),
                        key: taxon_id.clone(),
                        column: sample_ids[col_idx].clone(),
                        value: raw.clone(),
                    })?;
                if value > 0.0 {
                    triplets.push((row_idx, col_idx, value));
                }
            }
            taxon_ids.push(taxon_id);
        }

        let mut tri_mat = TriMat::new((taxon_ids.len(), n_samples));
        for (row, col, val) in triplets {
            tri_mat.add_triplet(row, col, val);
        }

        Self::new(tri_mat.to_csr(), taxon_ids, sample_ids)
    }

    /// Get the value at (row, col), returning 0 for missing entries.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data.get(row, col).copied().unwrap_or(0.0)
    }

    /// Number of taxa (rows).
    #[inline]
    pub fn n_taxa(&self) -> usize {
        self.data.rows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.cols()
    }

    /// Total number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.nnz()
    }

    /// Taxon identifiers.
    #[inline]
    pub fn taxon_ids(&self) -> &[String] {
        &self.taxon_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column index of a sample.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample_id)
    }

    /// Get a dense vector for a specific column (sample).
    pub fn col_dense(&self, col: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.n_taxa()];
        for (row, row_vec) in self.data.outer_iterator().enumerate() {
            if let Some(&val) = row_vec.get(col) {
                dense[row] = val;
            }
        }
        dense
    }

    /// Compute column sums (read depth per sample).
    pub fn col_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_samples()];
        for row_vec in self.data.outer_iterator() {
            for (col, &val) in row_vec.iter() {
                sums[col] += val;
            }
        }
        sums
    }

    /// Subset the matrix to include only specified taxa (by index).
    pub fn subset_taxa(&self, indices: &[usize]) -> Result<Self> {
        let mut tri_mat = TriMat::new((indices.len(), self.n_samples()));
        let mut new_taxon_ids = Vec::with_capacity(indices.len());

        for (new_row, &old_row) in indices.iter().enumerate() {
            if old_row >= self.n_taxa() {
                return Err(TranslocationError::InvalidParameter(format!(
                    "Taxon index {} out of bounds",
                    old_row
                )));
            }
            new_taxon_ids.push(self.taxon_ids[old_row].clone());

            if let Some(row_vec) = self.data.outer_view(old_row) {
                for (col, &val) in row_vec.iter() {
                    tri_mat.add_triplet(new_row, col, val);
                }
            }
        }

        Self::new(tri_mat.to_csr(), new_taxon_ids, self.sample_ids.clone())
    }

    /// Subset the matrix to include only specified samples (by index).
    pub fn subset_samples(&self, indices: &[usize]) -> Result<Self> {
        let col_map: HashMap<usize, usize> = indices
            .iter()
            .enumerate()
            .map(|(new_idx, &old_idx)| (old_idx, new_idx))
            .collect();

        let mut new_sample_ids = Vec::with_capacity(indices.len());
        for &old_col in indices {
            if old_col >= self.n_samples() {
                return Err(TranslocationError::InvalidParameter(format!(
                    "Sample index {} out of bounds",
                    old_col
                )));
            }
            new_sample_ids.push(self.sample_ids[old_col].clone());
        }

        let mut tri_mat = TriMat::new((self.n_taxa(), indices.len()));
        for (row, row_vec) in self.data.outer_iterator().enumerate() {
            for (old_col, &val) in row_vec.iter() {
                if let Some(&new_col) = col_map.get(&old_col) {
                    tri_mat.add_triplet(row, new_col, val);
                }
            }
        }

        Self::new(tri_mat.to_csr(), self.taxon_ids.clone(), new_sample_ids)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_matrix() -> AbundanceMatrix {
        // 3 taxa × 4 samples
        let mut tri_mat = TriMat::new((3, 4));
        tri_mat.add_triplet(0, 0, 10.0);
        tri_mat.add_triplet(0, 1, 20.0);
        tri_mat.add_triplet(0, 3, 5.0);
        tri_mat.add_triplet(1, 0, 100.0);
        tri_mat.add_triplet(1, 1, 200.0);
        tri_mat.add_triplet(1, 2, 150.0);
        tri_mat.add_triplet(1, 3, 175.0);
        tri_mat.add_triplet(2, 0, 1.5);

        let taxon_ids = vec!["vOTU_1".to_string(), "vOTU_2".to_string(), "vOTU_3".to_string()];
        let sample_ids = vec![
            "P1_F".to_string(),
            "P1_B".to_string(),
            "P2_F".to_string(),
            "P2_B".to_string(),
        ];

        AbundanceMatrix::new(tri_mat.to_csr(), taxon_ids, sample_ids).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.n_taxa(), 3);
        assert_eq!(mat.n_samples(), 4);
        assert_eq!(mat.nnz(), 8);
    }

    #[test]
    fn test_get_values() {
        let mat = create_test_matrix();
        assert_eq!(mat.get(0, 0), 10.0);
        assert_eq!(mat.get(0, 2), 0.0);
        assert_eq!(mat.get(2, 0), 1.5);
    }

    #[test]
    fn test_col_sums_and_dense() {
        let mat = create_test_matrix();
        assert_eq!(mat.col_sums(), vec![111.5, 220.0, 150.0, 180.0]);
        assert_eq!(mat.col_dense(0), vec![10.0, 100.0, 1.5]);
    }

    #[test]
    fn test_parse_tab_delimited() {
        let text = "vOTU\tP1_F\tP1_B\nvOTU_1\t3\t0\nvOTU_2\t0.5\t7\n";
        let mat = AbundanceMatrix::from_reader(text.as_bytes()).unwrap();
        assert_eq!(mat.sample_ids(), &["P1_F", "P1_B"]);
        assert_eq!(mat.taxon_ids(), &["vOTU_1", "vOTU_2"]);
        assert_eq!(mat.get(1, 0), 0.5);
        assert_eq!(mat.get(0, 1), 0.0);
    }

    #[test]
    fn test_negative_count_rejected() {
        let text = "vOTU\tP1_F\nvOTU_1\t-3\n";
        let err = AbundanceMatrix::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, TranslocationError::InvalidValue { .. }));
    }

    #[test]
    fn test_non_numeric_count_rejected() {
        let text = "vOTU\tP1_F\nvOTU_1\tmany\n";
        assert!(AbundanceMatrix::from_reader(text.as_bytes()).is_err());
    }

    #[test]
    fn test_subset_taxa() {
        let mat = create_test_matrix();
        let subset = mat.subset_taxa(&[0, 2]).unwrap();
        assert_eq!(subset.taxon_ids(), &["vOTU_1", "vOTU_3"]);
        assert_eq!(subset.get(1, 0), 1.5);
        assert!(mat.subset_taxa(&[5]).is_err());
    }

    #[test]
    fn test_subset_samples() {
        let mat = create_test_matrix();
        let subset = mat.subset_samples(&[3, 1]).unwrap();
        assert_eq!(subset.sample_ids(), &["P2_B", "P1_B"]);
        assert_eq!(subset.get(0, 0), 5.0);
        assert_eq!(subset.get(0, 1), 20.0);
        assert!(mat.subset_samples(&[4]).is_err());
    }
}
