//! Read depth profiling for abundance matrices.

use crate::data::AbundanceMatrix;
use serde::{Deserialize, Serialize};

/// Per-sample read depth summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySizeProfile {
    /// Number of samples.
    pub n_samples: usize,
    /// Sample identifiers, in matrix order.
    pub sample_ids: Vec<String>,
    /// Total abundance per sample.
    pub library_sizes: Vec<f64>,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Coefficient of variation (std_dev / mean).
    pub cv: f64,
    /// Samples with a total of zero; these fail normalization.
    pub n_empty: usize,
}

impl std::fmt::Display for LibrarySizeProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Read Depth Profile")?;
        writeln!(f, "  Samples: {}", self.n_samples)?;
        writeln!(f, "  Mean:    {:.0}", self.mean)?;
        writeln!(f, "  Median:  {:.0}", self.median)?;
        writeln!(f, "  Std Dev: {:.0}", self.std_dev)?;
        writeln!(f, "  Min:     {:.0}", self.min)?;
        writeln!(f, "  Max:     {:.0}", self.max)?;
        writeln!(f, "  CV:      {:.2}", self.cv)?;
        writeln!(f, "  Empty samples: {}", self.n_empty)?;
        Ok(())
    }
}

/// Profile the per-sample totals of an abundance matrix.
pub fn profile_library_size(abundance: &AbundanceMatrix) -> LibrarySizeProfile {
    let library_sizes = abundance.col_sums();
    let n_samples = library_sizes.len();
    let sample_ids = abundance.sample_ids().to_vec();

    if n_samples == 0 {
        return LibrarySizeProfile {
            n_samples: 0,
            sample_ids,
            library_sizes,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            cv: 0.0,
            n_empty: 0,
        };
    }

    let mean = library_sizes.iter().sum::<f64>() / n_samples as f64;
    let variance = library_sizes
        .iter()
        .map(|&x| (x - mean) * (x - mean))
        .sum::<f64>()
        / n_samples as f64;
    let std_dev = variance.sqrt();

    let min = library_sizes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = library_sizes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let n_empty = library_sizes.iter().filter(|&&x| x == 0.0).count();

    LibrarySizeProfile {
        n_samples,
        median: median(&library_sizes),
        sample_ids,
        library_sizes,
        mean,
        std_dev,
        min,
        max,
        cv: if mean > 0.0 { std_dev / mean } else { 0.0 },
        n_empty,
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_matrix() -> AbundanceMatrix {
        // Depths: 100, 200, 150, 0
        let rows = vec![
            vec![40.0, 80.0, 60.0, 0.0],
            vec![50.0, 100.0, 75.0, 0.0],
            vec![10.0, 20.0, 15.0, 0.0],
        ];
        AbundanceMatrix::from_rows(
            &rows,
            vec!["A".into(), "B".into(), "C".into()],
            vec!["P1_F".into(), "P1_B".into(), "P2_F".into(), "P2_B".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_profile_library_size() {
        let profile = profile_library_size(&create_test_matrix());

        assert_eq!(profile.n_samples, 4);
        assert_eq!(profile.library_sizes, vec![100.0, 200.0, 150.0, 0.0]);
        assert_eq!(profile.min, 0.0);
        assert_eq!(profile.max, 200.0);
        assert_relative_eq!(profile.mean, 112.5);
        assert_relative_eq!(profile.median, 125.0);
        assert_eq!(profile.n_empty, 1);
    }
}
