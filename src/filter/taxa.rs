//! Restriction to viral, non-contaminant vOTUs.

use crate::data::{AbundanceMatrix, TaxonomyTable};
use crate::error::{Result, TranslocationError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result of the viral/contaminant filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonFilterResult {
    /// Number of taxa before filtering.
    pub n_before: usize,
    /// Number of taxa retained.
    pub n_after: usize,
    /// Taxa removed as contaminants.
    pub n_contaminant: usize,
    /// Non-contaminant taxa removed as non-viral.
    pub n_non_viral: usize,
}

impl std::fmt::Display for TaxonFilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Taxon Filter Result")?;
        writeln!(f, "  Taxa before:         {}", self.n_before)?;
        writeln!(f, "  Taxa after:          {}", self.n_after)?;
        writeln!(f, "  Contaminants removed: {}", self.n_contaminant)?;
        writeln!(f, "  Non-viral removed:    {}", self.n_non_viral)?;
        Ok(())
    }
}

/// Keep taxa with `Contaminant == No` and `Viral == Yes`.
///
/// Every taxon of the matrix must have a taxonomy row.
pub fn filter_viral_taxa(
    abundance: &AbundanceMatrix,
    taxonomy: &TaxonomyTable,
) -> Result<(AbundanceMatrix, TaxonFilterResult)> {
    let mut keep = Vec::new();
    let mut missing = Vec::new();
    let mut n_contaminant = 0;
    let mut n_non_viral = 0;
    for (row, taxon_id) in abundance.taxon_ids().iter().enumerate() {
        match taxonomy.get(taxon_id) {
            None => missing.push(taxon_id.clone()),
            Some(record) if record.passes_qc() => keep.push(row),
            Some(record) if record.contaminant => n_contaminant += 1,
            Some(_) => n_non_viral += 1,
        }
    }
    if !missing.is_empty() {
        return Err(TranslocationError::key_mismatch("abundance", "taxonomy", &missing));
    }

    if keep.is_empty() {
        return Err(TranslocationError::EmptyData(
            "no viral, non-contaminant taxa remain".to_string(),
        ));
    }

    let filtered = abundance.subset_taxa(&keep)?;
    let result = TaxonFilterResult {
        n_before: abundance.n_taxa(),
        n_after: filtered.n_taxa(),
        n_contaminant,
        n_non_viral,
    };
    info!(
        before = result.n_before,
        after = result.n_after,
        contaminants = n_contaminant,
        non_viral = n_non_viral,
        "filtered taxa"
    );

    Ok((filtered, result))
}
