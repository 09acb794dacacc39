//! Frequency tables of a taxonomic annotation over a fixed category list.

use crate::data::{Annotation, TaxonomyTable};
use crate::error::{Result, TranslocationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Label for taxa without an annotation.
pub const UNKNOWN: &str = "Unknown";

/// Default host phylum ordering.
pub const HOST_PHYLA: [&str; 3] = ["Bacteroidota", "Bacillota", "Pseudomonadota"];

/// Default family ordering.
pub const FAMILIES: [&str; 4] = ["Microviridae", "Siphoviridae", "Myoviridae", "Podoviridae"];

/// Fixed, ordered category set for an aggregation.
///
/// The `missing` label is always part of the set and always last.
/// Annotations outside the listed categories go to `other` when it is set,
/// otherwise to `missing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOrder {
    categories: Vec<String>,
    missing: String,
    other: Option<String>,
}

impl CategoryOrder {
    /// Build an ordering. Duplicates are dropped, keeping the first position.
    pub fn new<S: AsRef<str>>(categories: &[S], missing: &str, other: Option<&str>) -> Result<Self> {
        if missing.trim().is_empty() {
            return Err(TranslocationError::InvalidParameter(
                "missing-annotation label must not be empty".to_string(),
            ));
        }
        if let Some(o) = other {
            if o.trim().is_empty() || o == missing {
                return Err(TranslocationError::InvalidParameter(format!(
                    "other label '{}' must be non-empty and differ from the missing label",
                    o
                )));
            }
        }
        let mut ordered: Vec<String> = Vec::new();
        for c in categories.iter().map(|c| c.as_ref().trim()) {
            if c.is_empty() {
                return Err(TranslocationError::InvalidParameter(
                    "category labels must not be empty".to_string(),
                ));
            }
            if c != missing && other != Some(c) && !ordered.iter().any(|o| o == c) {
                ordered.push(c.to_string());
            }
        }
        Ok(Self {
            categories: ordered,
            missing: missing.to_string(),
            other: other.map(String::from),
        })
    }

    /// Bacteroidota, Bacillota, Pseudomonadota, Unknown.
    pub fn host_phyla() -> Self {
        Self {
            categories: HOST_PHYLA.iter().map(|s| s.to_string()).collect(),
            missing: UNKNOWN.to_string(),
            other: None,
        }
    }

    /// Microviridae, Siphoviridae, Myoviridae, Podoviridae, Other, Unknown.
    pub fn families() -> Self {
        Self {
            categories: FAMILIES.iter().map(|s| s.to_string()).collect(),
            missing: UNKNOWN.to_string(),
            other: Some("Other".to_string()),
        }
    }

    /// All output labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(String::as_str)
            .chain(self.other.as_deref())
            .chain(std::iter::once(self.missing.as_str()))
            .collect()
    }

    /// Label a taxon is counted under.
    pub fn classify<'a>(&'a self, value: Option<&str>) -> &'a str {
        let Some(v) = value else {
            return self.missing.as_str();
        };
        if v == self.missing {
            return self.missing.as_str();
        }
        self.categories
            .iter()
            .find(|c| c.as_str() == v)
            .map(String::as_str)
            .or(self.other.as_deref())
            .unwrap_or(self.missing.as_str())
    }

    pub fn missing_label(&self) -> &str {
        &self.missing
    }
}

/// One category of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
    /// Share of the input taxa, in percent (0 for an empty input).
    pub percent: f64,
}

/// Frequency table over a fixed category order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFrequencies {
    pub annotation: Annotation,
    pub counts: Vec<CategoryCount>,
    pub total: usize,
}

impl CategoryFrequencies {
    /// Count of a category; `None` if the label is not part of the order.
    pub fn count(&self, category: &str) -> Option<usize> {
        self.counts.iter().find(|c| c.category == category).map(|c| c.count)
    }

    /// Labels in output order.
    pub fn categories(&self) -> Vec<&str> {
        self.counts.iter().map(|c| c.category.as_str()).collect()
    }
}

/// Count taxa per annotation category.
///
/// The output lists exactly the categories of `order`, zero counts
/// included. Taxa without the annotation are counted under the missing
/// label. A taxon absent from the taxonomy is an error.
pub fn aggregate_taxa<'a, I>(
    taxa: I,
    taxonomy: &TaxonomyTable,
    annotation: Annotation,
    order: &CategoryOrder,
) -> Result<CategoryFrequencies>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut tally: HashMap<&str, usize> = HashMap::new();
    let mut missing_taxa = Vec::new();
    let mut unlisted = 0usize;
    let mut total = 0usize;

    for taxon_id in taxa {
        if !taxonomy.has_taxon(taxon_id) {
            missing_taxa.push(taxon_id.clone());
            continue;
        }
        let value = taxonomy.annotation(taxon_id, annotation);
        let label = order.classify(value);
        if label == order.missing_label() && value.is_some_and(|v| v != order.missing_label()) {
            unlisted += 1;
        }
        *tally.entry(label).or_insert(0) += 1;
        total += 1;
    }

    if !missing_taxa.is_empty() {
        return Err(TranslocationError::key_mismatch("taxon set", "taxonomy", &missing_taxa));
    }
    if unlisted > 0 {
        debug!(
            annotation = annotation.column(),
            unlisted,
            "annotations outside the category order counted as missing"
        );
    }

    let counts = order
        .labels()
        .into_iter()
        .map(|label| {
            let count = tally.get(label).copied().unwrap_or(0);
            CategoryCount {
                category: label.to_string(),
                count,
                percent: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                },
            }
        })
        .collect();

    Ok(CategoryFrequencies {
        annotation,
        counts,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn create_taxonomy() -> TaxonomyTable {
        TaxonomyTable::from_reader(
            "id,Contaminant,Viral,Family,HostPhylum\n\
             X,No,Yes,Microviridae,Bacteroidota\n\
             Y,No,Yes,NA,NA\n\
             Z,No,Yes,Inoviridae,Actinomycetota\n\
             W,No,Yes,Siphoviridae,Bacillota\n"
                .as_bytes(),
        )
        .unwrap()
    }

    fn taxa(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_annotation_counts_as_unknown() {
        let taxonomy = create_taxonomy();
        let freq = aggregate_taxa(
            &taxa(&["X", "Y"]),
            &taxonomy,
            Annotation::HostPhylum,
            &CategoryOrder::host_phyla(),
        )
        .unwrap();

        assert_eq!(
            freq.categories(),
            vec!["Bacteroidota", "Bacillota", "Pseudomonadota", "Unknown"]
        );
        assert_eq!(freq.count("Bacteroidota"), Some(1));
        assert_eq!(freq.count("Bacillota"), Some(0));
        assert_eq!(freq.count("Pseudomonadota"), Some(0));
        assert_eq!(freq.count("Unknown"), Some(1));
        assert_eq!(freq.total, 2);
        assert_eq!(freq.counts[0].percent, 50.0);
    }

    #[test]
    fn test_empty_set_yields_all_zero() {
        let taxonomy = create_taxonomy();
        let order = CategoryOrder::host_phyla();
        let freq = aggregate_taxa(&taxa(&[]), &taxonomy, Annotation::HostPhylum, &order).unwrap();

        assert_eq!(freq.categories(), order.labels());
        assert!(freq.counts.iter().all(|c| c.count == 0 && c.percent == 0.0));
    }

    #[test]
    fn test_unlisted_phylum_goes_to_unknown() {
        let taxonomy = create_taxonomy();
        let freq = aggregate_taxa(
            &taxa(&["Z", "W"]),
            &taxonomy,
            Annotation::HostPhylum,
            &CategoryOrder::host_phyla(),
        )
        .unwrap();
        assert_eq!(freq.count("Unknown"), Some(1));
        assert_eq!(freq.count("Bacillota"), Some(1));
        assert_eq!(freq.counts.len(), 4);
    }

    #[test]
    fn test_family_order_has_other() {
        let taxonomy = create_taxonomy();
        let freq = aggregate_taxa(
            &taxa(&["X", "Y", "Z", "W"]),
            &taxonomy,
            Annotation::Family,
            &CategoryOrder::families(),
        )
        .unwrap();
        assert_eq!(
            freq.categories(),
            vec!["Microviridae", "Siphoviridae", "Myoviridae", "Podoviridae", "Other", "Unknown"]
        );
        assert_eq!(freq.count("Other"), Some(1));
        assert_eq!(freq.count("Unknown"), Some(1));
        assert_eq!(freq.count("Myoviridae"), Some(0));
    }

    #[test]
    fn test_unknown_taxon_is_error() {
        let taxonomy = create_taxonomy();
        let result = aggregate_taxa(
            &taxa(&["X", "nope"]),
            &taxonomy,
            Annotation::HostPhylum,
            &CategoryOrder::host_phyla(),
        );
        assert!(matches!(result, Err(TranslocationError::KeyMismatch { .. })));
    }

    #[test]
    fn test_custom_order_puts_missing_last() {
        let order = CategoryOrder::new(&["Unknown", "Bacillota", "Bacillota"], "Unknown", None).unwrap();
        assert_eq!(order.labels(), vec!["Bacillota", "Unknown"]);
        assert!(CategoryOrder::new(&["A"], " ", None).is_err());
    }

    #[test]
    fn test_literal_missing_label_is_not_other() {
        let taxonomy = TaxonomyTable::from_reader(
            "id,Contaminant,Viral,Family,HostPhylum\n\
             U,No,Yes,Unknown,Unknown\n\
             Z,No,Yes,Inoviridae,Actinomycetota\n"
                .as_bytes(),
        )
        .unwrap();
        let freq = aggregate_taxa(
            &taxa(&["U", "Z"]),
            &taxonomy,
            Annotation::Family,
            &CategoryOrder::families(),
        )
        .unwrap();
        assert_eq!(freq.count("Unknown"), Some(1));
        assert_eq!(freq.count("Other"), Some(1));
    }

    #[test]
    fn test_other_must_differ_from_missing() {
        let result = CategoryOrder::new(&["Microviridae"], "Unknown", Some("Unknown"));
        assert!(matches!(result, Err(TranslocationError::InvalidParameter(_))));
        assert!(CategoryOrder::new(&["Microviridae"], "Unknown", Some(" ")).is_err());

        let order = CategoryOrder::new(&["Microviridae"], "Unknown", Some("Other")).unwrap();
        assert_eq!(order.labels(), vec!["Microviridae", "Other", "Unknown"]);
    }
}
