//! Significance tests annotating the overlap and diversity boxplots.

use crate::data::Compartment;
use crate::diversity::SampleDiversity;
use crate::error::{Result, TranslocationError};
use crate::filter::SamplePair;
use crate::overlap::IndividualOverlap;
use crate::test::{compare_groups, signed_rank_test, WilcoxonResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which Wilcoxon variant produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    RankSum,
    SignedRank,
}

impl TestKind {
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::RankSum => "rank-sum",
            TestKind::SignedRank => "signed-rank",
        }
    }
}

/// One bracket on a boxplot: a metric compared between two groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceTest {
    /// Figure number the test annotates.
    pub figure: u8,
    /// Compared quantity, e.g. `percent_of_feces` or `shannon`.
    pub metric: String,
    /// Subset the groups are drawn from, e.g. `stool` or `paired`.
    pub scope: String,
    pub group_a: String,
    pub group_b: String,
    pub kind: TestKind,
    pub result: WilcoxonResult,
}

/// Healthy vs Crohn's comparisons of the per-individual overlap percentages.
///
/// Skipped when fewer than two disease groups are present.
pub fn overlap_tests(individuals: &[IndividualOverlap]) -> Result<Vec<SignificanceTest>> {
    let metrics: [(&str, fn(&IndividualOverlap) -> f64); 2] = [
        ("percent_of_feces", |o| o.percent_of_feces),
        ("percent_of_blood", |o| o.percent_of_blood),
    ];

    let mut tests = Vec::new();
    for (metric, value) in metrics {
        let observations: Vec<(&str, f64)> = individuals
            .iter()
            .map(|o| (o.disease.name(), value(o)))
            .collect();
        for comparison in compare_groups(&observations)? {
            tests.push(SignificanceTest {
                figure: 5,
                metric: metric.to_string(),
                scope: "paired".to_string(),
                group_a: comparison.group_a,
                group_b: comparison.group_b,
                kind: TestKind::RankSum,
                result: comparison.result,
            });
        }
    }
    Ok(tests)
}

/// Shannon diversity comparisons.
///
/// Within each compartment, Healthy vs Crohn's by rank-sum; across
/// compartments, stool vs blood of the same individual by signed-rank over
/// the complete pairs.
pub fn diversity_tests(
    diversity: &[SampleDiversity],
    pairs: &[SamplePair],
) -> Result<Vec<SignificanceTest>> {
    let mut tests = Vec::new();

    for compartment in [Compartment::Stool, Compartment::Blood] {
        let observations: Vec<(&str, f64)> = diversity
            .iter()
            .filter(|d| d.compartment == compartment)
            .map(|d| (d.disease.name(), d.shannon))
            .collect();
        for comparison in compare_groups(&observations)? {
            tests.push(SignificanceTest {
                figure: 6,
                metric: "shannon".to_string(),
                scope: compartment.name().to_string(),
                group_a: comparison.group_a,
                group_b: comparison.group_b,
                kind: TestKind::RankSum,
                result: comparison.result,
            });
        }
    }

    if !pairs.is_empty() {
        let by_sample: HashMap<&str, f64> = diversity
            .iter()
            .map(|d| (d.sample_id.as_str(), d.shannon))
            .collect();
        let lookup = |sample_id: &str| {
            by_sample.get(sample_id).copied().ok_or_else(|| {
                TranslocationError::key_mismatch("pairing", "diversity", &[sample_id.to_string()])
            })
        };
        let stool = pairs
            .iter()
            .map(|p| lookup(&p.stool))
            .collect::<Result<Vec<f64>>>()?;
        let blood = pairs
            .iter()
            .map(|p| lookup(&p.blood))
            .collect::<Result<Vec<f64>>>()?;

        tests.push(SignificanceTest {
            figure: 6,
            metric: "shannon".to_string(),
            scope: "paired".to_string(),
            group_a: Compartment::Stool.name().to_string(),
            group_b: Compartment::Blood.name().to_string(),
            kind: TestKind::SignedRank,
            result: signed_rank_test(&stool, &blood)?,
        });
    }

    Ok(tests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Disease;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample(sample_id: &str, disease: Disease, shannon: f64) -> SampleDiversity {
        let (individual, suffix) = sample_id.split_at(sample_id.len() - 2);
        SampleDiversity {
            sample_id: sample_id.to_string(),
            individual: individual.to_string(),
            compartment: if suffix == "_F" {
                Compartment::Stool
            } else {
                Compartment::Blood
            },
            disease,
            shannon,
            richness: 1,
        }
    }

    #[test]
    fn test_overlap_tests_per_metric() {
        let individuals = vec![
            IndividualOverlap::new("P1", Disease::Healthy, set(&["A", "B"]), set(&["A"])),
            IndividualOverlap::new("P2", Disease::Healthy, set(&["A", "B"]), set(&["C"])),
            IndividualOverlap::new("P3", Disease::Crohns, set(&["A"]), set(&["A", "B"])),
        ];
        let tests = overlap_tests(&individuals).unwrap();

        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].metric, "percent_of_feces");
        assert_eq!(tests[1].metric, "percent_of_blood");
        assert!(tests.iter().all(|t| t.figure == 5 && t.kind == TestKind::RankSum));
        assert_eq!(tests[0].result.n_x + tests[0].result.n_y, 3);
    }

    #[test]
    fn test_overlap_tests_single_group() {
        let individuals = vec![IndividualOverlap::new(
            "P1",
            Disease::Healthy,
            set(&["A"]),
            set(&["A"]),
        )];
        assert!(overlap_tests(&individuals).unwrap().is_empty());
    }

    #[test]
    fn test_diversity_tests() {
        let diversity = vec![
            sample("P1_F", Disease::Healthy, 2.0),
            sample("P1_B", Disease::Healthy, 1.0),
            sample("P2_F", Disease::Crohns, 1.5),
            sample("P2_B", Disease::Crohns, 0.5),
            sample("P3_F", Disease::Crohns, 1.8),
        ];
        let pairs = vec![
            SamplePair {
                individual: "P1".into(),
                stool: "P1_F".into(),
                blood: "P1_B".into(),
            },
            SamplePair {
                individual: "P2".into(),
                stool: "P2_F".into(),
                blood: "P2_B".into(),
            },
        ];
        let tests = diversity_tests(&diversity, &pairs).unwrap();

        assert_eq!(tests.len(), 3);
        assert_eq!(tests[0].scope, "stool");
        assert_eq!(tests[0].result.n_x + tests[0].result.n_y, 3);
        assert_eq!(tests[1].scope, "blood");

        let paired = &tests[2];
        assert_eq!(paired.kind, TestKind::SignedRank);
        assert_eq!(paired.group_a, "stool");
        assert_eq!(paired.result.n_x, 2);
        assert_eq!(paired.result.statistic, 3.0);
    }
}
