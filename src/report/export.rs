//! Writing figure tables to a directory.

use super::{SignificanceTest, TranslocationReport};
use crate::aggregate::CategoryFrequencies;
use crate::error::Result;
use crate::filter::{SampleFilterResult, TaxonFilterResult};
use crate::overlap::VennCounts;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const FIG1_HOST_PHYLUM_ALL: &str = "fig1_host_phylum_all.tsv";
pub const FIG2_VENN: &str = "fig2_venn.tsv";
pub const FIG3_HOST_PHYLUM_SHARED: &str = "fig3_host_phylum_shared.tsv";
pub const FIG4_FAMILY_SHARED: &str = "fig4_family_shared.tsv";
pub const FIG5_INDIVIDUAL_OVERLAP: &str = "fig5_individual_overlap.tsv";
pub const FIG6_SHANNON: &str = "fig6_shannon.tsv";
pub const SIGNIFICANCE_TESTS: &str = "significance_tests.tsv";
pub const SUMMARY_JSON: &str = "summary.json";

/// Run-level summary written next to the figure tables.
#[derive(Debug, Serialize)]
struct ReportSummary<'a> {
    generated: String,
    version: &'static str,
    pipeline: &'a str,
    sample_filter: &'a SampleFilterResult,
    taxon_filter: &'a TaxonFilterResult,
    n_pairs: usize,
    orphans: &'a [String],
    venn: &'a VennCounts,
    n_individuals: usize,
    n_diversity_samples: usize,
    tests: &'a [SignificanceTest],
}

impl TranslocationReport {
    /// Write one TSV per figure, the significance tests and `summary.json`
    /// into `dir`, creating it if needed. Returns the written paths.
    pub fn write_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        let mut target = |name: &str| {
            let path = dir.join(name);
            written.push(path.clone());
            path
        };

        write_frequencies(&self.host_phylum_all, target(FIG1_HOST_PHYLUM_ALL))?;
        self.write_venn(target(FIG2_VENN))?;
        write_frequencies(&self.host_phylum_shared, target(FIG3_HOST_PHYLUM_SHARED))?;
        write_frequencies(&self.family_shared, target(FIG4_FAMILY_SHARED))?;
        self.write_individuals(target(FIG5_INDIVIDUAL_OVERLAP))?;
        self.write_diversity(target(FIG6_SHANNON))?;
        self.write_tests(target(SIGNIFICANCE_TESTS))?;
        self.write_summary(target(SUMMARY_JSON))?;

        info!(dir = %dir.display(), files = written.len(), "wrote figure tables");
        Ok(written)
    }

    fn write_venn(&self, path: PathBuf) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "region\tcount")?;
        writeln!(writer, "stool_only\t{}", self.venn.stool_only)?;
        writeln!(writer, "shared\t{}", self.venn.shared)?;
        writeln!(writer, "blood_only\t{}", self.venn.blood_only)?;
        writer.flush()?;
        Ok(())
    }

    fn write_individuals(&self, path: PathBuf) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "individual\tdisease\tfeces_count\tblood_count\tshared_count\tpercent_of_feces\tpercent_of_blood"
        )?;
        for o in &self.individuals {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}",
                o.individual,
                o.disease.name(),
                o.feces_count,
                o.blood_count,
                o.shared_count,
                o.percent_of_feces,
                o.percent_of_blood
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_diversity(&self, path: PathBuf) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "sample_id\tindividual\tcompartment\tdisease\tshannon\trichness")?;
        for d in &self.diversity {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{:.6}\t{}",
                d.sample_id,
                d.individual,
                d.compartment.name(),
                d.disease.name(),
                d.shannon,
                d.richness
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_tests(&self, path: PathBuf) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "figure\tmetric\tscope\tgroup_a\tgroup_b\ttest\tstatistic\tp_value\tn_a\tn_b"
        )?;
        for t in &self.tests {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4e}\t{}\t{}",
                t.figure,
                t.metric,
                t.scope,
                t.group_a,
                t.group_b,
                t.kind.name(),
                t.result.statistic,
                t.result.p_value,
                t.result.n_x,
                t.result.n_y
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_summary(&self, path: PathBuf) -> Result<()> {
        let summary = ReportSummary {
            generated: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            pipeline: &self.pipeline,
            sample_filter: &self.sample_filter,
            taxon_filter: &self.taxon_filter,
            n_pairs: self.pairing.n_pairs(),
            orphans: &self.pairing.orphans,
            venn: &self.venn,
            n_individuals: self.individuals.len(),
            n_diversity_samples: self.diversity.len(),
            tests: &self.tests,
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &summary)?;
        Ok(())
    }
}

fn write_frequencies(freq: &CategoryFrequencies, path: PathBuf) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "category\tcount\tpercent")?;
    for c in &freq.counts {
        writeln!(writer, "{}\t{}\t{:.4}", c.category, c.count, c.percent)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate_taxa, CategoryOrder};
    use crate::data::{Annotation, Compartment, Disease, TaxonomyTable};
    use crate::diversity::SampleDiversity;
    use crate::filter::Pairing;
    use crate::overlap::IndividualOverlap;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn create_test_report() -> TranslocationReport {
        let taxonomy = TaxonomyTable::from_reader(
            "id,Contaminant,Viral,Family,HostPhylum\nA,No,Yes,Microviridae,Bacteroidota\nB,No,Yes,NA,NA\n"
                .as_bytes(),
        )
        .unwrap();
        let all: BTreeSet<String> = ["A".to_string(), "B".to_string()].into();
        let shared: BTreeSet<String> = ["A".to_string()].into();
        let host = CategoryOrder::host_phyla();
        let families = CategoryOrder::families();

        TranslocationReport {
            pipeline: "test".to_string(),
            sample_filter: SampleFilterResult {
                n_before: 2,
                n_after: 2,
                removed_samples: vec![],
                unknown_exclusions: vec![],
            },
            taxon_filter: TaxonFilterResult {
                n_before: 2,
                n_after: 2,
                n_contaminant: 0,
                n_non_viral: 0,
            },
            pairing: Pairing::default(),
            host_phylum_all: aggregate_taxa(&all, &taxonomy, Annotation::HostPhylum, &host).unwrap(),
            venn: VennCounts {
                stool_only: 1,
                blood_only: 0,
                shared: 1,
            },
            host_phylum_shared: aggregate_taxa(&shared, &taxonomy, Annotation::HostPhylum, &host)
                .unwrap(),
            family_shared: aggregate_taxa(&shared, &taxonomy, Annotation::Family, &families).unwrap(),
            individuals: vec![IndividualOverlap::new("P1", Disease::Healthy, all.clone(), shared)],
            diversity: vec![SampleDiversity {
                sample_id: "P1_F".to_string(),
                individual: "P1".to_string(),
                compartment: Compartment::Stool,
                disease: Disease::Healthy,
                shannon: 2f64.ln(),
                richness: 2,
            }],
            tests: vec![],
        }
    }

    #[test]
    fn test_write_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("figures");
        let written = create_test_report().write_dir(&out).unwrap();

        assert_eq!(written.len(), 8);
        assert!(written.iter().all(|p| p.exists()));

        let fig1 = fs::read_to_string(out.join(FIG1_HOST_PHYLUM_ALL)).unwrap();
        let lines: Vec<&str> = fig1.lines().collect();
        assert_eq!(lines[0], "category\tcount\tpercent");
        assert_eq!(lines[1], "Bacteroidota\t1\t50.0000");
        assert_eq!(lines[4], "Unknown\t1\t50.0000");

        let fig2 = fs::read_to_string(out.join(FIG2_VENN)).unwrap();
        assert!(fig2.contains("shared\t1"));

        let fig5 = fs::read_to_string(out.join(FIG5_INDIVIDUAL_OVERLAP)).unwrap();
        assert_eq!(
            fig5.lines().nth(1).unwrap(),
            "P1\tHealthy\t2\t1\t1\t50.0000\t100.0000"
        );

        let fig6 = fs::read_to_string(out.join(FIG6_SHANNON)).unwrap();
        assert!(fig6.lines().nth(1).unwrap().starts_with("P1_F\tP1\tstool\tHealthy\t0.693147"));
    }

    #[test]
    fn test_summary_json() {
        let dir = tempdir().unwrap();
        create_test_report().write_dir(dir.path()).unwrap();

        let raw = fs::read_to_string(dir.path().join(SUMMARY_JSON)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["pipeline"], "test");
        assert_eq!(json["venn"]["shared"], 1);
        assert_eq!(json["n_individuals"], 1);
        assert!(json["generated"].as_str().unwrap().contains('T'));
    }
}
