//! phagetx - phage translocation figure tables
//!
//! Command-line interface for preparing the stool/blood virome tables.

use clap::{Parser, Subcommand, ValueEnum};
use phage_translocation::data::{Dataset, InputPaths};
use phage_translocation::error::Result;
use phage_translocation::logging::init_logging;
use phage_translocation::pipeline::{Pipeline, PipelineConfig};
use phage_translocation::profile::profile_dataset;
use std::path::{Path, PathBuf};

/// Output format for the profile command.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Phage translocation data preparation
#[derive(Parser)]
#[command(name = "phagetx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline from a YAML configuration file
    Run {
        /// Path to pipeline configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the tab-delimited abundance table
        #[arg(short, long)]
        abundance: PathBuf,

        /// Path to the comma-delimited taxonomy table
        #[arg(short, long)]
        taxonomy: PathBuf,

        /// Path to the semicolon-delimited sample metadata
        #[arg(short, long)]
        metadata: PathBuf,

        /// Output directory for the figure tables
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Profile the input tables
    Profile {
        /// Path to the tab-delimited abundance table
        #[arg(short, long)]
        abundance: PathBuf,

        /// Path to the comma-delimited taxonomy table
        #[arg(short, long)]
        taxonomy: PathBuf,

        /// Path to the semicolon-delimited sample metadata
        #[arg(short, long)]
        metadata: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate an example pipeline configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "pipeline.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            abundance,
            taxonomy,
            metadata,
            output,
        } => cmd_run(&config, &InputPaths::new(abundance, taxonomy, metadata), &output),

        Commands::Profile {
            abundance,
            taxonomy,
            metadata,
            format,
        } => cmd_profile(&InputPaths::new(abundance, taxonomy, metadata), format),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run the pipeline from configuration
fn cmd_run(config_path: &Path, paths: &InputPaths, output_dir: &Path) -> Result<()> {
    eprintln!("Loading pipeline configuration from {:?}...", config_path);
    let config_str = std::fs::read_to_string(config_path)?;
    let config = PipelineConfig::from_yaml(&config_str)?;

    eprintln!("Loading data...");
    let dataset = Dataset::load(paths)?;
    eprintln!(
        "Loaded {} vOTUs x {} samples",
        dataset.abundance().n_taxa(),
        dataset.abundance().n_samples()
    );

    eprintln!("Running pipeline '{}'...", config.name);
    let report = Pipeline::from_config(&config).run(&dataset)?;

    eprintln!("Writing figure tables to {:?}...", output_dir);
    let written = report.write_dir(output_dir)?;

    eprintln!("Done! {} files written", written.len());
    eprintln!(
        "  {} individuals with both samples, {} taxa shared between stool and blood",
        report.individuals.len(),
        report.venn.shared
    );
    for test in &report.tests {
        eprintln!(
            "  Fig {} {} [{}] {} vs {}: p = {:.4}",
            test.figure, test.metric, test.scope, test.group_a, test.group_b, test.result.p_value
        );
    }

    Ok(())
}

/// Profile the input tables
fn cmd_profile(paths: &InputPaths, format: OutputFormat) -> Result<()> {
    eprintln!("Loading data...");
    let dataset = Dataset::load(paths)?;
    let profile = profile_dataset(&dataset)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&profile)?),
        OutputFormat::Text => print!("{}", profile),
    }

    Ok(())
}

/// Write an example configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let pipeline = Pipeline::new()
        .name("example-translocation")
        .exclude_samples(&["P12_B", "P30_F"]);

    let config = pipeline.to_config(Some(
        "Stool/blood phage overlap with low-depth samples excluded",
    ));
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example pipeline to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
