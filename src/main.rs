//! `skill-clusters`: cluster a skills inventory from the command line.
//!
//! ```text
//! skill-clusters --input records.jsonl --output-dir results/ --k-min 3 --k-max 7
//! skill-clusters --input skills_inventory.csv
//! ```
//!
//! Inputs ending in `.csv` are read as headed CSV; anything else as JSON lines.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use skill_clusters::io::{CsvSource, DirectorySink, JsonLinesSource};
use skill_clusters::{ClusteringConfig, DataSource, Pipeline};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skill-clusters")]
#[command(about = "Group skills by headcount, proficiency and experience")]
struct Args {
    /// Raw employee-skill records: `.csv` or JSON lines.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the timestamped result files.
    #[arg(short, long, default_value = "results")]
    output_dir: PathBuf,

    /// TOML config file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Smallest candidate cluster count.
    #[arg(long)]
    k_min: Option<usize>,

    /// Largest candidate cluster count.
    #[arg(long)]
    k_max: Option<usize>,

    /// Random seed for reproducibility.
    #[arg(long)]
    seed: Option<u64>,

    /// Lloyd iteration cap per k-means run.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> anyhow::Result<ClusteringConfig> {
        let mut config = match &self.config {
            Some(path) => ClusteringConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ClusteringConfig::default(),
        };
        if let Some(k) = self.k_min {
            config.k_min = k;
        }
        if let Some(k) = self.k_max {
            config.k_max = k;
        }
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }
        if let Some(n) = self.max_iterations {
            config.max_iterations = n;
        }
        Ok(config)
    }
}

fn source_for(path: &Path) -> Box<dyn DataSource> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvSource::new(path))
    } else {
        Box::new(JsonLinesSource::new(path))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let pipeline = Pipeline::new(args.config()?).context("invalid configuration")?;
    let mut source = source_for(&args.input);
    let mut sink = DirectorySink::new(&args.output_dir);

    let output = pipeline
        .run(source.as_mut(), &mut sink)
        .with_context(|| format!("clustering {}", args.input.display()))?;

    let body = json!({
        "message": "Clustering completed successfully",
        "num_clusters": output.summary.num_clusters,
        "num_skills": output.summary.num_skills,
        "quality_score": output.summary.quality_score,
        "run_timestamp": output.summary.run_timestamp,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
