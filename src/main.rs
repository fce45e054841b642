use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use csbfinder::{
    catalog, io, pipeline, ClusterBy, ClusterConfig, DiscoveryConfig, OrientationMode, OutputFormat, RunConfig,
    ScoreWeights,
};

/// Discover conserved syntenic blocks (CSBs) across a set of genomes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genome file (`>genome`, `#replicon`, one `family<TAB>strand` per line; .gz accepted)
    genomes: PathBuf,

    /// Minimum number of genomes (or occurrences) supporting a CSB
    #[arg(short = 'q', long, default_value_t = 1)]
    quorum: usize,

    /// Minimum support counting exact instances only (default: 1)
    #[arg(long, default_value_t = 1)]
    quorum_exact: usize,

    /// Pattern symbols allowed to be missing from an instance
    #[arg(long, default_value_t = 0)]
    insertions: usize,

    /// Substitutions allowed per instance
    #[arg(long, default_value_t = 0)]
    errors: usize,

    /// Wildcard positions allowed per pattern
    #[arg(long, default_value_t = 0)]
    wildcards: usize,

    /// Extra genome symbols allowed inside an instance
    #[arg(long, default_value_t = 0)]
    deletions: usize,

    #[arg(long, default_value_t = 2)]
    min_length: usize,

    /// Maximum CSB length (default: unbounded)
    #[arg(long)]
    max_length: Option<usize>,

    /// Count every occurrence toward quorum, not one per genome
    #[arg(long)]
    no_one_per_genome: bool,

    /// Split replicons into same-strand runs before indexing
    #[arg(long, conflicts_with = "stranded")]
    directons: bool,

    /// Keep gene orientation as part of each symbol
    #[arg(long)]
    stranded: bool,

    /// Search only for the patterns listed in this file
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Functional category table (`family<TAB>letters<TAB>description`)
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Minimum similarity for two CSBs to share a family
    #[arg(long, default_value_t = 0.8)]
    threshold: f64,

    /// Family representative criterion: length or score
    #[arg(long, default_value_t = ClusterBy::Score)]
    cluster_by: ClusterBy,

    /// Dataset name used in catalog file names
    #[arg(long, default_value = "dataset")]
    dataset: String,

    /// Catalog format: txt or json
    #[arg(long, default_value = "txt")]
    output_format: OutputFormat,

    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Drop per-instance detail once a CSB is final
    #[arg(long)]
    memory_saving: bool,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

impl Args {
    fn orientation(&self) -> OrientationMode {
        if self.directons {
            OrientationMode::Directons
        } else if self.stranded {
            OrientationMode::Stranded
        } else {
            OrientationMode::Unstranded
        }
    }

    fn run_config(&self) -> RunConfig {
        RunConfig {
            discovery: DiscoveryConfig {
                max_error: self.errors,
                max_wildcards: self.wildcards,
                max_insertion: self.insertions,
                max_deletion: self.deletions,
                quorum1: self.quorum_exact,
                quorum2: self.quorum,
                min_pattern_length: self.min_length,
                max_pattern_length: self.max_length,
                one_instance_per_genome: !self.no_one_per_genome,
                memory_saving_mode: self.memory_saving,
            },
            clustering: ClusterConfig {
                threshold: self.threshold,
                cluster_by: self.cluster_by,
            },
            weights: ScoreWeights::default(),
            dataset_name: self.dataset.clone(),
            output_format: self.output_format,
        }
    }
}

fn main() {
    let args = Args::parse();
    let log_level = if args.trace {
        LevelFilter::Trace
    } else if args.debug {
        LevelFilter::Debug
    } else if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(log_level).init();

    if let Err(error) = run_pipeline(&args) {
        eprintln!("CSB discovery failed: {error:?}");
        std::process::exit(1);
    }
}

fn run_pipeline(args: &Args) -> Result<()> {
    let config = args.run_config();
    config.validate().context("Invalid parameters")?;

    let mode = args.orientation();
    info!("genomes: {}", args.genomes.display());
    let mut store = io::load_genomes(&args.genomes, mode)
        .with_context(|| format!("Failed to load genomes from {}", args.genomes.display()))?;
    if store.is_empty() {
        bail!("No genomes found in {}", args.genomes.display());
    }

    let input_patterns = match &args.patterns {
        Some(path) => {
            let patterns = io::load_pattern_list(path, store.alphabet_mut())
                .with_context(|| format!("Failed to load patterns from {}", path.display()))?;
            Some(
                patterns
                    .into_iter()
                    .map(|p| p.into_iter().map(|s| mode.normalize(s)).collect())
                    .collect(),
            )
        }
        None => None,
    };

    let categories = args
        .categories
        .as_deref()
        .map(|path: &Path| {
            io::load_functional_category_table(path)
                .with_context(|| format!("Failed to load categories from {}", path.display()))
        })
        .transpose()?;

    let run = pipeline::run(store, categories, input_patterns, &config).context("CSB discovery failed")?;
    info!(
        "Found {} CSBs in {} families ({} warnings)",
        run.pattern_count(),
        run.families().len(),
        run.warnings().len()
    );

    let output = catalog::write_catalog(&run, &args.output_dir, &config)
        .with_context(|| format!("Failed to write catalog to {}", args.output_dir.display()))?;
    if !output.warnings.is_empty() {
        info!("{} warnings while resolving catalog instances", output.warnings.len());
    }
    for path in output.paths {
        println!("{}", path.display());
    }
    Ok(())
}
