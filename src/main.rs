mod analysis;
mod common;
mod parsing;

use argh::FromArgs;
use common::plots::PlotSettings;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// Import analysis functions
use analysis::{
    generate_aggregated_analysis, generate_aggregated_plot, generate_domain_plots,
    prepare_observations,
};

// Import parsing functionality
use parsing::load_records;

/// Experiment results read when no `--paths` are given
const DEFAULT_RESULTS_PATH: &str = "../output/results.json";

/// Reference results read when no `--paths-to-base` are given
const DEFAULT_BASE_RESULTS_PATH: &str = "../output/base_results.json";

/// Directory the plots and summaries are written to by default
const DEFAULT_OUTPUT_DIR: &str = "../output";

/// Plots goal achievement time of real-time search experiments as a factor of the A* optimum
#[derive(FromArgs, Debug)]
pub struct Args {
    /// path to experiment results JSON, optionally .gz or .zst compressed; repeatable (default: ../output/results.json)
    #[argh(option, short = 'p')]
    paths: Vec<PathBuf>,

    /// path to base results JSON holding the A* reference runs; repeatable (default: ../output/base_results.json)
    #[argh(option, short = 'b')]
    paths_to_base: Vec<PathBuf>,

    /// generate a plot for each domain individually (primarily for debugging)
    #[argh(switch, short = 'i')]
    individual: bool,

    /// title for the plot, also names the output files; ignored for individual plots (default: Experiments)
    #[argh(option, short = 't', default = "String::from(\"Experiments\")")]
    title: String,

    /// directory the plots and summaries are written to (default: ../output)
    #[argh(option, short = 'o', default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    output: PathBuf,

    /// width of the rendered plots in pixels (default: 1200)
    #[argh(option, default = "1200")]
    width: u32,

    /// height of the rendered plots in pixels (default: 800)
    #[argh(option, default = "800")]
    height: u32,

    /// print debug diagnostics to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

impl Args {
    /// Experiment result files, falling back to the default location
    fn result_paths(&self) -> Vec<PathBuf> {
        or_default(&self.paths, DEFAULT_RESULTS_PATH)
    }

    /// Reference result files, falling back to the default location
    fn base_paths(&self) -> Vec<PathBuf> {
        or_default(&self.paths_to_base, DEFAULT_BASE_RESULTS_PATH)
    }

    fn plot_settings(&self) -> PlotSettings {
        PlotSettings {
            width: self.width,
            height: self.height,
            ..PlotSettings::default()
        }
    }
}

fn or_default(paths: &[PathBuf], default: &str) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![PathBuf::from(default)]
    } else {
        paths.to_vec()
    }
}

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Parsing error: {0}")]
    Parsing(#[from] parsing::ParsingError),

    #[error("No experiment could be matched with an A* reference run")]
    NoScoredObservations,

    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Aggregated analysis error: {0}")]
    Aggregate(#[from] analysis::aggregate::AggregateError),

    #[error("Domain plot error: {0}")]
    DomainPlot(#[from] common::PlotError),
}

type Result<T> = core::result::Result<T, AnalysisError>;

/// Initialize tracing subscriber for diagnostics on stderr
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_tracing(args.verbose);
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let paths = args.result_paths();
    let base_paths = args.base_paths();

    println!(
        "📥 Loading {} result file(s)",
        paths.len() + base_paths.len()
    );
    let records = load_records(&paths, &base_paths)?;

    let prepared = prepare_observations(records);
    let summary = prepared.summary;
    println!(
        "📊 {} records: {} failed, {} malformed, {} without A* reference, {} scored rows",
        summary.records,
        summary.failed,
        summary.malformed,
        summary.without_reference,
        summary.scored
    );

    if prepared.scored.is_empty() {
        return Err(AnalysisError::NoScoredObservations);
    }

    create_output_dir(&args.output)?;
    let settings = args.plot_settings();

    if args.individual {
        let written = generate_domain_plots(&prepared.scored, &args.output, &settings)?;
        println!(
            "🖼️  Wrote {} domain plot(s) to {}",
            written.len(),
            args.output.display()
        );
    } else {
        let outputs = generate_aggregated_analysis(&prepared.scored, &args.title, &args.output)?;
        println!("📄 Report: {}", outputs.report.display());
        println!("📄 CPU time: {}", outputs.cpu_csv.display());

        let plot = generate_aggregated_plot(&prepared.scored, &args.title, &args.output, &settings)?;
        println!("🖼️  Plot: {}", plot.display());
    }

    Ok(())
}

fn create_output_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| AnalysisError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}
