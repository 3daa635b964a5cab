mod config;
mod error;
mod experiment;
mod report;
mod stats;
mod stream;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, Level};

use crate::config::ExperimentConfig;
use crate::error::EvalError;

#[derive(Parser)]
#[command(name = "hll-eval")]
#[command(about = "run HyperLogLog accuracy experiments")]
struct Cli {
    /// Worker threads for running streams in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    config: ExperimentConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate growing prefixes of several streams at one precision
    Run,
    /// Whole-stream error for each precision of the sweep
    Precision,
    /// Both experiments plus a JSON summary (default)
    All,
}

fn run(config: &ExperimentConfig) -> Result<(), EvalError> {
    info!(b = config.precision, "main experiment");
    let results = experiment::run_all(config)?;
    let stats = stats::compute_statistics(&results);
    report::save_experiment(&config.output, &results, &stats)?;
    Ok(())
}

fn precision(config: &ExperimentConfig) -> Result<(), EvalError> {
    info!(precisions = ?config.precisions, "precision sweep");
    let results = experiment::investigate_precision(config)?;
    report::save_precision(&config.output, &results)?;
    Ok(())
}

fn all(config: &ExperimentConfig) -> Result<(), EvalError> {
    info!(precisions = ?config.precisions, "precision sweep");
    let sweep = experiment::investigate_precision(config)?;
    report::save_precision(&config.output, &sweep)?;

    info!(b = config.precision, "main experiment");
    let results = experiment::run_all(config)?;
    let stats = stats::compute_statistics(&results);
    report::save_experiment(&config.output, &results, &stats)?;

    report::save_summary(&config.output, config, &stats, &sweep)?;
    info!(dir = %config.output.display(), "results saved");
    Ok(())
}

fn main() -> Result<(), EvalError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs)
        .build_global()?;

    cli.config.validate()?;

    match cli.command.unwrap_or(Commands::All) {
        Commands::Run => run(&cli.config),
        Commands::Precision => precision(&cli.config),
        Commands::All => all(&cli.config),
    }
}
