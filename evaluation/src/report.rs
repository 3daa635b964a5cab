//! CSV and JSON export of experiment results.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::ExperimentConfig;
use crate::error::EvalError;
use crate::experiment::{PrecisionResult, StreamResults};
use crate::stats::StepStatistics;

pub fn write_results<W: Write>(mut writer: W, results: &[StreamResults]) -> io::Result<()> {
    writeln!(
        writer,
        "stream_seed,fraction,stream_size,exact,hll_estimate,relative_error"
    )?;
    for res in results {
        for step in &res.steps {
            writeln!(
                writer,
                "{},{:.4},{},{},{:.2},{:.6}",
                res.seed,
                step.fraction,
                step.stream_size,
                step.exact,
                step.estimate,
                step.relative_error
            )?;
        }
    }
    Ok(())
}

pub fn write_statistics<W: Write>(mut writer: W, stats: &[StepStatistics]) -> io::Result<()> {
    writeln!(
        writer,
        "fraction,mean_exact,mean_estimate,std_estimate,mean_relative_error"
    )?;
    for s in stats {
        writeln!(
            writer,
            "{:.4},{:.2},{:.2},{:.2},{:.6}",
            s.fraction, s.mean_exact, s.mean_estimate, s.std_estimate, s.mean_relative_error
        )?;
    }
    Ok(())
}

pub fn write_precision<W: Write>(mut writer: W, results: &[PrecisionResult]) -> io::Result<()> {
    writeln!(
        writer,
        "B,m,mean_relative_error,std_relative_error,theoretical_1042,theoretical_132"
    )?;
    for r in results {
        writeln!(
            writer,
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            r.b,
            r.m,
            r.mean_relative_error,
            r.std_relative_error,
            r.theoretical_104,
            r.theoretical_130
        )?;
    }
    Ok(())
}

/// Plot-friendly view of one stream: `n,actual,estimated,error`.
pub fn write_single_simple<W: Write>(mut writer: W, res: &StreamResults) -> io::Result<()> {
    writeln!(writer, "n,actual,estimated,error")?;
    for step in &res.steps {
        writeln!(
            writer,
            "{},{},{},{}",
            step.stream_size, step.exact, step.estimate, step.relative_error
        )?;
    }
    Ok(())
}

/// Plot-friendly view of the per-step means: `fraction,actual,estimated,error`.
pub fn write_averaged_simple<W: Write>(mut writer: W, stats: &[StepStatistics]) -> io::Result<()> {
    writeln!(writer, "fraction,actual,estimated,error")?;
    for s in stats {
        writeln!(
            writer,
            "{},{},{},{}",
            s.fraction, s.mean_exact, s.mean_estimate, s.mean_relative_error
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct Summary<'a> {
    config: &'a ExperimentConfig,
    statistics: &'a [StepStatistics],
    precision: &'a [PrecisionResult],
}

pub fn write_summary<W: Write>(
    writer: W,
    config: &ExperimentConfig,
    statistics: &[StepStatistics],
    precision: &[PrecisionResult],
) -> serde_json::Result<()> {
    let summary = Summary {
        config,
        statistics,
        precision,
    };
    serde_json::to_writer_pretty(writer, &summary)
}

fn create(dir: &Path, name: &str) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(dir.join(name))?))
}

fn finish<W: Write>(mut writer: W) -> io::Result<()> {
    writer.flush()
}

/// Writes the main experiment reports into `dir`, creating it when missing.
pub fn save_experiment(
    dir: &Path,
    results: &[StreamResults],
    stats: &[StepStatistics],
) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let mut w = create(dir, "main_results.csv")?;
    write_results(&mut w, results)?;
    finish(w)?;

    let mut w = create(dir, "statistics.csv")?;
    write_statistics(&mut w, stats)?;
    finish(w)?;

    let mut w = create(dir, "averaged_simple.csv")?;
    write_averaged_simple(&mut w, stats)?;
    finish(w)?;

    if let Some(first) = results.first() {
        let mut w = create(dir, "single_stream.csv")?;
        write_results(&mut w, std::slice::from_ref(first))?;
        finish(w)?;

        let mut w = create(dir, "single_stream_simple.csv")?;
        write_single_simple(&mut w, first)?;
        finish(w)?;
    }

    info!(dir = %dir.display(), streams = results.len(), "saved experiment results");
    Ok(())
}

pub fn save_precision(dir: &Path, results: &[PrecisionResult]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut w = create(dir, "b_investigation.csv")?;
    write_precision(&mut w, results)?;
    finish(w)?;
    info!(dir = %dir.display(), precisions = results.len(), "saved precision sweep");
    Ok(())
}

/// Writes `summary.json` into `dir`, flushing before reporting success.
pub fn save_summary(
    dir: &Path,
    config: &ExperimentConfig,
    stats: &[StepStatistics],
    precision: &[PrecisionResult],
) -> Result<(), EvalError> {
    fs::create_dir_all(dir)?;
    let mut w = create(dir, "summary.json")?;
    write_summary(&mut w, config, stats, precision)?;
    finish(w)?;
    info!(dir = %dir.display(), "saved summary");
    Ok(())
}
