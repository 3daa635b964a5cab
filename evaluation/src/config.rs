use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Three-regime estimator with linear counting and large range correction
    Classic,
    /// LogLog-Beta polynomial bias correction
    Beta,
}

/// Parameters shared by every experiment.
#[derive(Debug, Clone, Args, Serialize)]
pub struct ExperimentConfig {
    /// Precision parameter b of the main experiment (m = 2^b registers)
    #[arg(short, long, default_value_t = 10)]
    pub precision: u32,

    /// Seed of the MurmurHash3 function shared by all sketches
    #[arg(long, default_value_t = 42)]
    pub hash_seed: u32,

    /// Number of distinct items in each stream
    #[arg(short, long, default_value_t = 5000)]
    pub unique: usize,

    /// Total stream length
    #[arg(short, long, default_value_t = 20000)]
    pub total: usize,

    /// Number of independent streams
    #[arg(short, long, default_value_t = 10)]
    pub streams: usize,

    /// Prefix fraction step
    #[arg(long, default_value_t = 0.1)]
    pub step: f64,

    /// Precisions visited by the precision sweep (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "4,6,8,10")]
    pub precisions: Vec<u32>,

    #[arg(short, long, value_enum, default_value_t = EstimatorKind::Classic)]
    pub estimator: EstimatorKind,

    /// Directory receiving the CSV and JSON reports
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            precision: 10,
            hash_seed: 42,
            unique: 5000,
            total: 20000,
            streams: 10,
            step: 0.1,
            precisions: vec![4, 6, 8, 10],
            estimator: EstimatorKind::Classic,
            output: PathBuf::from("results"),
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.unique == 0 {
            return Err(EvalError::InvalidConfig("unique must be positive"));
        }
        if self.total < self.unique {
            return Err(EvalError::InvalidConfig("total must be at least unique"));
        }
        if self.streams == 0 {
            return Err(EvalError::InvalidConfig("streams must be positive"));
        }
        if !(self.step > 0.0 && self.step <= 1.0) {
            return Err(EvalError::InvalidConfig("step must be in (0, 1]"));
        }
        Ok(())
    }
}
