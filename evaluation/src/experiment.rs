use hll_sketch::{
    ClassicEstimator, Estimator, HashFunction, HyperLogLog, LogLogBetaEstimator, Murmur3Hash,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{EstimatorKind, ExperimentConfig};
use crate::error::EvalError;
use crate::stats::mean_std;
use crate::stream::{exact_count, StreamGenerator};

// Stream seeds of the main experiment and of the precision sweep
const RUN_SEED_BASE: u64 = 100;
const SWEEP_SEED_BASE: u64 = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub fraction: f64,
    pub stream_size: usize,
    pub exact: usize,
    pub estimate: f64,
    pub relative_error: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamResults {
    pub seed: u64,
    pub unique_pool: usize,
    pub total_size: usize,
    pub steps: Vec<StepResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrecisionResult {
    pub b: u32,
    pub m: usize,
    pub mean_relative_error: f64,
    pub std_relative_error: f64,
    pub theoretical_104: f64,
    pub theoretical_130: f64,
}

impl EstimatorKind {
    fn strategy(self) -> &'static (dyn Estimator + Sync) {
        match self {
            EstimatorKind::Classic => &ClassicEstimator,
            EstimatorKind::Beta => &LogLogBetaEstimator,
        }
    }
}

pub fn relative_error(estimate: f64, exact: usize) -> f64 {
    if exact == 0 {
        0.0
    } else {
        (estimate - exact as f64).abs() / exact as f64
    }
}

fn generate(config: &ExperimentConfig, seed: u64) -> Result<StreamGenerator, EvalError> {
    let mut gen =
        StreamGenerator::new(config.unique, config.total, seed).map_err(EvalError::InvalidConfig)?;
    gen.generate();
    Ok(gen)
}

/// Estimates every prefix of one stream, reusing a single sketch.
pub fn run_experiment<H: HashFunction>(
    config: &ExperimentConfig,
    hash: H,
    stream_seed: u64,
) -> Result<StreamResults, EvalError> {
    let gen = generate(config, stream_seed)?;
    let estimator = config.estimator.strategy();
    let mut hll = HyperLogLog::with_hash(config.precision, hash)?;

    let steps = StreamGenerator::make_fractions(config.step)
        .into_iter()
        .map(|fraction| {
            let prefix = gen.prefix(fraction);
            let exact = exact_count(prefix);

            hll.reset();
            for item in prefix {
                hll.add(item);
            }
            let estimate = hll.estimate_with(estimator);

            StepResult {
                fraction,
                stream_size: prefix.len(),
                exact,
                estimate,
                relative_error: relative_error(estimate, exact),
            }
        })
        .collect();

    Ok(StreamResults {
        seed: stream_seed,
        unique_pool: config.unique,
        total_size: gen.total_size(),
        steps,
    })
}

/// Runs the main experiment over `config.streams` streams in parallel.
pub fn run_all(config: &ExperimentConfig) -> Result<Vec<StreamResults>, EvalError> {
    let hash = Murmur3Hash::new(config.hash_seed);
    let results = (0..config.streams)
        .into_par_iter()
        .map(|i| run_experiment(config, &hash, RUN_SEED_BASE + i as u64))
        .collect::<Result<Vec<_>, _>>()?;

    for (i, res) in results.iter().enumerate() {
        if let Some(last) = res.steps.last() {
            info!(
                stream = i,
                seed = res.seed,
                exact = last.exact,
                estimate = format_args!("{:.1}", last.estimate),
                relative_error = format_args!("{:.4}", last.relative_error),
                "stream finished"
            );
        }
    }
    Ok(results)
}

/// Whole-stream relative error across precisions.
pub fn investigate_precision(config: &ExperimentConfig) -> Result<Vec<PrecisionResult>, EvalError> {
    let hash = Murmur3Hash::new(config.hash_seed);
    let estimator = config.estimator.strategy();

    let streams = (0..config.streams)
        .into_par_iter()
        .map(|i| -> Result<_, EvalError> {
            let gen = generate(config, SWEEP_SEED_BASE + i as u64)?;
            let exact = exact_count(gen.stream());
            Ok((gen, exact))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut results = Vec::with_capacity(config.precisions.len());
    for &b in &config.precisions {
        let errors = streams
            .par_iter()
            .map(|(gen, exact)| -> Result<f64, EvalError> {
                let mut hll = HyperLogLog::with_hash(b, &hash)?;
                for item in gen.stream() {
                    hll.add(item);
                }
                Ok(relative_error(hll.estimate_with(estimator), *exact))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let m = 1usize << b;
        let (mean, std) = mean_std(&errors);
        let res = PrecisionResult {
            b,
            m,
            mean_relative_error: mean,
            std_relative_error: std,
            theoretical_104: 1.04 / (m as f64).sqrt(),
            theoretical_130: 1.3 / (m as f64).sqrt(),
        };
        info!(
            b,
            m,
            mean_err = format_args!("{:.4}", res.mean_relative_error),
            std_err = format_args!("{:.4}", res.std_relative_error),
            theoretical = format_args!("{:.4}", res.theoretical_104),
            "precision finished"
        );
        results.push(res);
    }
    debug!(precisions = results.len(), "precision sweep done");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            precision: 10,
            unique: 800,
            total: 2_000,
            streams: 3,
            step: 0.25,
            precisions: vec![4, 8, 12],
            ..Default::default()
        }
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(110.0, 100), 0.1);
        assert_eq!(relative_error(90.0, 100), 0.1);
        assert_eq!(relative_error(5.0, 0), 0.0);
    }

    #[test]
    fn test_run_experiment_steps() {
        let config = small_config();
        let res = run_experiment(&config, Murmur3Hash::new(42), 100).unwrap();
        assert_eq!(res.seed, 100);
        assert_eq!(res.steps.len(), 4);
        assert_eq!(res.total_size, 2_000);

        let last = res.steps.last().unwrap();
        assert_eq!(last.fraction, 1.0);
        assert_eq!(last.stream_size, 2_000);
        assert!(last.exact <= 800);

        // prefixes grow, so exact counts never shrink
        for pair in res.steps.windows(2) {
            assert!(pair[0].stream_size < pair[1].stream_size);
            assert!(pair[0].exact <= pair[1].exact);
        }
        for step in &res.steps {
            assert!(step.relative_error < 0.2, "{step:?}");
        }
    }

    #[test]
    fn test_run_experiment_is_deterministic() {
        let config = small_config();
        let a = run_experiment(&config, Murmur3Hash::new(7), 101).unwrap();
        let b = run_experiment(&config, Murmur3Hash::new(7), 101).unwrap();
        for (x, y) in a.steps.iter().zip(&b.steps) {
            assert_eq!(x.estimate, y.estimate);
            assert_eq!(x.exact, y.exact);
        }
    }

    #[test]
    fn test_run_all_orders_streams() {
        let config = ExperimentConfig {
            estimator: EstimatorKind::Beta,
            ..small_config()
        };
        let results = run_all(&config).unwrap();
        let seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102]);
    }

    #[test]
    fn test_invalid_precision_is_reported() {
        let config = ExperimentConfig {
            precision: 20,
            ..small_config()
        };
        assert!(matches!(
            run_experiment(&config, Murmur3Hash::new(1), 1),
            Err(EvalError::Sketch(_))
        ));
    }

    #[test]
    fn test_investigate_precision() {
        let config = small_config();
        let results = investigate_precision(&config).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].b, 8);
        assert_eq!(results[1].m, 256);
        assert!((results[1].theoretical_104 - 0.065).abs() < 1e-12);
        assert!(results[2].mean_relative_error < 0.1);
    }
}
