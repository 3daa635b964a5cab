use serde::Serialize;

use crate::experiment::StreamResults;

/// Aggregate of one prefix fraction across all streams.
#[derive(Debug, Clone, Serialize)]
pub struct StepStatistics {
    pub fraction: f64,
    pub mean_exact: f64,
    pub mean_estimate: f64,
    pub std_estimate: f64,
    pub mean_relative_error: f64,
}

/// Mean and population standard deviation; `(0, 0)` for no values.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Per-step statistics; every stream must have the same number of steps.
pub fn compute_statistics(results: &[StreamResults]) -> Vec<StepStatistics> {
    let Some(first) = results.first() else {
        return Vec::new();
    };
    let n = results.len() as f64;

    (0..first.steps.len())
        .map(|s| {
            let steps: Vec<_> = results.iter().map(|r| &r.steps[s]).collect();
            let estimates: Vec<f64> = steps.iter().map(|step| step.estimate).collect();
            let (mean_estimate, std_estimate) = mean_std(&estimates);
            StepStatistics {
                fraction: first.steps[s].fraction,
                mean_exact: steps.iter().map(|step| step.exact as f64).sum::<f64>() / n,
                mean_estimate,
                std_estimate,
                mean_relative_error: steps.iter().map(|step| step.relative_error).sum::<f64>() / n,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::StepResult;

    fn stream(seed: u64, estimates: &[(usize, f64)]) -> StreamResults {
        StreamResults {
            seed,
            unique_pool: 10,
            total_size: 20,
            steps: estimates
                .iter()
                .enumerate()
                .map(|(i, &(exact, estimate))| StepResult {
                    fraction: (i + 1) as f64 / estimates.len() as f64,
                    stream_size: 10 * (i + 1),
                    exact,
                    estimate,
                    relative_error: (estimate - exact as f64).abs() / exact as f64,
                })
                .collect(),
        }
    }

    #[test]
    fn test_mean_std() {
        assert_eq!(mean_std(&[]), (0.0, 0.0));
        assert_eq!(mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), (5.0, 2.0));
    }

    #[test]
    fn test_compute_statistics() {
        let results = vec![
            stream(1, &[(4, 5.0), (8, 8.0)]),
            stream(2, &[(6, 3.0), (10, 12.0)]),
        ];
        let stats = compute_statistics(&results);
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].fraction, 0.5);
        assert_eq!(stats[0].mean_exact, 5.0);
        assert_eq!(stats[0].mean_estimate, 4.0);
        assert_eq!(stats[0].std_estimate, 1.0);
        assert_eq!(stats[0].mean_relative_error, (0.25 + 0.5) / 2.0);

        assert_eq!(stats[1].fraction, 1.0);
        assert_eq!(stats[1].mean_exact, 9.0);
        assert_eq!(stats[1].mean_estimate, 10.0);
        assert_eq!(stats[1].mean_relative_error, 0.1);
    }

    #[test]
    fn test_no_streams() {
        assert!(compute_statistics(&[]).is_empty());
    }
}
