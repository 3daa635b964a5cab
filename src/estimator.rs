use tracing::trace;

use crate::registers::Registers;
use crate::{alpha_inf, LARGE_RANGE_THRESHOLD, SMALL_RANGE_FACTOR, TWO_POW_32};

// LogLog-Beta coefficients: beta_0 weights the zero count, beta_1..beta_7 the powers of ln(zeros + 1)
const BETA_0: f64 = -0.370393911;
const BETA_POLY: [f64; 7] = [
    0.070471823,
    0.17393686,
    0.16339839,
    -0.09237745,
    0.03738027,
    -0.005384159,
    0.00042419,
];

// Trait for estimators
pub trait Estimator {
    fn estimate(&self, registers: &Registers) -> f64;
}

/// Harmonic mean estimator with linear counting for small and a logarithmic
/// correction for large cardinalities.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicEstimator;

impl Estimator for ClassicEstimator {
    fn estimate(&self, registers: &Registers) -> f64 {
        let m = registers.m() as f64;
        let (sum, zeros) = registers.harmonic_sum();

        let mut raw = registers.alpha() * m * m / sum;

        if raw <= SMALL_RANGE_FACTOR * m {
            if zeros > 0 {
                raw = m * (m / zeros as f64).ln();
                trace!(raw, zeros, "linear counting");
            } else {
                trace!(raw, "small range without empty registers");
            }
        }

        if raw > LARGE_RANGE_THRESHOLD {
            // past 2^32 every hash value is taken and the correction diverges
            if raw >= TWO_POW_32 {
                trace!(raw, "saturated");
                return f64::INFINITY;
            }
            raw = -TWO_POW_32 * (1.0 - raw / TWO_POW_32).ln();
            trace!(raw, "large range correction");
        }

        raw
    }
}

/// LogLog-Beta: one formula for all ranges, with a bias term fitted as a
/// polynomial in `ln(zeros + 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLogBetaEstimator;

impl LogLogBetaEstimator {
    /// Bias term for the given number of empty registers.
    pub fn beta(zeros: usize) -> f64 {
        let z = zeros as f64;
        let zl = (z + 1.0).ln();
        let mut power = 1.0;
        let mut poly = 0.0;
        for coefficient in BETA_POLY {
            power *= zl;
            poly += coefficient * power;
        }
        BETA_0 * z + poly
    }
}

impl Estimator for LogLogBetaEstimator {
    fn estimate(&self, registers: &Registers) -> f64 {
        let (sum, zeros) = registers.harmonic_sum();
        if zeros == 0 {
            return ClassicEstimator.estimate(registers);
        }
        let m = registers.m();
        let beta = Self::beta(zeros);
        // sum >= zeros, and zeros + beta(zeros) stays positive, so the denominator never vanishes
        let est = alpha_inf(m) * m as f64 * (m - zeros) as f64 / (sum + beta);
        trace!(est, zeros, beta, "loglog-beta");
        est
    }
}
