// HyperLogLog over seeded 32-bit hashes.
// See "HyperLogLog: the analysis of a near-optimal cardinality estimation algorithm" (Flajolet et al.)
// and "LogLog-Beta and More: A New Algorithm for Cardinality Estimation Based on LogLog Counting" (Qin et al.)

mod estimator;
mod hash;
mod registers;
mod sketch;

pub use estimator::{ClassicEstimator, Estimator, LogLogBetaEstimator};
pub use hash::{murmur3_32, BuildHasherHash, HashFunction, Murmur3Hash, Xxh32Hash};
pub use registers::Registers;
pub use sketch::{rank, HyperLogLog};

use std::fmt;

// Precision bounds
pub const MIN_B: u32 = 4;
pub const MAX_B: u32 = 16;

// Width of the hash word every sketch splits into index and remainder
const HASH_BITS: u32 = 32;

// Classic estimator regime thresholds
pub const SMALL_RANGE_FACTOR: f64 = 2.5; // linear counting while raw <= 2.5 * m
pub const TWO_POW_32: f64 = 4294967296.0;
pub const LARGE_RANGE_THRESHOLD: f64 = TWO_POW_32 / 30.0;

// Bias constants for the three smallest register counts
const ALPHA_16: f64 = 0.673;
const ALPHA_32: f64 = 0.697;
const ALPHA_64: f64 = 0.709;

/// Errors returned by sketch construction and merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    /// A constructor received an out-of-range argument.
    InvalidParameter(&'static str),
    /// Two sketches differ in precision or hash seed.
    IncompatibleSketches(&'static str),
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            Self::IncompatibleSketches(message) => write!(f, "incompatible sketches: {message}"),
        }
    }
}

impl std::error::Error for SketchError {}

/// Asymptotic bias constant `0.7213 / (1 + 1.079 / m)`.
pub fn alpha_inf(m: usize) -> f64 {
    0.7213 / (1.0 + 1.079 / m as f64)
}

/// Bias constant for `m` registers: exact for 16, 32 and 64, asymptotic otherwise.
pub fn alpha(m: usize) -> f64 {
    match m {
        16 => ALPHA_16,
        32 => ALPHA_32,
        64 => ALPHA_64,
        _ => alpha_inf(m),
    }
}
