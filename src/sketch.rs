use tracing::debug;

use crate::estimator::{ClassicEstimator, Estimator, LogLogBetaEstimator};
use crate::hash::{HashFunction, Murmur3Hash};
use crate::registers::Registers;
use crate::{SketchError, HASH_BITS, MAX_B, MIN_B};

/// Rank of a `(32 - b)`-bit remainder: 1 + its leading zeros, `33 - b` for zero.
#[inline]
pub fn rank(w: u32, b: u32) -> u8 {
    let width = HASH_BITS - b;
    debug_assert!(w < (1u32 << width));
    if w == 0 {
        return (width + 1) as u8;
    }
    // the remainder sits in the low `width` bits, so `b` of the leading zeros are padding
    (w.leading_zeros() - b + 1) as u8
}

/// HyperLogLog sketch over 32-bit hashes.
///
/// The top `b` bits of an item's hash select one of `2^b` registers, the remaining
/// `32 - b` bits give its rank. The hash function is held as `H`, which may be a
/// plain value, a `&T` or an `Arc<T>` so that many sketches can share one seed.
#[derive(Debug, Clone)]
pub struct HyperLogLog<H = Murmur3Hash> {
    registers: Registers,
    hash: H,
}

impl HyperLogLog<Murmur3Hash> {
    /// Creates a sketch with `2^b` registers hashing with seed 0.
    ///
    /// The precision parameter `b` must be in the range {4, 5, ..., 16}.
    pub fn new(b: u32) -> Result<Self, SketchError> {
        Self::with_hash(b, Murmur3Hash::default())
    }
}

impl<H: HashFunction> HyperLogLog<H> {
    /// Creates a sketch with `2^b` registers and the given hash function.
    pub fn with_hash(b: u32, hash: H) -> Result<Self, SketchError> {
        if !(MIN_B..=MAX_B).contains(&b) {
            return Err(SketchError::InvalidParameter(
                "precision must be in the range [4, 16]",
            ));
        }
        let registers = Registers::new(b);
        debug!(
            b,
            m = registers.m(),
            alpha = registers.alpha(),
            hash = ?hash.fingerprint(),
            "created sketch"
        );
        Ok(Self { registers, hash })
    }

    /// Adds an item to this sketch.
    pub fn add<T: AsRef<[u8]>>(&mut self, item: T) -> &mut Self {
        let h = self.hash.hash(item.as_ref());
        self.add_hash(h)
    }

    /// Adds an item represented by its 32-bit hash.
    pub fn add_hash(&mut self, hash_value: u32) -> &mut Self {
        let b = self.registers.b();
        let width = HASH_BITS - b;
        let idx = (hash_value >> width) as usize;
        let w = hash_value & ((1u32 << width) - 1);
        self.registers.update(idx, rank(w, b));
        self
    }

    /// Classic three-regime estimate.
    pub fn estimate(&self) -> f64 {
        ClassicEstimator.estimate(&self.registers)
    }

    /// LogLog-Beta estimate over the same registers.
    pub fn estimate_beta(&self) -> f64 {
        LogLogBetaEstimator.estimate(&self.registers)
    }

    pub fn estimate_with(&self, estimator: &dyn Estimator) -> f64 {
        estimator.estimate(&self.registers)
    }

    /// Resets this sketch to its initial state representing an empty set.
    pub fn reset(&mut self) {
        debug!(b = self.registers.b(), "reset sketch");
        self.registers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    pub fn get_b(&self) -> u32 {
        self.registers.b()
    }

    pub fn get_m(&self) -> usize {
        self.registers.m()
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn hash_function(&self) -> &H {
        &self.hash
    }

    /// Adds another sketch: every register becomes the maximum of both.
    ///
    /// Both sketches must have the same precision and hash with the same
    /// algorithm and seed. Hash functions without a fingerprint never merge.
    pub fn add_sketch<G: HashFunction>(
        &mut self,
        other: &HyperLogLog<G>,
    ) -> Result<&mut Self, SketchError> {
        if self.registers.b() != other.registers.b() {
            return Err(SketchError::IncompatibleSketches("precisions differ"));
        }
        match (self.hash.fingerprint(), other.hash.fingerprint()) {
            (Some(a), Some(b)) if a == b => {}
            (Some(_), Some(_)) => {
                return Err(SketchError::IncompatibleSketches("hash functions differ"))
            }
            _ => {
                return Err(SketchError::IncompatibleSketches(
                    "hash function has no fingerprint",
                ))
            }
        }
        self.registers.union(&other.registers);
        debug!(
            b = self.registers.b(),
            zeros = self.registers.zeros(),
            "merged sketch"
        );
        Ok(self)
    }
}

impl<H: HashFunction + Clone> HyperLogLog<H> {
    /// Merges two sketches into a new one.
    pub fn merge(sketch1: &Self, sketch2: &Self) -> Result<Self, SketchError> {
        let mut result = sketch1.clone();
        result.add_sketch(sketch2)?;
        Ok(result)
    }
}
