use crate::{alpha, HASH_BITS, MAX_B, MIN_B};

/// The register state of a sketch: `m = 2^b` ranks, each in `[0, 33 - b]`.
///
/// Both estimators read this type; only the owning sketch writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Registers {
    b: u32,
    alpha: f64,
    values: Vec<u8>,
}

impl Registers {
    pub(crate) fn new(b: u32) -> Self {
        debug_assert!((MIN_B..=MAX_B).contains(&b));
        let m = 1usize << b;
        Self {
            b,
            alpha: alpha(m),
            values: vec![0; m],
        }
    }

    /// Precision parameter.
    pub fn b(&self) -> u32 {
        self.b
    }

    /// Register count.
    pub fn m(&self) -> usize {
        self.values.len()
    }

    /// Bias constant chosen for this register count.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Largest rank a register can hold.
    pub fn max_rank(&self) -> u8 {
        (HASH_BITS - self.b + 1) as u8
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// `Σ 2^-r` over all registers together with the number of zero registers.
    ///
    /// The sum is at least 1 for any non-empty register array.
    pub fn harmonic_sum(&self) -> (f64, usize) {
        let mut sum = 0.0;
        let mut zeros = 0;
        for &r in &self.values {
            if r == 0 {
                zeros += 1;
            }
            sum += 1.0 / (1u64 << r) as f64;
        }
        (sum, zeros)
    }

    pub fn zeros(&self) -> usize {
        self.values.iter().filter(|&&r| r == 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|&r| r == 0)
    }

    #[inline]
    pub(crate) fn update(&mut self, idx: usize, rank: u8) {
        let slot = &mut self.values[idx];
        if rank > *slot {
            *slot = rank;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.values.fill(0);
    }

    /// Elementwise maximum with a same-shaped register array.
    pub(crate) fn union(&mut self, other: &Registers) {
        debug_assert_eq!(self.b, other.b);
        for (mine, &theirs) in self.values.iter_mut().zip(&other.values) {
            if theirs > *mine {
                *mine = theirs;
            }
        }
    }
}
