//! Synthetic item streams and the exact distinct counter used as ground truth.

use std::collections::HashSet;

use rand::distributions::Uniform;
use rand::prelude::*;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-";
const MIN_LEN: usize = 1;
const MAX_LEN: usize = 30;

/// A stream of `total_size` items drawn with replacement from a pool of
/// `unique_pool` distinct random strings.
pub struct StreamGenerator {
    unique_pool: usize,
    total_size: usize,
    seed: u64,
    stream: Vec<String>,
}

impl StreamGenerator {
    pub fn new(unique_pool: usize, total_size: usize, seed: u64) -> Result<Self, &'static str> {
        if unique_pool == 0 {
            return Err("unique pool must not be empty");
        }
        if total_size < unique_pool {
            return Err("stream must be at least as long as the unique pool");
        }
        Ok(Self {
            unique_pool,
            total_size,
            seed,
            stream: Vec::new(),
        })
    }

    fn random_string(rng: &mut StdRng) -> String {
        let len = rng.gen_range(MIN_LEN..=MAX_LEN);
        (0..len)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect()
    }

    /// Builds the pool and the stream; repeated calls give the same stream.
    pub fn generate(&mut self) -> &[String] {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut seen = HashSet::with_capacity(self.unique_pool);
        let mut pool = Vec::with_capacity(self.unique_pool);
        while pool.len() < self.unique_pool {
            let s = Self::random_string(&mut rng);
            if seen.insert(s.clone()) {
                pool.push(s);
            }
        }

        let pick = Uniform::new(0, pool.len());
        self.stream = (0..self.total_size)
            .map(|_| pool[pick.sample(&mut rng)].clone())
            .collect();
        &self.stream
    }

    pub fn stream(&self) -> &[String] {
        &self.stream
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// The first `ceil(fraction * len)` items of the generated stream.
    pub fn prefix(&self, fraction: f64) -> &[String] {
        assert!(
            fraction > 0.0 && fraction <= 1.0,
            "fraction must be in (0, 1], got {fraction}"
        );
        let count = (fraction * self.stream.len() as f64).ceil() as usize;
        &self.stream[..count.min(self.stream.len())]
    }

    /// `step, 2 * step, ...` up to and including 1.
    pub fn make_fractions(step: f64) -> Vec<f64> {
        assert!(step > 0.0 && step <= 1.0, "step must be in (0, 1], got {step}");
        let mut fractions = Vec::new();
        let mut i = 1;
        loop {
            let f = step * i as f64;
            if f > 1.0 + 1e-9 {
                break;
            }
            fractions.push(f.min(1.0));
            i += 1;
        }
        fractions
    }
}

/// Number of distinct items.
pub fn exact_count<T: AsRef<str>>(items: &[T]) -> usize {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<HashSet<&str>>()
        .len()
}
