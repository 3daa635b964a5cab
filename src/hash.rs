//! Seeded 32-bit hash functions feeding the sketch.

use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;

const C1: u32 = 0xcc9e2d51;
const C2: u32 = 0x1b873593;

/// A deterministic mapping from a byte string to a 32-bit word.
///
/// Sketches only merge when both sides report the same
/// [`HashFunction::fingerprint`], and never when either side reports `None`.
pub trait HashFunction {
    fn hash(&self, item: &[u8]) -> u32;

    /// Algorithm name and seed identifying this function, if it has them.
    fn fingerprint(&self) -> Option<(&'static str, u32)> {
        None
    }
}

impl<T: HashFunction + ?Sized> HashFunction for &T {
    fn hash(&self, item: &[u8]) -> u32 {
        (**self).hash(item)
    }

    fn fingerprint(&self) -> Option<(&'static str, u32)> {
        (**self).fingerprint()
    }
}

impl<T: HashFunction + ?Sized> HashFunction for Arc<T> {
    fn hash(&self, item: &[u8]) -> u32 {
        (**self).hash(item)
    }

    fn fingerprint(&self) -> Option<(&'static str, u32)> {
        (**self).fingerprint()
    }
}

#[inline]
fn scramble(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// 32 bit version of MurmurHash3 for x86, blocks read little-endian.
/// Original cpp implementation: https://github.com/aappleby/smhasher/blob/master/src/MurmurHash3.cpp
pub fn murmur3_32(item: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    let mut blocks = item.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= scramble(k);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, &byte) in tail.iter().enumerate() {
            k ^= (byte as u32) << (8 * i);
        }
        h ^= scramble(k);
    }

    // Only the low 32 bits of the length take part, as in the reference
    h ^= item.len() as u32;
    fmix32(h)
}

/// Seeded MurmurHash3 (x86, 32-bit). The reference hash of this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Murmur3Hash {
    seed: u32,
}

impl Murmur3Hash {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl HashFunction for Murmur3Hash {
    #[inline]
    fn hash(&self, item: &[u8]) -> u32 {
        murmur3_32(item, self.seed)
    }

    fn fingerprint(&self) -> Option<(&'static str, u32)> {
        Some(("murmur3_32", self.seed))
    }
}

/// Seeded xxHash32.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh32Hash {
    seed: u32,
}

impl Xxh32Hash {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl HashFunction for Xxh32Hash {
    #[inline]
    fn hash(&self, item: &[u8]) -> u32 {
        xxhash_rust::xxh32::xxh32(item, self.seed)
    }

    fn fingerprint(&self) -> Option<(&'static str, u32)> {
        Some(("xxh32", self.seed))
    }
}

/// Adapts any [`BuildHasher`] into a 32-bit [`HashFunction`].
///
/// One fresh hasher is built per item; the 64-bit digest is folded into 32 bits
/// by xoring its halves. Builder keys cannot be compared, so the adapter has no
/// fingerprint and sketches built on it never merge.
#[derive(Debug, Clone, Default)]
pub struct BuildHasherHash<S> {
    build: S,
}

impl<S: BuildHasher> BuildHasherHash<S> {
    pub fn new(build: S) -> Self {
        Self { build }
    }
}

impl<S: BuildHasher> HashFunction for BuildHasherHash<S> {
    fn hash(&self, item: &[u8]) -> u32 {
        let mut h = self.build.build_hasher();
        h.write(item);
        let digest = h.finish();
        ((digest >> 32) ^ digest) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_murmur3_reference_vectors() {
        assert_eq!(murmur3_32(b"", 0), 0);
        assert_eq!(murmur3_32(b"", 1), 0x514e28b7);
        assert_eq!(murmur3_32(b"hello", 0), 0x248bfa47);
        assert_eq!(murmur3_32(b"Hello, world!", 1234), 0xfaf6cdb3);
        assert_eq!(
            murmur3_32(b"The quick brown fox jumps over the lazy dog", 0x9747b28c),
            0x2fa826cd
        );
    }

    #[test]
    fn test_murmur3_tail_lengths() {
        // every tail length 0..=3 on top of a full block
        assert_eq!(murmur3_32(b"abcd", 0), 0x43ed676a);
        assert_eq!(murmur3_32(b"a", 0), 0x3c2569b2);
        assert_eq!(murmur3_32(b"a", 42), 0xb2e5a263);
        let hashes: Vec<u32> = (1..=8)
            .map(|n| murmur3_32(&b"abcdefgh"[..n], 7))
            .collect();
        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_seed_changes_output() {
        let a = Murmur3Hash::new(1);
        let b = Murmur3Hash::new(2);
        assert_ne!(a.hash(b"item"), b.hash(b"item"));
        assert_eq!(a.hash(b"item"), Murmur3Hash::new(1).hash(b"item"));
        assert_eq!(a.seed(), 1);
        assert_eq!(a.fingerprint(), Some(("murmur3_32", 1)));
    }

    #[test]
    fn test_avalanche_single_bit_flip() {
        // flipping one input bit should flip roughly half of the output bits
        let hash = Murmur3Hash::new(42);
        let mut total = 0u32;
        let trials = 256u32;
        for i in 0..trials {
            let base = i.to_le_bytes();
            let mut flipped = base;
            flipped[(i % 4) as usize] ^= 1 << (i % 8);
            total += (hash.hash(&base) ^ hash.hash(&flipped)).count_ones();
        }
        let mean = total as f64 / trials as f64;
        assert!((12.0..=20.0).contains(&mean), "mean flipped bits {mean}");
    }

    #[test]
    fn test_handles_forward() {
        let hash = Murmur3Hash::new(9);
        let by_ref: &dyn HashFunction = &hash;
        let shared = Arc::new(hash);
        assert_eq!(by_ref.hash(b"x"), hash.hash(b"x"));
        assert_eq!(shared.hash(b"x"), hash.hash(b"x"));
        assert_eq!(by_ref.fingerprint(), Some(("murmur3_32", 9)));
        assert_eq!(shared.fingerprint(), Some(("murmur3_32", 9)));
    }

    #[test]
    fn test_xxh32() {
        let hash = Xxh32Hash::new(0);
        assert_eq!(hash.hash(b""), 0x02cc5d05);
        assert_ne!(hash.hash(b"a"), Xxh32Hash::new(1).hash(b"a"));
        // same seed, different algorithm
        assert_ne!(hash.fingerprint(), Murmur3Hash::new(0).fingerprint());
        assert_eq!(hash.fingerprint(), Some(("xxh32", 0)));
    }

    #[test]
    fn test_build_hasher_adapter() {
        let hash = BuildHasherHash::new(ahash::RandomState::with_seeds(1, 2, 3, 4));
        assert_eq!(hash.hash(b"apple"), hash.hash(b"apple"));
        assert_ne!(hash.hash(b"apple"), hash.hash(b"banana"));
        assert_eq!(hash.fingerprint(), None);
    }
}
