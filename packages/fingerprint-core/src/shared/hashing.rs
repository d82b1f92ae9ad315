//! Seeded 64-bit hashing primitives shared by the sketches
//!
//! The similarity sketches need families of cheap, deterministic hash
//! functions whose outputs are stable across processes: band keys and
//! signatures end up in persisted snapshots, so `RandomState`-style
//! per-process seeding is off the table. FNV-1a covers byte streams and
//! SplitMix64 derives well-mixed independent functions from small seeds.

use std::hash::Hasher;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// SplitMix64 finalizer
///
/// Full-avalanche 64-bit mixer; used for deriving independent per-slot
/// hash functions and for combining values that are already 64-bit hashes.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Hash a 64-bit value under the hash function identified by `seed`
///
/// Distinct seeds behave as independent hash functions; identical
/// (value, seed) pairs always produce the same output.
#[inline]
pub fn seeded_hash64(value: u64, seed: u64) -> u64 {
    splitmix64(value ^ splitmix64(seed))
}

/// Deterministic FNV-1a `Hasher`
///
/// Stand-in for `DefaultHasher` wherever the result must be reproducible
/// across runs (shingle hashing). Not a `BuildHasher` default on purpose:
/// plain map lookups should keep using ahash.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    pub fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}
