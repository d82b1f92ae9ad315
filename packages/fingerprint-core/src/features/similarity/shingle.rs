//! Shingle Extraction (token n-grams)
//!
//! Converts an externally-produced token stream into the deduplicated set
//! of contiguous token n-grams that MinHash signatures are computed over.
//! The set is built once per artifact and never persisted.
//!
//! # Degenerate inputs
//!
//! A stream shorter than n yields an empty set. That is a defined edge
//! case, not an error: such artifacts produce the sentinel signature and
//! are matched by exact fingerprint only (see
//! [`MinHashSignature`](super::minhash::MinHashSignature)).

use crate::errors::{FingerprintError, Result};
use crate::shared::hashing::{seeded_hash64, Fnv1aHasher};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Deduplicated set of hashed token n-grams
pub type ShingleSet = HashSet<u64, ahash::RandomState>;

/// Token n-gram extractor with n fixed per engine instance
#[derive(Debug, Clone)]
pub struct ShingleExtractor {
    shingle_size: usize,
}

impl ShingleExtractor {
    /// Create an extractor for n-grams of the given width
    ///
    /// n = 5 is the recommended default for token streams.
    pub fn new(shingle_size: usize) -> Result<Self> {
        if shingle_size == 0 {
            return Err(FingerprintError::config("shingle_size must be >= 1"));
        }
        Ok(Self { shingle_size })
    }

    /// The configured n-gram width
    pub fn shingle_size(&self) -> usize {
        self.shingle_size
    }

    /// Extract the set of all contiguous token n-grams
    ///
    /// Tokens are hashed individually with a deterministic FNV-1a hasher
    /// (snapshot-stable, unlike `DefaultHasher`'s unspecified keys), then
    /// each window is folded into a single 64-bit shingle. Streams shorter
    /// than n yield an empty set.
    pub fn shingles<T: Hash>(&self, tokens: &[T]) -> ShingleSet {
        let mut shingles = ShingleSet::default();
        if tokens.len() < self.shingle_size {
            return shingles;
        }

        let token_hashes: Vec<u64> = tokens
            .iter()
            .map(|token| {
                let mut hasher = Fnv1aHasher::new();
                token.hash(&mut hasher);
                hasher.finish()
            })
            .collect();

        for window in token_hashes.windows(self.shingle_size) {
            let mut shingle = seeded_hash64(self.shingle_size as u64, 0);
            for &token_hash in window {
                shingle = seeded_hash64(token_hash, shingle);
            }
            shingles.insert(shingle);
        }

        shingles
    }
}
