//! Bloom membership filter over fingerprints
//!
//! Space-optimal bit-array filter with sizing derived from the expected
//! element count n and target false-positive rate p:
//!
//! ```text
//! m = ceil(-n·ln(p) / (ln 2)^2)        bit-array size
//! k = round((m/n)·ln 2)                hash count
//! ```
//!
//! # Contract
//!
//! - `contains` returning **false is definitive absence**: bits are only
//!   ever set, never cleared, so a miss proves the element was never
//!   inserted
//! - `contains` returning true means "probably present"; once n elements
//!   are inserted the false-positive rate is ≈ `(1 - e^{-kn/m})^k` and the
//!   caller must verify downstream
//! - No delete operation exists. Removal semantics require rebuilding from
//!   a retained source of truth, outside this filter's contract.
//!
//! # Concurrency
//!
//! The bit array is a vector of `AtomicU64` words mutated with `fetch_or`,
//! so concurrent inserts need no lock and insert order is irrelevant.
//! Reads may observe a slightly stale word, which can only under-report
//! membership of concurrently-inserted elements, never of anything
//! inserted before the read began.

use crate::errors::{FingerprintError, Result};
use crate::shared::models::Fingerprint;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Insert-only membership filter sized from (expected_n, target_fpr)
#[derive(Debug)]
pub struct BloomIndex {
    words: Vec<AtomicU64>,
    bit_count: u64,
    hash_count: u32,
    expected_items: usize,
    target_fpr: f64,
}

impl BloomIndex {
    /// Create a filter sized for `expected_items` at `target_fpr`
    pub fn new(expected_items: usize, target_fpr: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(FingerprintError::config("expected_items must be >= 1"));
        }
        if !(target_fpr > 0.0 && target_fpr < 1.0) {
            return Err(FingerprintError::config(format!(
                "target_fpr must be in (0, 1), got {target_fpr}"
            )));
        }

        let n = expected_items as f64;
        let ln2 = std::f64::consts::LN_2;

        let raw_bits = (-n * target_fpr.ln() / (ln2 * ln2)).ceil().max(8.0) as u64;
        // Word-align upward; keeps the modulo domain identical to storage
        let word_count = raw_bits.div_ceil(64).max(1) as usize;
        let bit_count = word_count as u64 * 64;

        let hash_count = ((bit_count as f64 / n) * ln2).round().max(1.0) as u32;

        let words = (0..word_count).map(|_| AtomicU64::new(0)).collect();

        Ok(Self {
            words,
            bit_count,
            hash_count,
            expected_items,
            target_fpr,
        })
    }

    /// Bit-array size m
    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    /// Derived hash count k
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Expected element count the filter was sized for
    pub fn expected_items(&self) -> usize {
        self.expected_items
    }

    /// Configured target false-positive rate
    pub fn target_fpr(&self) -> f64 {
        self.target_fpr
    }

    /// Insert a fingerprint; idempotent
    ///
    /// Derives the k bit positions by double hashing two independent
    /// 64-bit lanes of the fingerprint (`h1 + i·h2 mod m`) instead of k
    /// separate hash computations.
    pub fn insert(&self, fingerprint: &Fingerprint) {
        for position in self.bit_positions(fingerprint) {
            let (word, mask) = Self::locate(position);
            self.words[word].fetch_or(mask, Ordering::Relaxed);
        }
    }

    /// Membership test: false is a guaranteed true negative
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.bit_positions(fingerprint).all(|position| {
            let (word, mask) = Self::locate(position);
            self.words[word].load(Ordering::Relaxed) & mask != 0
        })
    }

    /// Number of set bits (observability; used by invariance tests)
    pub fn set_bit_count(&self) -> u64 {
        self.words
            .iter()
            .map(|word| u64::from(word.load(Ordering::Relaxed).count_ones()))
            .sum()
    }

    /// Fraction of bits currently set
    pub fn fill_ratio(&self) -> f64 {
        self.set_bit_count() as f64 / self.bit_count as f64
    }

    /// Estimated false-positive rate at the current fill: `fill_ratio^k`
    pub fn current_fpr_estimate(&self) -> f64 {
        self.fill_ratio().powi(self.hash_count as i32)
    }

    /// Immutable snapshot of the filter state for persistence
    pub fn snapshot(&self) -> BloomSnapshot {
        BloomSnapshot {
            words: self
                .words
                .iter()
                .map(|word| word.load(Ordering::Relaxed))
                .collect(),
            bit_count: self.bit_count,
            hash_count: self.hash_count,
            expected_items: self.expected_items,
            target_fpr: self.target_fpr,
        }
    }

    /// Rebuild a filter from a snapshot
    pub fn from_snapshot(snapshot: BloomSnapshot) -> Result<Self> {
        if snapshot.bit_count != snapshot.words.len() as u64 * 64 {
            return Err(FingerprintError::config(format!(
                "bloom snapshot bit_count {} does not match {} words",
                snapshot.bit_count,
                snapshot.words.len()
            )));
        }
        if snapshot.hash_count == 0 {
            return Err(FingerprintError::config("bloom hash_count must be >= 1"));
        }
        Ok(Self {
            words: snapshot.words.into_iter().map(AtomicU64::new).collect(),
            bit_count: snapshot.bit_count,
            hash_count: snapshot.hash_count,
            expected_items: snapshot.expected_items,
            target_fpr: snapshot.target_fpr,
        })
    }

    fn bit_positions(&self, fingerprint: &Fingerprint) -> impl Iterator<Item = u64> {
        let h1 = fingerprint.lane(0);
        // Odd step so the stride is coprime with the power-of-two-ish domain
        let h2 = fingerprint.lane(1) | 1;
        let bit_count = self.bit_count;
        (0..u64::from(self.hash_count))
            .map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % bit_count)
    }

    #[inline]
    fn locate(position: u64) -> (usize, u64) {
        ((position / 64) as usize, 1u64 << (position % 64))
    }
}

/// Serializable Bloom filter state: bit words plus (m, k) and sizing inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomSnapshot {
    pub words: Vec<u64>,
    pub bit_count: u64,
    pub hash_count: u32,
    pub expected_items: usize,
    pub target_fpr: f64,
}
