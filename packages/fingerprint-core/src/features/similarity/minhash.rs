//! MinHash Signatures for Locality-Sensitive Hashing
//!
//! Broder's MinHash (1997): for each of k independent hash functions keep
//! the minimum hash value over a shingle set. For non-empty sets A and B,
//! the probability that one slot agrees equals the Jaccard similarity
//! |A ∩ B| / |A ∪ B|, so the fraction of agreeing slots estimates it.
//!
//! # Accuracy
//!
//! Standard error ≈ sqrt(J(1-J)/k):
//! - k = 128 → error ≈ 4% at J = 0.5
//! - k = 200 → estimate within ±0.05 of the true value with high probability
//!
//! # Empty sets
//!
//! Every slot of an empty set's signature holds the reserved sentinel
//! `u64::MAX`, which real minima never reach (hash outputs are clamped one
//! below it). Two empty sets therefore compare as identical. The engine
//! matches such artifacts by exact fingerprint only and never registers
//! their bands.
//!
//! # Performance
//!
//! - **Signature**: O(|set| × k); no shared mutable state, so distinct
//!   artifacts hash in parallel across worker threads

use crate::errors::{FingerprintError, Result};
use crate::shared::hashing::{seeded_hash64, splitmix64};
use serde::{Deserialize, Serialize};

use super::shingle::ShingleSet;

/// Reserved "+infinity" slot value for empty shingle sets
pub const EMPTY_SLOT_SENTINEL: u64 = u64::MAX;

/// k-permutation MinHash signature generator
///
/// The k hash functions are derived deterministically from the slot index,
/// so every sketch with the same width produces comparable signatures.
#[derive(Debug, Clone)]
pub struct MinHashSketch {
    slot_seeds: Vec<u64>,
}

impl MinHashSketch {
    /// Create a sketch with `signature_width` independent hash functions
    pub fn new(signature_width: usize) -> Result<Self> {
        if signature_width == 0 {
            return Err(FingerprintError::config("signature_width must be >= 1"));
        }
        let slot_seeds = (0..signature_width as u64).map(splitmix64).collect();
        Ok(Self { slot_seeds })
    }

    /// Number of hash functions (signature width k)
    pub fn signature_width(&self) -> usize {
        self.slot_seeds.len()
    }

    /// Compute the signature of a shingle set
    ///
    /// An empty set yields the all-sentinel signature.
    pub fn signature(&self, shingles: &ShingleSet) -> MinHashSignature {
        let mut slots = vec![EMPTY_SLOT_SENTINEL; self.slot_seeds.len()];

        for &shingle in shingles {
            for (slot, &seed) in slots.iter_mut().zip(&self.slot_seeds) {
                // Clamp below the sentinel so it stays reserved for empties
                let hashed = seeded_hash64(shingle, seed).min(EMPTY_SLOT_SENTINEL - 1);
                if hashed < *slot {
                    *slot = hashed;
                }
            }
        }

        MinHashSignature { slots }
    }
}

/// Ordered sequence of k minimum hash values; immutable after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinHashSignature {
    slots: Vec<u64>,
}

impl MinHashSignature {
    /// Slot values in slot order
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// Signature width k
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// True if this signature came from an empty shingle set
    pub fn is_degenerate(&self) -> bool {
        self.slots.iter().all(|&slot| slot == EMPTY_SLOT_SENTINEL)
    }

    /// Estimate Jaccard similarity as the fraction of agreeing slots
    ///
    /// Both signatures must come from sketches of the same width.
    pub fn jaccard_estimate(&self, other: &Self) -> f64 {
        assert_eq!(
            self.slots.len(),
            other.slots.len(),
            "MinHash signatures must have the same width"
        );

        let matches = self
            .slots
            .iter()
            .zip(&other.slots)
            .filter(|(a, b)| a == b)
            .count();

        matches as f64 / self.slots.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::similarity::shingle::ShingleExtractor;

    fn set_of(values: impl IntoIterator<Item = u64>) -> ShingleSet {
        values.into_iter().collect()
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(MinHashSketch::new(0).is_err());
    }

    #[test]
    fn test_identical_sets_identical_signature() {
        let sketch = MinHashSketch::new(128).unwrap();
        let a = set_of(0..50);
        let b = set_of(0..50);
        assert_eq!(sketch.signature(&a), sketch.signature(&b));
    }

    #[test]
    fn test_empty_set_all_sentinel() {
        let sketch = MinHashSketch::new(64).unwrap();
        let signature = sketch.signature(&ShingleSet::default());
        assert!(signature.is_degenerate());
        assert!(signature.slots().iter().all(|&s| s == EMPTY_SLOT_SENTINEL));
    }

    #[test]
    fn test_two_empty_sets_compare_identical() {
        // Documented edge case: empties agree in every slot
        let sketch = MinHashSketch::new(64).unwrap();
        let a = sketch.signature(&ShingleSet::default());
        let b = sketch.signature(&ShingleSet::default());
        assert_eq!(a.jaccard_estimate(&b), 1.0);
    }

    #[test]
    fn test_nonempty_never_hits_sentinel() {
        let sketch = MinHashSketch::new(64).unwrap();
        let signature = sketch.signature(&set_of(0..10));
        assert!(!signature.is_degenerate());
        assert!(signature.slots().iter().all(|&s| s < EMPTY_SLOT_SENTINEL));
    }

    #[test]
    fn test_jaccard_estimate_converges() {
        // 160 shared of 200 total → true Jaccard 0.8
        let sketch = MinHashSketch::new(200).unwrap();
        let a = set_of((0..160).chain(1000..1020));
        let b = set_of((0..160).chain(2000..2020));

        let estimate = sketch.signature(&a).jaccard_estimate(&sketch.signature(&b));
        let true_jaccard = 160.0 / 200.0;
        assert!(
            (estimate - true_jaccard).abs() <= 0.1,
            "estimate {estimate} too far from {true_jaccard}"
        );
    }

    #[test]
    fn test_disjoint_sets_low_estimate() {
        let sketch = MinHashSketch::new(200).unwrap();
        let a = sketch.signature(&set_of(0..100));
        let b = sketch.signature(&set_of(10_000..10_100));
        assert!(a.jaccard_estimate(&b) < 0.1);
    }

    #[test]
    fn test_jaccard_symmetry() {
        let sketch = MinHashSketch::new(64).unwrap();
        let a = sketch.signature(&set_of(0..30));
        let b = sketch.signature(&set_of(15..45));
        assert_eq!(a.jaccard_estimate(&b), b.jaccard_estimate(&a));
    }

    #[test]
    #[should_panic(expected = "same width")]
    fn test_width_mismatch_panics() {
        let a = MinHashSketch::new(64).unwrap().signature(&set_of(0..5));
        let b = MinHashSketch::new(128).unwrap().signature(&set_of(0..5));
        let _ = a.jaccard_estimate(&b);
    }

    #[test]
    fn test_end_to_end_with_extractor() {
        let extractor = ShingleExtractor::new(3).unwrap();
        let sketch = MinHashSketch::new(128).unwrap();

        let tokens_a = ["fn", "add", "(", "a", ",", "b", ")", "{", "a", "+", "b", "}"];
        let tokens_b = ["fn", "add", "(", "x", ",", "y", ")", "{", "x", "+", "y", "}"];

        let sig_a = sketch.signature(&extractor.shingles(&tokens_a));
        let sig_b = sketch.signature(&extractor.shingles(&tokens_b));

        let self_sim = sig_a.jaccard_estimate(&sig_a);
        let cross_sim = sig_a.jaccard_estimate(&sig_b);
        assert_eq!(self_sim, 1.0);
        assert!(cross_sim < 1.0);
    }
}
