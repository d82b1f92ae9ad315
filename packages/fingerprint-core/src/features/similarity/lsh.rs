//! LSH Banding for Candidate Retrieval
//!
//! Partitions a MinHash signature into b non-overlapping bands of r
//! consecutive rows (b × r = k, enforced at construction) and hashes each
//! band into a bucket key. Two artifacts are candidate near-duplicates iff
//! they share at least one band key (logical OR across bands), which gives
//! the S-curve threshold behavior:
//!
//! ```text
//! P(candidate | true similarity s) = 1 - (1 - s^r)^b
//! ```
//!
//! The (b, r) pair is a caller decision: more bands trade candidate-set
//! size for recall. See [`EngineConfig`](crate::config::EngineConfig) for
//! recommended pairs per threshold.

use crate::errors::{FingerprintError, Result};
use crate::shared::hashing::seeded_hash64;
use crate::shared::models::BandKey;

use super::minhash::MinHashSignature;

/// Bands signatures into bucket keys; the band decomposition is fixed for
/// the lifetime of an engine instance
#[derive(Debug, Clone)]
pub struct LshBander {
    band_count: usize,
    rows_per_band: usize,
}

impl LshBander {
    /// Create a bander for signatures of width `signature_width`
    ///
    /// Fails fast with a configuration error unless
    /// `band_count × rows_per_band == signature_width`.
    pub fn new(band_count: usize, rows_per_band: usize, signature_width: usize) -> Result<Self> {
        if band_count == 0 || rows_per_band == 0 {
            return Err(FingerprintError::config(
                "band_count and rows_per_band must be >= 1",
            ));
        }
        if band_count * rows_per_band != signature_width {
            return Err(FingerprintError::config(format!(
                "band_count ({band_count}) x rows_per_band ({rows_per_band}) \
                 must equal signature_width ({signature_width})"
            )));
        }
        Ok(Self {
            band_count,
            rows_per_band,
        })
    }

    /// Number of bands (b)
    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Rows per band (r)
    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    /// Compute the bucket key of every band of a signature
    ///
    /// Keys carry their band index, so equal hashes in different bands
    /// never collide. Returned in band order.
    pub fn bands(&self, signature: &MinHashSignature) -> Vec<BandKey> {
        assert_eq!(
            signature.width(),
            self.band_count * self.rows_per_band,
            "signature width must match the band decomposition"
        );

        (0..self.band_count)
            .map(|band| {
                let start = band * self.rows_per_band;
                let rows = &signature.slots()[start..start + self.rows_per_band];

                let mut hash = seeded_hash64(band as u64, BAND_SEED);
                for &row in rows {
                    hash = seeded_hash64(row, hash);
                }

                BandKey {
                    band: band as u32,
                    hash,
                }
            })
            .collect()
    }

    /// Probability that two artifacts with true similarity `s` share at
    /// least one band key: `1 - (1 - s^r)^b`
    pub fn candidate_probability(&self, similarity: f64) -> f64 {
        let s = similarity.clamp(0.0, 1.0);
        1.0 - (1.0 - s.powi(self.rows_per_band as i32)).powi(self.band_count as i32)
    }
}

// Fixed seed separating band hashing from shingle/minhash hashing
const BAND_SEED: u64 = 0x62616e645f6b6579; // "band_key"
