//! Engine configuration
//!
//! All sketch parameters are fixed at engine construction and validated
//! there; a misconfigured engine fails before it ever touches an artifact,
//! never in the middle of an `observe` call.

use crate::errors::{FingerprintError, Result};
use serde::{Deserialize, Serialize};

/// Configuration surface for [`FingerprintEngine`](crate::FingerprintEngine)
///
/// # Recommended LSH Configurations
///
/// For Jaccard threshold t, candidate probability is `1 - (1 - t^r)^b`:
///
/// | Threshold | band_count | rows_per_band | Recall |
/// |-----------|------------|---------------|--------|
/// | t = 0.3   | 50         | 4             | ~99%   |
/// | t = 0.5   | 25         | 8             | ~96%   |
/// | t = 0.8   | 20         | 10            | ~90%   |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token n-gram width for shingling (n)
    pub shingle_size: usize,

    /// Number of MinHash functions (k); band_count × rows_per_band must equal this
    pub signature_width: usize,

    /// Number of LSH bands (b)
    pub band_count: usize,

    /// Signature rows per LSH band (r)
    pub rows_per_band: usize,

    /// Expected number of distinct artifacts (sizes the Bloom bit array)
    pub expected_artifacts: usize,

    /// Target Bloom false-positive rate, in (0, 1)
    pub target_fpr: f64,

    /// HyperLogLog precision p; register count is 2^p
    pub hll_precision: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shingle_size: 5,
            signature_width: 200,
            band_count: 20,
            rows_per_band: 10,
            expected_artifacts: 100_000,
            target_fpr: 0.01,
            hll_precision: 14,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set shingle size (n-gram width)
    pub fn with_shingle_size(mut self, n: usize) -> Self {
        self.shingle_size = n;
        self
    }

    /// Set MinHash signature width and its band decomposition in one step
    pub fn with_lsh(mut self, band_count: usize, rows_per_band: usize) -> Self {
        self.band_count = band_count;
        self.rows_per_band = rows_per_band;
        self.signature_width = band_count * rows_per_band;
        self
    }

    /// Set Bloom filter sizing inputs
    pub fn with_bloom(mut self, expected_artifacts: usize, target_fpr: f64) -> Self {
        self.expected_artifacts = expected_artifacts;
        self.target_fpr = target_fpr;
        self
    }

    /// Set HyperLogLog precision (register count = 2^p)
    pub fn with_hll_precision(mut self, p: u8) -> Self {
        self.hll_precision = p;
        self
    }

    /// Validate the configuration
    ///
    /// Called by [`FingerprintEngine::new`](crate::FingerprintEngine::new);
    /// every failure mode here is a [`FingerprintError::Configuration`].
    pub fn validate(&self) -> Result<()> {
        if self.shingle_size == 0 {
            return Err(FingerprintError::config("shingle_size must be >= 1"));
        }
        if self.signature_width == 0 {
            return Err(FingerprintError::config("signature_width must be >= 1"));
        }
        if self.band_count * self.rows_per_band != self.signature_width {
            return Err(FingerprintError::config(format!(
                "band_count ({}) x rows_per_band ({}) must equal signature_width ({})",
                self.band_count, self.rows_per_band, self.signature_width
            )));
        }
        if self.expected_artifacts == 0 {
            return Err(FingerprintError::config("expected_artifacts must be >= 1"));
        }
        if !(self.target_fpr > 0.0 && self.target_fpr < 1.0) {
            return Err(FingerprintError::config(format!(
                "target_fpr must be in (0, 1), got {}",
                self.target_fpr
            )));
        }
        if !(4..=16).contains(&self.hll_precision) {
            return Err(FingerprintError::config(format!(
                "hll_precision must be in 4..=16, got {}",
                self.hll_precision
            )));
        }
        Ok(())
    }
}
