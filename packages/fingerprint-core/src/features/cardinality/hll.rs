//! HyperLogLog cardinality estimator over fingerprints
//!
//! Flajolet et al. (2007): hash every element to 64 bits, route it to one
//! of m = 2^p registers by its top p bits, and record in the register the
//! maximum leading-zero-run length (+1) seen in the remaining bits. The
//! harmonic mean of 2^register across all registers estimates the number
//! of distinct elements.
//!
//! # Accuracy
//!
//! Standard error ≈ `1.04 / sqrt(m)`:
//! - p = 12 (4096 registers, 4 KiB) → ~1.6%
//! - p = 14 (16384 registers, 16 KiB) → ~0.8%
//!
//! # Corrections
//!
//! The raw bias-corrected estimate `α·m²·(Σ 2^-register[i])^-1` is patched
//! at the documented breakpoints:
//! - E ≤ 2.5·m with empty registers present → linear counting
//!   `m·ln(m/zeros)`
//! - E > 2^32/30 → large-range correction `-2^32·ln(1 - E/2^32)`
//!
//! # Merging
//!
//! The union of two same-sized sketches is the element-wise **maximum** of
//! their registers (never an average): it reproduces exactly the sketch
//! that would have been built from the union of the original element sets,
//! without ever touching raw elements.
//!
//! # Concurrency
//!
//! Registers are `AtomicU8` updated with `fetch_max`; a monotone maximum
//! is safe under concurrent writers regardless of write order, and readers
//! may observe a slightly stale but monotonically-valid state.

use crate::errors::{FingerprintError, Result};
use crate::shared::models::Fingerprint;
use std::sync::atomic::{AtomicU8, Ordering};

/// Register-based distinct-count sketch; registers only ever increase
#[derive(Debug)]
pub struct CardinalityEstimator {
    registers: Vec<AtomicU8>,
    precision: u8,
}

impl CardinalityEstimator {
    /// Create an estimator with 2^precision registers
    ///
    /// Precision must be in 4..=16.
    pub fn new(precision: u8) -> Result<Self> {
        if !(4..=16).contains(&precision) {
            return Err(FingerprintError::config(format!(
                "hll precision must be in 4..=16, got {precision}"
            )));
        }
        let register_count = 1usize << precision;
        let registers = (0..register_count).map(|_| AtomicU8::new(0)).collect();
        Ok(Self {
            registers,
            precision,
        })
    }

    /// Rebuild an estimator from persisted register values
    pub fn from_registers(precision: u8, values: Vec<u8>) -> Result<Self> {
        let estimator = Self::new(precision)?;
        if values.len() != estimator.registers.len() {
            return Err(FingerprintError::config(format!(
                "expected {} registers for precision {precision}, got {}",
                estimator.registers.len(),
                values.len()
            )));
        }
        for (register, value) in estimator.registers.iter().zip(values) {
            register.store(value, Ordering::Relaxed);
        }
        Ok(estimator)
    }

    /// Number of registers m
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Configured precision p
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Documented standard error of `count`: `1.04 / sqrt(m)`
    pub fn standard_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    /// Current register values (persistence and invariance tests)
    pub fn register_values(&self) -> Vec<u8> {
        self.registers
            .iter()
            .map(|register| register.load(Ordering::Relaxed))
            .collect()
    }

    /// Feed one fingerprint into the sketch
    ///
    /// Uses digest lane 2, independent of the lanes driving the Bloom
    /// filter. The top p bits select the register, the leading-zero run of
    /// the remaining bits (+1) is max-combined into it. Any fixed p-bit
    /// field of the lane gives an estimator with identical distribution
    /// (the lane bits are uniform and independent); the top bits let the
    /// remainder keep the natural left alignment for the run count. The
    /// layout is part of the persisted-register format and must not change
    /// between runs.
    pub fn add(&self, fingerprint: &Fingerprint) {
        let hashed = fingerprint.lane(2);

        let index = (hashed >> (64 - self.precision)) as usize;
        let remainder = hashed << self.precision;
        // remainder == 0 ⇒ run covers all 64 - p remaining bits
        let rho = (remainder.leading_zeros() as u8).min(64 - self.precision) + 1;

        self.registers[index].fetch_max(rho, Ordering::Relaxed);
    }

    /// Bias-corrected distinct-count estimate with range corrections
    pub fn count(&self) -> u64 {
        let m = self.registers.len() as f64;
        let alpha = Self::alpha(self.registers.len());

        let mut sum = 0.0;
        let mut zero_registers = 0usize;
        for register in &self.registers {
            let value = register.load(Ordering::Relaxed);
            if value == 0 {
                zero_registers += 1;
            }
            sum += 2.0f64.powi(-i32::from(value));
        }

        let raw = alpha * m * m / sum;

        let corrected = if raw <= 2.5 * m && zero_registers > 0 {
            // Small-range: linear counting is more accurate while many
            // registers are still empty
            m * (m / zero_registers as f64).ln()
        } else if raw > TWO_POW_32 / 30.0 {
            // Large-range: correct for 32-bit hash-space saturation
            -TWO_POW_32 * (1.0 - raw / TWO_POW_32).ln()
        } else {
            raw
        };

        corrected.round() as u64
    }

    /// Merge two same-sized sketches into a new one via per-register max
    ///
    /// `union(a, b).count()` estimates |elements(a) ∪ elements(b)|.
    /// Commutative and associative. Fails with an incompatible-sketch
    /// error when register counts differ.
    pub fn union(&self, other: &Self) -> Result<Self> {
        if self.precision != other.precision {
            return Err(FingerprintError::incompatible(format!(
                "cannot union precision {} with precision {}",
                self.precision, other.precision
            )));
        }

        let merged = Self::new(self.precision)?;
        for ((out, a), b) in merged
            .registers
            .iter()
            .zip(&self.registers)
            .zip(&other.registers)
        {
            let max = a
                .load(Ordering::Relaxed)
                .max(b.load(Ordering::Relaxed));
            out.store(max, Ordering::Relaxed);
        }
        Ok(merged)
    }

    fn alpha(register_count: usize) -> f64 {
        match register_count {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            m => 0.7213 / (1.0 + 1.079 / m as f64),
        }
    }
}

const TWO_POW_32: f64 = 4_294_967_296.0;
