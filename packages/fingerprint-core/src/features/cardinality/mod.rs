//! Distinct-count estimation (HyperLogLog)

pub mod hll;

pub use hll::CardinalityEstimator;
