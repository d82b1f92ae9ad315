//! Exact-membership filtering (probabilistic, zero false negatives)

pub mod bloom;

pub use bloom::{BloomIndex, BloomSnapshot};
