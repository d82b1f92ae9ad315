//! Shared models and hashing utilities

pub mod hashing;
pub mod models;

pub use models::{BandKey, ClusterId, Fingerprint, FingerprintId};
