//! Error types for fingerprint-core
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

/// Main error type for fingerprint-core operations
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// A syntax-tree node carried a type tag the caller-supplied classifier
    /// does not recognize. Fatal to the single hash call, never to the engine:
    /// hashing a placeholder instead would corrupt fingerprint uniqueness.
    #[error("unknown syntax node kind: {kind}")]
    UnknownNodeKind { kind: String },

    /// Invalid construction parameters (band/row mismatch, zero capacity,
    /// out-of-range false-positive rate, ...). Raised at construction time,
    /// never at call time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Two sketches with different shapes cannot be merged.
    #[error("incompatible sketches: {0}")]
    IncompatibleSketch(String),
}

impl FingerprintError {
    /// Create an unknown-node-kind error
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        FingerprintError::UnknownNodeKind { kind: kind.into() }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        FingerprintError::Configuration(msg.into())
    }

    /// Create an incompatible-sketch error
    pub fn incompatible(msg: impl Into<String>) -> Self {
        FingerprintError::IncompatibleSketch(msg.into())
    }
}

/// Result type alias for fingerprint-core operations
pub type Result<T> = std::result::Result<T, FingerprintError>;
