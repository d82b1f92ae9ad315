//! Core identifier and fingerprint types
//!
//! These are the only values the engine hands back to callers; an external
//! relationship store persists them as opaque handles. None of them carry
//! raw artifact content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical 256-bit structural hash of a syntax tree
///
/// Deterministic for structurally identical trees regardless of child
/// ordering where order is not semantically meaningful. Immutable once
/// computed. At 256 bits the birthday bound for 10^9 artifacts is far
/// below 2^-64, so fingerprint equality is treated as artifact identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wrap a raw 256-bit digest
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Fingerprint(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// One of four independent little-endian 64-bit lanes of the digest
    ///
    /// The digest bits are uniform and independent, so distinct lanes act
    /// as independent hash values. Lane 0/1 drive the Bloom double-hash,
    /// lane 2 drives the cardinality sketch.
    pub fn lane(&self, index: usize) -> u64 {
        let start = (index % 4) * 8;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[start..start + 8]);
        u64::from_le_bytes(bytes)
    }

    /// Lowercase hex rendering of the full digest
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in &self.0 {
            out.push_str(&format!("{:02x}", byte));
        }
        out
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars are enough to eyeball in logs
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "..")
    }
}

/// Engine-local handle for an indexed artifact
///
/// Allocated once per distinct fingerprint; re-observing an identical tree
/// returns the original id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct FingerprintId(pub u64);

impl fmt::Display for FingerprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fp:{}", self.0)
    }
}

/// Bucket key for one LSH band of a MinHash signature
///
/// Only bucket collision is meaningful; band keys are never compared for
/// similarity directly. The band index is part of the key so that equal
/// hashes in different bands do not alias.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BandKey {
    /// Which band of the signature this key was derived from
    pub band: u32,

    /// Hash over the band's rows
    pub hash: u64,
}

impl fmt::Display for BandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}:{:016x}", self.band, self.hash)
    }
}

/// Handle for a near-duplicate cluster
///
/// A cluster is the set of artifacts whose signatures collide in at least
/// one band; it is identified by the representative band key and only ever
/// grows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ClusterId(pub BandKey);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster:{}", self.0)
    }
}
