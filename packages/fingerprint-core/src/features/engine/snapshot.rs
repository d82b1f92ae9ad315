//! Persisted engine state
//!
//! Serializable layout for carrying an engine between runs: Bloom bit
//! words + (m, k), HLL registers + precision, the cluster map as
//! BandKey → FingerprintIds, and the exact fingerprint lookup the engine
//! retains for Bloom-hit verification. No raw artifact content is ever
//! persisted. Collections are sorted so snapshots are byte-deterministic.

use crate::config::EngineConfig;
use crate::errors::{FingerprintError, Result};
use crate::features::cardinality::CardinalityEstimator;
use crate::features::membership::{BloomIndex, BloomSnapshot};
use crate::features::structural::KindClassifier;
use crate::shared::models::{BandKey, Fingerprint, FingerprintId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::fingerprint_engine::FingerprintEngine;

/// Complete serializable engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Construction parameters; restored engines revalidate them
    pub config: EngineConfig,

    /// Bloom filter bits and derived sizing
    pub bloom: BloomSnapshot,

    /// HLL register array (length 2^config.hll_precision)
    pub hll_registers: Vec<u8>,

    /// Cluster map, sorted by band key
    pub clusters: Vec<(BandKey, Vec<FingerprintId>)>,

    /// Exact fingerprint lookup, sorted by fingerprint
    pub lookup: Vec<(Fingerprint, FingerprintId)>,

    /// Next id the allocator would hand out
    pub next_id: u64,

    /// Count of artifacts indexed without cluster registration
    pub degenerate_count: u64,
}

impl<C: KindClassifier> FingerprintEngine<C> {
    /// Capture the engine's persistent state
    ///
    /// Safe to call concurrently with writers; monotone structures mean a
    /// concurrent snapshot can only lag, never corrupt.
    pub fn snapshot(&self) -> EngineSnapshot {
        let (bloom, cardinality, lookup, clusters, next_id, degenerate_count) = self.internals();

        let mut cluster_entries: Vec<(BandKey, Vec<FingerprintId>)> = clusters
            .iter()
            .map(|entry| (*entry.key(), entry.value().iter().copied().collect()))
            .collect();
        cluster_entries.sort_by_key(|(key, _)| *key);

        let mut lookup_entries: Vec<(Fingerprint, FingerprintId)> = lookup
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        lookup_entries.sort_by_key(|(fingerprint, _)| *fingerprint);

        EngineSnapshot {
            config: self.config().clone(),
            bloom: bloom.snapshot(),
            hll_registers: cardinality.register_values(),
            clusters: cluster_entries,
            lookup: lookup_entries,
            next_id,
            degenerate_count,
        }
    }

    /// Rebuild an engine from a snapshot and a kind classification
    ///
    /// The classifier is not serializable state; the caller supplies the
    /// same classification the original engine used, or fingerprints will
    /// no longer verify.
    pub fn from_snapshot(snapshot: EngineSnapshot, classifier: C) -> Result<Self> {
        snapshot.config.validate()?;

        let expected_registers = 1usize << snapshot.config.hll_precision;
        if snapshot.hll_registers.len() != expected_registers {
            return Err(FingerprintError::config(format!(
                "snapshot has {} hll registers, config implies {}",
                snapshot.hll_registers.len(),
                expected_registers
            )));
        }

        let bloom = BloomIndex::from_snapshot(snapshot.bloom)?;
        let cardinality = CardinalityEstimator::from_registers(
            snapshot.config.hll_precision,
            snapshot.hll_registers,
        )?;

        let lookup = snapshot.lookup.into_iter().collect();
        let clusters = snapshot
            .clusters
            .into_iter()
            .map(|(key, members)| (key, members.into_iter().collect::<BTreeSet<_>>()))
            .collect();

        Self::from_parts(
            snapshot.config,
            classifier,
            bloom,
            cardinality,
            lookup,
            clusters,
            snapshot.next_id,
            snapshot.degenerate_count,
        )
    }
}
