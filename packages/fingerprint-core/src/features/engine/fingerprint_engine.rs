//! Fingerprint Engine (orchestrator)
//!
//! Binds the probabilistic structures into one insert/query surface:
//!
//! ```text
//! observe(tree, tokens)
//!   ├─ StructuralHasher   → Fingerprint            (pure, fallible)
//!   ├─ BloomIndex         → "probably seen?"       (shared, monotone)
//!   ├─ exact lookup       → verification           (the only exact state)
//!   └─ if new: Bloom insert + HLL add + MinHash/LSH cluster registration
//! ```
//!
//! Per-artifact state machine: Unobserved → Hashed → Indexed. A Bloom hit
//! is never trusted on its own; the mandatory exact-fingerprint check
//! upgrades "probably seen" into an exact duplicate/false-positive
//! decision. A Bloom miss needs no verification: bits are never cleared,
//! so absence is definitive.
//!
//! # Concurrency
//!
//! Hashing, shingling, and signature computation are pure per call. The
//! shared structures are all lock-free monotone updates (atomic bit-set,
//! atomic register max, concurrent-map inserts), so `observe` may be
//! called from many worker threads; [`FingerprintEngine::observe_batch`]
//! shards a batch across rayon workers. No operation here performs I/O or
//! blocks.
//!
//! # Failure atomicity
//!
//! The only fallible step (structural hashing) runs before any shared
//! mutation, so a failed `observe` leaves the Bloom filter, the registers,
//! and the cluster map exactly as they were.

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::cardinality::CardinalityEstimator;
use crate::features::membership::BloomIndex;
use crate::features::similarity::{LshBander, MinHashSketch, ShingleExtractor};
use crate::features::structural::{KindClassifier, StructuralHasher, SyntaxNode};
use crate::shared::models::{BandKey, ClusterId, Fingerprint, FingerprintId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

type Map<K, V> = DashMap<K, V, ahash::RandomState>;

/// How an `observe` call resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveStatus {
    /// First time this fingerprint was seen; fully indexed
    Indexed,
    /// Exact duplicate of an already-indexed artifact; nothing re-indexed
    Duplicate,
}

/// Result of observing one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserveOutcome {
    /// Stable handle for the artifact's fingerprint
    pub id: FingerprintId,
    /// Whether the artifact was newly indexed or a known duplicate
    pub status: ObserveStatus,
}

/// Aggregate engine counters for observability
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStats {
    /// Distinct fingerprints indexed (exact)
    pub indexed_artifacts: u64,
    /// Artifacts indexed without cluster registration (empty shingle sets)
    pub degenerate_artifacts: u64,
    /// Number of non-empty LSH buckets
    pub cluster_count: usize,
    /// Bits set in the Bloom filter
    pub bloom_set_bits: u64,
    /// Fraction of Bloom bits set
    pub bloom_fill_ratio: f64,
    /// HLL distinct-count estimate
    pub estimated_distinct: u64,
}

/// Probabilistic structural-fingerprint indexing engine
///
/// All parameters are fixed at construction; see [`EngineConfig`].
pub struct FingerprintEngine<C: KindClassifier> {
    config: EngineConfig,
    hasher: StructuralHasher<C>,
    shingler: ShingleExtractor,
    sketcher: MinHashSketch,
    bander: LshBander,
    bloom: BloomIndex,
    cardinality: CardinalityEstimator,

    /// Exact fingerprint → id lookup; the only exact state the engine
    /// keeps, and what verifies Bloom hits
    lookup: Map<Fingerprint, FingerprintId>,

    /// BandKey → members; clusters only ever grow
    clusters: Map<BandKey, BTreeSet<FingerprintId>>,

    next_id: AtomicU64,
    degenerate_count: AtomicU64,
}

impl<C: KindClassifier> FingerprintEngine<C> {
    /// Build an engine from a validated configuration and a caller-supplied
    /// node-kind classification
    pub fn new(config: EngineConfig, classifier: C) -> Result<Self> {
        config.validate()?;

        let engine = Self {
            hasher: StructuralHasher::new(classifier),
            shingler: ShingleExtractor::new(config.shingle_size)?,
            sketcher: MinHashSketch::new(config.signature_width)?,
            bander: LshBander::new(
                config.band_count,
                config.rows_per_band,
                config.signature_width,
            )?,
            bloom: BloomIndex::new(config.expected_artifacts, config.target_fpr)?,
            cardinality: CardinalityEstimator::new(config.hll_precision)?,
            lookup: Map::default(),
            clusters: Map::default(),
            next_id: AtomicU64::new(0),
            degenerate_count: AtomicU64::new(0),
            config,
        };

        debug!(
            shingle_size = engine.config.shingle_size,
            signature_width = engine.config.signature_width,
            band_count = engine.config.band_count,
            rows_per_band = engine.config.rows_per_band,
            bloom_bits = engine.bloom.bit_count(),
            bloom_hashes = engine.bloom.hash_count(),
            hll_registers = engine.cardinality.register_count(),
            "fingerprint engine constructed"
        );

        Ok(engine)
    }

    /// The configuration the engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Observe one artifact: index it if new, return the existing id if not
    ///
    /// Errors (unknown node kinds) surface before any shared state is
    /// touched; a failed call mutates nothing.
    pub fn observe<N: SyntaxNode, T: Hash>(
        &self,
        tree: &N,
        tokens: &[T],
    ) -> Result<ObserveOutcome> {
        // Unobserved → Hashed; the only fallible transition
        let fingerprint = self.hasher.hash(tree)?;

        // Fast path: a Bloom hit is only "probably seen" and must be
        // verified against exact state before skipping the index work
        if self.bloom.contains(&fingerprint) {
            if let Some(existing) = self.lookup.get(&fingerprint) {
                return Ok(ObserveOutcome {
                    id: *existing.value(),
                    status: ObserveStatus::Duplicate,
                });
            }
            debug!(%fingerprint, "bloom false positive routed to indexing");
        }

        // Signature work happens outside the map entry lock; it is pure
        let signature = self.sketcher.signature(&self.shingler.shingles(tokens));

        // Hashed → Indexed; the entry API arbitrates concurrent observes
        // of the same artifact so exactly one caller indexes it
        match self.lookup.entry(fingerprint) {
            Entry::Occupied(occupied) => Ok(ObserveOutcome {
                id: *occupied.get(),
                status: ObserveStatus::Duplicate,
            }),
            Entry::Vacant(vacant) => {
                let id = FingerprintId(self.next_id.fetch_add(1, Ordering::Relaxed));
                vacant.insert(id);

                self.bloom.insert(&fingerprint);
                self.cardinality.add(&fingerprint);

                if signature.is_degenerate() {
                    // Defined edge case, not an error: too few tokens to
                    // shingle, so this artifact matches by fingerprint only
                    self.degenerate_count.fetch_add(1, Ordering::Relaxed);
                    info!(%fingerprint, %id, "degenerate artifact: no shingles, exact matching only");
                } else {
                    for key in self.bander.bands(&signature) {
                        self.clusters.entry(key).or_default().insert(id);
                    }
                }

                Ok(ObserveOutcome {
                    id,
                    status: ObserveStatus::Indexed,
                })
            }
        }
    }

    /// Observe a batch of artifacts, sharded across rayon workers
    ///
    /// Only the final shared-state updates funnel through the lock-free
    /// paths; hashing and signatures run fully in parallel. Output order
    /// matches input order.
    pub fn observe_batch<N, T>(&self, artifacts: &[(N, Vec<T>)]) -> Vec<Result<ObserveOutcome>>
    where
        N: SyntaxNode + Sync,
        T: Hash + Sync,
        C: Sync,
    {
        artifacts
            .par_iter()
            .map(|(tree, tokens)| self.observe(tree, tokens))
            .collect()
    }

    /// Exact membership: has a structurally identical artifact been indexed?
    ///
    /// Bloom miss → definitive no. Bloom hit → verified against the exact
    /// lookup, so the answer carries no false positives either.
    pub fn exists<N: SyntaxNode>(&self, tree: &N) -> Result<bool> {
        let fingerprint = self.hasher.hash(tree)?;
        Ok(self.bloom.contains(&fingerprint) && self.lookup.contains_key(&fingerprint))
    }

    /// Near-duplicate candidate clusters for a token stream
    ///
    /// Returns the ids of every existing cluster the artifact's signature
    /// bands collide with. Degenerate (unshingleable) inputs belong to no
    /// cluster and yield an empty list. Sorted by band, deterministic.
    pub fn similar_clusters<T: Hash>(&self, tokens: &[T]) -> Vec<ClusterId> {
        let signature = self.sketcher.signature(&self.shingler.shingles(tokens));
        if signature.is_degenerate() {
            return Vec::new();
        }

        self.bander
            .bands(&signature)
            .into_iter()
            .filter(|key| self.clusters.contains_key(key))
            .map(ClusterId)
            .collect()
    }

    /// Members of a cluster, if it exists
    pub fn cluster_members(&self, cluster: ClusterId) -> Option<Vec<FingerprintId>> {
        self.clusters
            .get(&cluster.0)
            .map(|members| members.iter().copied().collect())
    }

    /// Approximate number of distinct artifacts ever observed
    pub fn estimated_distinct_count(&self) -> u64 {
        self.cardinality.count()
    }

    /// Exact number of indexed artifacts (from the retained lookup)
    pub fn indexed_count(&self) -> u64 {
        self.lookup.len() as u64
    }

    /// Aggregate counters for logging/monitoring
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            indexed_artifacts: self.lookup.len() as u64,
            degenerate_artifacts: self.degenerate_count.load(Ordering::Relaxed),
            cluster_count: self.clusters.len(),
            bloom_set_bits: self.bloom.set_bit_count(),
            bloom_fill_ratio: self.bloom.fill_ratio(),
            estimated_distinct: self.cardinality.count(),
        }
    }

    pub(crate) fn internals(
        &self,
    ) -> (
        &BloomIndex,
        &CardinalityEstimator,
        &Map<Fingerprint, FingerprintId>,
        &Map<BandKey, BTreeSet<FingerprintId>>,
        u64,
        u64,
    ) {
        (
            &self.bloom,
            &self.cardinality,
            &self.lookup,
            &self.clusters,
            self.next_id.load(Ordering::Relaxed),
            self.degenerate_count.load(Ordering::Relaxed),
        )
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        classifier: C,
        bloom: BloomIndex,
        cardinality: CardinalityEstimator,
        lookup: Map<Fingerprint, FingerprintId>,
        clusters: Map<BandKey, BTreeSet<FingerprintId>>,
        next_id: u64,
        degenerate_count: u64,
    ) -> Result<Self> {
        config.validate()?;

        // A snapshot taken while a writer was mid-observe can capture the
        // id counter before the racing entry landed in the lookup. The
        // counter must never re-issue an id the lookup already binds.
        let past_highest = lookup
            .iter()
            .map(|entry| entry.value().0 + 1)
            .max()
            .unwrap_or(0);
        let next_id = next_id.max(past_highest);

        Ok(Self {
            hasher: StructuralHasher::new(classifier),
            shingler: ShingleExtractor::new(config.shingle_size)?,
            sketcher: MinHashSketch::new(config.signature_width)?,
            bander: LshBander::new(
                config.band_count,
                config.rows_per_band,
                config.signature_width,
            )?,
            bloom,
            cardinality,
            lookup,
            clusters,
            next_id: AtomicU64::new(next_id),
            degenerate_count: AtomicU64::new(degenerate_count),
            config,
        })
    }
}
