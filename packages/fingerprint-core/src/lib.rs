//! fingerprint-core: probabilistic structural-fingerprint indexing
//!
//! Answers three questions about very large artifact corpora using space
//! orders of magnitude smaller than the raw content:
//! - "have I seen this artifact (or an equivalent one) before?"
//!   (exact, zero false negatives)
//! - "what is its near-duplicate cluster?" (bounded, tunable error)
//! - "how many distinct artifacts exist?" (bounded, tunable error)
//!
//! # Feature-First Architecture
//!
//! ```text
//! shared/       : Fingerprint / id types, seeded hashing primitives
//! features/
//!   structural/ : canonical 256-bit syntax-tree hashing (SHA-256)
//!   similarity/ : shingling → MinHash signatures → LSH banding
//!   membership/ : Bloom filter (atomic bit-set, insert-only)
//!   cardinality/: HyperLogLog (atomic-max registers, union by max)
//!   engine/     : orchestration, persistence snapshots
//! ```
//!
//! Parsing is an external collaborator: the engine consumes an
//! already-built tree through [`SyntaxNode`] plus a token stream, and a
//! caller-supplied [`KindClassifier`] decides which node kinds are
//! order-sensitive.
//!
//! # Example
//!
//! ```
//! use fingerprint_core::{ChildOrdering, EngineConfig, FingerprintEngine, SyntaxNode};
//!
//! struct Node {
//!     kind: &'static str,
//!     children: Vec<Node>,
//! }
//!
//! impl SyntaxNode for Node {
//!     fn kind(&self) -> &str {
//!         self.kind
//!     }
//!     fn children(&self) -> Vec<&Self> {
//!         self.children.iter().collect()
//!     }
//! }
//!
//! let engine = FingerprintEngine::new(
//!     EngineConfig::default(),
//!     |kind: &str| match kind {
//!         "imports" => Some(ChildOrdering::Unordered),
//!         _ => Some(ChildOrdering::Ordered),
//!     },
//! )
//! .unwrap();
//!
//! let artifact = Node {
//!     kind: "block",
//!     children: vec![Node { kind: "call", children: vec![] }],
//! };
//! let tokens = ["fn", "main", "(", ")", "{", "call", "(", ")", "}"];
//!
//! let outcome = engine.observe(&artifact, &tokens).unwrap();
//! assert!(engine.exists(&artifact).unwrap());
//! assert_eq!(engine.observe(&artifact, &tokens).unwrap().id, outcome.id);
//! ```

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports
// ═══════════════════════════════════════════════════════════════════════════

/// Engine configuration
pub mod config;

/// Error types
pub mod errors;

/// Feature modules
pub mod features;

/// Shared models and hashing utilities
pub mod shared;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::EngineConfig;
pub use errors::{FingerprintError, Result};

pub use features::cardinality::CardinalityEstimator;
pub use features::engine::{
    EngineSnapshot, EngineStats, FingerprintEngine, ObserveOutcome, ObserveStatus,
};
pub use features::membership::{BloomIndex, BloomSnapshot};
pub use features::similarity::{
    LshBander, MinHashSignature, MinHashSketch, ShingleExtractor, ShingleSet,
};
pub use features::structural::{ChildOrdering, KindClassifier, StructuralHasher, SyntaxNode};

pub use shared::models::{BandKey, ClusterId, Fingerprint, FingerprintId};
