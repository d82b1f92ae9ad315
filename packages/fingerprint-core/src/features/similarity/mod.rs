//! Near-duplicate detection pipeline
//!
//! ShingleExtractor → MinHashSketch → LshBander. Shingling and signature
//! computation are pure per call; only the engine's cluster map is shared
//! state.

pub mod lsh;
pub mod minhash;
pub mod shingle;

pub use lsh::LshBander;
pub use minhash::{MinHashSignature, MinHashSketch};
pub use shingle::{ShingleExtractor, ShingleSet};
