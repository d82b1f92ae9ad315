//! Engine orchestration (public observe/query API)

pub mod fingerprint_engine;
pub mod snapshot;

pub use fingerprint_engine::{EngineStats, FingerprintEngine, ObserveOutcome, ObserveStatus};
pub use snapshot::EngineSnapshot;
