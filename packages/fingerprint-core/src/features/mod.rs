//! Feature modules
//!
//! Each feature is a vertical slice of the fingerprinting pipeline:
//! - `structural/`   : canonical 256-bit syntax-tree hashing
//! - `similarity/`   : shingling, MinHash signatures, LSH banding
//! - `membership/`   : Bloom membership filter
//! - `cardinality/`  : HyperLogLog distinct-count sketch
//! - `engine/`       : orchestration and the public observe/query API

pub mod cardinality;
pub mod engine;
pub mod membership;
pub mod similarity;
pub mod structural;
