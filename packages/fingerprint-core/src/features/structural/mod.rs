//! Canonical structural hashing of syntax trees

pub mod hasher;

pub use hasher::{ChildOrdering, KindClassifier, StructuralHasher, SyntaxNode};
