//! Structural Hasher (canonical syntax-tree fingerprints)
//!
//! Computes a 256-bit fingerprint of a syntax tree that is stable under
//! whitespace changes, identifier renaming, and reordering of children
//! wherever the caller declares order semantically meaningless.
//!
//! # Algorithm
//!
//! Bottom-up over the tree:
//! 1. Leaf hash = H(kind tag); node type only, never source text
//! 2. Internal, order-insensitive kind = H(kind || sorted(children hashes))
//! 3. Internal, order-sensitive kind = H(kind || children hashes in order)
//!
//! H is SHA-256, so collisions are negligible relative to any realistic
//! corpus (birthday bound at 10^9 artifacts is far below 2^-64).
//!
//! Which kinds are order-sensitive is a caller-supplied classification; a
//! kind the classifier does not recognize fails the whole hash call with
//! [`FingerprintError::UnknownNodeKind`] instead of hashing a placeholder.
//!
//! # Performance
//!
//! - **Traversal**: O(n) nodes, iterative with an explicit stack; a
//!   pathological million-deep tree cannot exhaust the call stack
//! - **Sorting**: O(c log c) per order-insensitive node with c children

use crate::errors::{FingerprintError, Result};
use crate::shared::models::Fingerprint;
use sha2::{Digest, Sha256};

/// How an internal node's children combine into its hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOrdering {
    /// Child order is semantically meaningful (statement lists, arguments)
    Ordered,
    /// Child order is irrelevant (set-like constructs, import groups)
    Unordered,
}

/// Caller-supplied classification of syntax-node kinds
///
/// Returning `None` marks the kind as unknown and fails the hash call.
/// Implemented for closures, so grammars can be described inline:
///
/// ```
/// use fingerprint_core::{ChildOrdering, StructuralHasher};
///
/// let hasher = StructuralHasher::new(|kind: &str| match kind {
///     "block" | "call" => Some(ChildOrdering::Ordered),
///     "import_set" => Some(ChildOrdering::Unordered),
///     _ => None,
/// });
/// # let _ = hasher;
/// ```
pub trait KindClassifier: Send + Sync {
    /// Classify a node kind, or `None` if the kind is not recognized
    fn classify(&self, kind: &str) -> Option<ChildOrdering>;
}

impl<F> KindClassifier for F
where
    F: Fn(&str) -> Option<ChildOrdering> + Send + Sync,
{
    fn classify(&self, kind: &str) -> Option<ChildOrdering> {
        self(kind)
    }
}

/// Minimal view of an externally-parsed syntax tree
///
/// The engine never parses source text itself; it consumes trees through
/// this interface. `children` returns borrowed handles in source order.
pub trait SyntaxNode {
    /// Node type tag (grammar production name)
    fn kind(&self) -> &str;

    /// Children in source order
    fn children(&self) -> Vec<&Self>;
}

// Domain-separation tags so a leaf named "x" can never collide with an
// internal node whose serialized children happen to spell "x".
const TAG_NODE: u8 = 0x01;

/// Canonical structural hasher
///
/// Pure and stateless per call: one instance may hash distinct artifacts
/// concurrently from many threads.
pub struct StructuralHasher<C: KindClassifier> {
    classifier: C,
}

enum Frame<'a, N: SyntaxNode> {
    Enter(&'a N),
    Exit {
        kind: &'a str,
        ordering: ChildOrdering,
        child_count: usize,
    },
}

impl<C: KindClassifier> StructuralHasher<C> {
    /// Create a hasher with a caller-supplied kind classification
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// Compute the canonical fingerprint of a tree
    ///
    /// Idempotent: the same tree content always yields the same
    /// fingerprint. Fails with [`FingerprintError::UnknownNodeKind`] if any
    /// node kind is not recognized by the classifier; nothing is hashed
    /// "best effort".
    pub fn hash<N: SyntaxNode>(&self, root: &N) -> Result<Fingerprint> {
        // Explicit work stack + value stack instead of recursion; the value
        // stack holds finished child fingerprints in post-order.
        let mut work: Vec<Frame<'_, N>> = vec![Frame::Enter(root)];
        let mut values: Vec<Fingerprint> = Vec::new();

        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(node) => {
                    let kind = node.kind();
                    let ordering = self
                        .classifier
                        .classify(kind)
                        .ok_or_else(|| FingerprintError::unknown_kind(kind))?;

                    let children = node.children();
                    work.push(Frame::Exit {
                        kind,
                        ordering,
                        child_count: children.len(),
                    });
                    // Reverse push so children pop in source order
                    for child in children.into_iter().rev() {
                        work.push(Frame::Enter(child));
                    }
                }
                Frame::Exit {
                    kind,
                    ordering,
                    child_count,
                } => {
                    let split = values.len() - child_count;
                    let mut child_hashes = values.split_off(split);

                    if ordering == ChildOrdering::Unordered {
                        child_hashes.sort_unstable();
                    }

                    values.push(Self::combine(kind, &child_hashes));
                }
            }
        }

        // The root's Exit frame is always last, leaving exactly one value
        values.pop().ok_or_else(|| {
            FingerprintError::config("structural hash produced no value for root")
        })
    }

    fn combine(kind: &str, child_hashes: &[Fingerprint]) -> Fingerprint {
        let mut digest = Sha256::new();
        digest.update([TAG_NODE]);
        digest.update((kind.len() as u64).to_le_bytes());
        digest.update(kind.as_bytes());
        digest.update((child_hashes.len() as u64).to_le_bytes());
        for child in child_hashes {
            digest.update(child.as_bytes());
        }
        Fingerprint::from_bytes(digest.finalize().into())
    }
}
