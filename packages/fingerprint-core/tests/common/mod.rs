//! Shared fixtures for integration tests

use fingerprint_core::{ChildOrdering, SyntaxNode};

/// Owned syntax tree standing in for an external parser's output
pub struct TestNode {
    pub kind: String,
    pub children: Vec<TestNode>,
}

impl TestNode {
    pub fn leaf(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(kind: &str, children: Vec<TestNode>) -> Self {
        Self {
            kind: kind.to_string(),
            children,
        }
    }
}

impl SyntaxNode for TestNode {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn children(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }
}

pub type Classifier = fn(&str) -> Option<ChildOrdering>;

pub fn classify(kind: &str) -> Option<ChildOrdering> {
    match kind {
        "imports" | "set" => Some(ChildOrdering::Unordered),
        "module" | "block" | "call" | "ident" | "lit" | "binop" => Some(ChildOrdering::Ordered),
        _ => None,
    }
}

/// Deterministic synthetic artifact: tree shape and token stream both
/// derived from the seed
pub fn artifact(seed: u64) -> (TestNode, Vec<String>) {
    let width = (seed % 5 + 1) as usize;
    let depth_marker = seed % 3;

    let children = (0..width)
        .map(|i| {
            let leaf = TestNode::leaf(if (seed + i as u64) % 2 == 0 { "ident" } else { "lit" });
            if depth_marker == 0 {
                leaf
            } else {
                TestNode::branch("call", vec![leaf, TestNode::leaf("lit")])
            }
        })
        .collect();

    let tree = TestNode::branch(
        "module",
        vec![
            TestNode::branch("block", children),
            TestNode::leaf(if seed % 7 == 0 { "ident" } else { "lit" }),
            // Encode the seed structurally so every seed is a distinct artifact
            seed_chain(seed),
        ],
    );

    let tokens = (0..40).map(|t| format!("tok_{}_{}", seed, t)).collect();
    (tree, tokens)
}

fn seed_chain(mut seed: u64) -> TestNode {
    let mut node = TestNode::leaf("lit");
    loop {
        node = TestNode::branch(if seed % 2 == 0 { "call" } else { "binop" }, vec![node]);
        seed /= 2;
        if seed == 0 {
            return node;
        }
    }
}
