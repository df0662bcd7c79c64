//! Tree nodes and their hashes.

use idstate_core::{CryptoError, FieldElement};
use idstate_crypto::FieldHasher;

/// A sparse Merkle tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// An empty subtree; hashes to zero.
    Empty,
    /// A key/value leaf.
    Leaf {
        /// Leaf key.
        key: FieldElement,
        /// Leaf value.
        value: FieldElement,
    },
    /// An inner node.
    Middle {
        /// Hash of the left (bit 0) child.
        left: FieldElement,
        /// Hash of the right (bit 1) child.
        right: FieldElement,
    },
}

impl Node {
    /// Node hash under `hasher`.
    pub fn hash<H: FieldHasher + ?Sized>(&self, hasher: &H) -> Result<FieldElement, CryptoError> {
        match self {
            Node::Empty => Ok(FieldElement::zero()),
            Node::Leaf { key, value } => leaf_hash(hasher, key, value),
            Node::Middle { left, right } => hasher.hash2(left, right),
        }
    }
}

/// `H(key, value, 1)`.
pub fn leaf_hash<H: FieldHasher + ?Sized>(
    hasher: &H,
    key: &FieldElement,
    value: &FieldElement,
) -> Result<FieldElement, CryptoError> {
    hasher.hash(&[*key, *value, FieldElement::one()])
}
