//! # Sparse Merkle Tree
//!
//! Insertion, lookup and proof generation over a content-addressed node
//! store.
//!
//! ## Depth
//!
//! A tree of depth `d` places leaves at levels `0..d`, so a key path uses
//! at most `d - 1` bits and a proof carries at most `d - 1` siblings.
//! Circuits that consume proofs pad the siblings to `d` entries.
//!
//! ## Security Invariant
//!
//! Nodes are never mutated or removed. An insert writes a fresh path and
//! returns a new root; every earlier root still resolves to the exact tree
//! it committed to.

use serde::{Deserialize, Serialize};

use idstate_core::{FieldElement, TreeError};
use idstate_crypto::{FieldHasher, Poseidon};

use crate::node::Node;
use crate::proof::{NodeAux, Proof};
use crate::store::{MemoryNodeStore, NodeStore};

/// Largest supported depth; paths use at most 253 bits of a 254-bit key.
pub const MAX_DEPTH: usize = 254;

/// Which key bit selects the child at level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BitOrder {
    /// Level `i` reads key bit `i`.
    #[default]
    LsbFirst,
    /// Level `i` reads key bit `d - 2 - i`.
    MsbFirst,
}

/// Shape of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Number of levels, 1..=254.
    pub depth: usize,
    /// Key bit order along a path.
    #[serde(default)]
    pub bit_order: BitOrder,
}

impl TreeConfig {
    /// Least-significant-bit-first tree of `depth` levels.
    pub fn new(depth: usize) -> Result<Self, TreeError> {
        let config = Self {
            depth,
            bit_order: BitOrder::LsbFirst,
        };
        config.validate()?;
        Ok(config)
    }

    /// Same depth, different bit order.
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Reject depths outside 1..=254.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(TreeError::InvalidDepth(self.depth));
        }
        Ok(())
    }

    /// Path bit of `key` at `level`; `true` selects the right child.
    pub fn path_bit(&self, key: &FieldElement, level: usize) -> bool {
        match self.bit_order {
            BitOrder::LsbFirst => key.bit(level),
            BitOrder::MsbFirst => {
                let path_len = self.depth.saturating_sub(1);
                level < path_len && key.bit(path_len - 1 - level)
            }
        }
    }
}

/// A sparse Merkle tree over a shared node store.
#[derive(Debug, Clone)]
pub struct SparseMerkleTree<H = Poseidon, S = MemoryNodeStore> {
    hasher: H,
    store: S,
    config: TreeConfig,
    root: FieldElement,
}

impl SparseMerkleTree {
    /// Empty Poseidon tree over a fresh in-memory store.
    pub fn new(config: TreeConfig) -> Result<Self, TreeError> {
        Self::with_parts(Poseidon, MemoryNodeStore::new(), config)
    }
}

impl<H: FieldHasher, S: NodeStore> SparseMerkleTree<H, S> {
    /// Empty tree over the given hasher and store.
    pub fn with_parts(hasher: H, store: S, config: TreeConfig) -> Result<Self, TreeError> {
        Self::at_root(hasher, store, config, FieldElement::zero())
    }

    /// Open the tree committed to by `root` in `store`.
    pub fn at_root(
        hasher: H,
        store: S,
        config: TreeConfig,
        root: FieldElement,
    ) -> Result<Self, TreeError> {
        config.validate()?;
        Ok(Self {
            hasher,
            store,
            config,
            root,
        })
    }

    /// Current root.
    pub fn root(&self) -> FieldElement {
        self.root
    }

    /// Tree shape.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hash function.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Insert `key → value` and advance the root.
    pub fn add(&mut self, key: FieldElement, value: FieldElement) -> Result<FieldElement, TreeError> {
        let new_root = self.add_at(self.root, key, value)?;
        tracing::debug!(
            old_root = %self.root,
            new_root = %new_root,
            "inserted leaf"
        );
        self.root = new_root;
        Ok(new_root)
    }

    /// Insert `key → value` into the tree committed to by `root` and return
    /// the resulting root without moving this tree.
    pub fn add_at(
        &self,
        root: FieldElement,
        key: FieldElement,
        value: FieldElement,
    ) -> Result<FieldElement, TreeError> {
        self.add_leaf(key, value, root, 0)
    }

    fn add_leaf(
        &self,
        key: FieldElement,
        value: FieldElement,
        node_hash: FieldElement,
        level: usize,
    ) -> Result<FieldElement, TreeError> {
        if level >= self.config.depth {
            return Err(TreeError::MaxDepthReached(self.config.depth));
        }
        match self.node(&node_hash)? {
            Node::Empty => self.store_node(Node::Leaf { key, value }),
            Node::Leaf { key: old_key, .. } => {
                if old_key == key {
                    return Err(TreeError::KeyAlreadyExists);
                }
                self.push_leaf(key, value, old_key, node_hash, level)
            }
            Node::Middle { left, right } => {
                let node = if self.config.path_bit(&key, level) {
                    let right = self.add_leaf(key, value, right, level + 1)?;
                    Node::Middle { left, right }
                } else {
                    let left = self.add_leaf(key, value, left, level + 1)?;
                    Node::Middle { left, right }
                };
                self.store_node(node)
            }
        }
    }

    /// Push the existing leaf and the new one down until their paths split.
    fn push_leaf(
        &self,
        key: FieldElement,
        value: FieldElement,
        old_key: FieldElement,
        old_hash: FieldElement,
        level: usize,
    ) -> Result<FieldElement, TreeError> {
        if level + 1 >= self.config.depth {
            return Err(TreeError::MaxDepthReached(self.config.depth));
        }
        let new_bit = self.config.path_bit(&key, level);
        let old_bit = self.config.path_bit(&old_key, level);
        if new_bit == old_bit {
            let next = self.push_leaf(key, value, old_key, old_hash, level + 1)?;
            let node = if new_bit {
                Node::Middle {
                    left: FieldElement::zero(),
                    right: next,
                }
            } else {
                Node::Middle {
                    left: next,
                    right: FieldElement::zero(),
                }
            };
            return self.store_node(node);
        }
        let new_hash = self.store_node(Node::Leaf { key, value })?;
        let node = if new_bit {
            Node::Middle {
                left: old_hash,
                right: new_hash,
            }
        } else {
            Node::Middle {
                left: new_hash,
                right: old_hash,
            }
        };
        self.store_node(node)
    }

    /// Value stored under `key` in the current tree.
    pub fn get(&self, key: &FieldElement) -> Result<FieldElement, TreeError> {
        self.get_at(self.root, key)
    }

    /// Value stored under `key` in the tree committed to by `root`.
    pub fn get_at(&self, root: FieldElement, key: &FieldElement) -> Result<FieldElement, TreeError> {
        let mut hash = root;
        for level in 0..self.config.depth {
            match self.node(&hash)? {
                Node::Empty => return Err(TreeError::KeyNotFound),
                Node::Leaf { key: k, value } => {
                    return if k == *key {
                        Ok(value)
                    } else {
                        Err(TreeError::KeyNotFound)
                    };
                }
                Node::Middle { left, right } => {
                    hash = if self.config.path_bit(key, level) {
                        right
                    } else {
                        left
                    };
                }
            }
        }
        Err(TreeError::KeyNotFound)
    }

    /// Existence or non-existence proof for `key` against `root`.
    pub fn generate_proof(&self, key: &FieldElement, root: FieldElement) -> Result<Proof, TreeError> {
        let mut siblings = Vec::new();
        let mut hash = root;
        for level in 0..self.config.depth {
            match self.node(&hash)? {
                Node::Empty => return Ok(Proof::new(false, siblings, None)),
                Node::Leaf { key: k, value } => {
                    let proof = if k == *key {
                        Proof::new(true, siblings, None)
                    } else {
                        Proof::new(false, siblings, Some(NodeAux { key: k, value }))
                    };
                    tracing::trace!(existence = proof.existence, depth = level, "generated proof");
                    return Ok(proof);
                }
                Node::Middle { left, right } => {
                    if self.config.path_bit(key, level) {
                        siblings.push(left);
                        hash = right;
                    } else {
                        siblings.push(right);
                        hash = left;
                    }
                }
            }
        }
        Err(TreeError::MaxDepthReached(self.config.depth))
    }

    /// Proof for `key` against the current root.
    pub fn prove(&self, key: &FieldElement) -> Result<Proof, TreeError> {
        self.generate_proof(key, self.root)
    }

    /// Check `proof` for `key → value` against `root`.
    ///
    /// For non-existence proofs `value` is ignored.
    pub fn verify_proof(
        &self,
        root: &FieldElement,
        key: &FieldElement,
        value: &FieldElement,
        proof: &Proof,
    ) -> bool {
        proof.verify(&self.hasher, &self.config, root, key, value)
    }

    /// All `(key, value)` leaves of the current tree, left to right.
    pub fn leaves(&self) -> Result<Vec<(FieldElement, FieldElement)>, TreeError> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(hash) = stack.pop() {
            match self.node(&hash)? {
                Node::Empty => {}
                Node::Leaf { key, value } => out.push((key, value)),
                Node::Middle { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        Ok(out)
    }

    fn node(&self, hash: &FieldElement) -> Result<Node, TreeError> {
        if hash.is_zero() {
            return Ok(Node::Empty);
        }
        self.store
            .get(hash)
            .ok_or_else(|| TreeError::NodeNotFound(hash.to_string()))
    }

    fn store_node(&self, node: Node) -> Result<FieldElement, TreeError> {
        let hash = node.hash(&self.hasher)?;
        self.store.put(hash, node);
        Ok(hash)
    }
}
