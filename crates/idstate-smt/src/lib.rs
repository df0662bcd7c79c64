//! # idstate-smt — Sparse Merkle Tree
//!
//! A binary sparse Merkle tree keyed by field elements. The path of a key
//! is read one key bit per level; a leaf sits at the shallowest level
//! where its path diverges from every other key.
//!
//! - Node hashes: `Empty = 0`, `Leaf = H(key, value, 1)`,
//!   `Middle = H(left, right)`.
//! - Nodes are immutable and addressed by their hash in a [`NodeStore`].
//!   Inserts write new nodes along one path and share the rest, so every
//!   historical root remains provable.
//! - Proofs list siblings root-to-leaf with trailing zeros trimmed, and
//!   carry an auxiliary leaf when a non-existence proof ends at a leaf with
//!   a different key.
//!
//! ## Crate Policy
//!
//! - The hash function is a type parameter bounded by
//!   [`idstate_crypto::FieldHasher`]; Poseidon is the default.
//! - Only one writer may hold a given [`SparseMerkleTree`]; many trees may
//!   share a store.

pub mod node;
pub mod proof;
pub mod store;
pub mod tree;

pub use node::Node;
pub use proof::{NodeAux, Proof};
pub use store::{MemoryNodeStore, NodeStore};
pub use tree::{BitOrder, SparseMerkleTree, TreeConfig};
