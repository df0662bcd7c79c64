//! # Node Storage
//!
//! Nodes are content-addressed: the key is the node hash, so writing the
//! same node twice is a no-op and concurrent writers never disagree about
//! a key's content.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use idstate_core::FieldElement;

use crate::node::Node;

/// Content-addressed node storage.
pub trait NodeStore: Send + Sync {
    /// Fetch the node stored under `hash`.
    fn get(&self, hash: &FieldElement) -> Option<Node>;

    /// Store `node` under `hash`. Idempotent.
    fn put(&self, hash: FieldElement, node: Node);

    /// Number of stored nodes.
    fn len(&self) -> usize;

    /// Whether no nodes are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe, cloneable in-memory node store.
///
/// Clones share the same map, so several trees (or several identities)
/// can write into one store from different threads.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: Arc<RwLock<HashMap<FieldElement, Node>>>,
}

impl Clone for MemoryNodeStore {
    fn clone(&self) -> Self {
        Self {
            nodes: Arc::clone(&self.nodes),
        }
    }
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `hash` is stored.
    pub fn contains(&self, hash: &FieldElement) -> bool {
        self.nodes.read().contains_key(hash)
    }
}

impl NodeStore for MemoryNodeStore {
    fn get(&self, hash: &FieldElement) -> Option<Node> {
        self.nodes.read().get(hash).copied()
    }

    fn put(&self, hash: FieldElement, node: Node) {
        self.nodes.write().entry(hash).or_insert(node);
    }

    fn len(&self) -> usize {
        self.nodes.read().len()
    }
}

impl<S: NodeStore + ?Sized> NodeStore for Arc<S> {
    fn get(&self, hash: &FieldElement) -> Option<Node> {
        (**self).get(hash)
    }

    fn put(&self, hash: FieldElement, node: Node) {
        (**self).put(hash, node)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(k: u64) -> Node {
        Node::Leaf {
            key: FieldElement::from_u64(k),
            value: FieldElement::zero(),
        }
    }

    #[test]
    fn test_put_is_idempotent() {
        let store = MemoryNodeStore::new();
        let h = FieldElement::from_u64(7);
        store.put(h, leaf(1));
        store.put(h, leaf(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&h), Some(leaf(1)));
    }

    #[test]
    fn test_clones_share_storage() {
        let a = MemoryNodeStore::new();
        let b = a.clone();
        b.put(FieldElement::one(), leaf(3));
        assert!(a.contains(&FieldElement::one()));
        assert!(!a.is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let store = MemoryNodeStore::new();
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let s = store.clone();
                std::thread::spawn(move || {
                    for i in 0..50u64 {
                        s.put(FieldElement::from_u64(i), leaf(t));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 50);
    }
}
