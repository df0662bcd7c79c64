//! # Merkle Proofs
//!
//! A proof lists the siblings met walking from the root towards a key,
//! root first. Trailing zero siblings are dropped, so the number of
//! significant siblings is the level of the terminal node. Circuit inputs
//! re-pad them with zeros to a fixed depth.
//!
//! ## Verification
//!
//! The terminal hash is the leaf `H(key, value, 1)` for existence proofs,
//! the auxiliary leaf for non-existence proofs that ended at a different
//! key, and zero otherwise. It is folded upwards through the siblings in
//! reverse, placing the running hash left or right by the query key's path
//! bit at each level.
//!
//! ## Security Invariant
//!
//! An auxiliary leaf whose key equals the queried key is rejected: it would
//! let a prover pass an existence proof off as a non-existence proof.

use serde::{Deserialize, Serialize};

use idstate_core::{FieldElement, TreeError};
use idstate_crypto::FieldHasher;

use crate::node::leaf_hash;
use crate::tree::TreeConfig;

/// The leaf met by a non-existence proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAux {
    /// Key of the leaf occupying the query path.
    pub key: FieldElement,
    /// Value of that leaf.
    pub value: FieldElement,
}

/// An existence or non-existence proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Whether the queried key is present.
    pub existence: bool,
    /// Siblings from the root downwards, trailing zeros trimmed.
    pub siblings: Vec<FieldElement>,
    /// Auxiliary leaf for non-existence proofs ending at another key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_aux: Option<NodeAux>,
}

impl Proof {
    /// Build a proof, trimming trailing zero siblings.
    pub fn new(existence: bool, siblings: Vec<FieldElement>, node_aux: Option<NodeAux>) -> Self {
        Self {
            existence,
            siblings: trimmed(&siblings).to_vec(),
            node_aux,
        }
    }

    /// Level of the terminal node.
    pub fn depth(&self) -> usize {
        trimmed(&self.siblings).len()
    }

    /// Recompute the root this proof commits to for `key → value`.
    pub fn root<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
        config: &TreeConfig,
        key: &FieldElement,
        value: &FieldElement,
    ) -> Result<FieldElement, TreeError> {
        let siblings = trimmed(&self.siblings);
        if siblings.len() >= config.depth {
            return Err(TreeError::ProofTooDeep {
                actual: siblings.len(),
                depth: config.depth.saturating_sub(1),
            });
        }
        let mut hash = match (self.existence, &self.node_aux) {
            (true, None) => leaf_hash(hasher, key, value)?,
            (true, Some(_)) => return Err(TreeError::ProofVerificationFailed),
            (false, Some(aux)) => {
                if aux.key == *key {
                    return Err(TreeError::AuxKeyMatchesQuery);
                }
                leaf_hash(hasher, &aux.key, &aux.value)?
            }
            (false, None) => FieldElement::zero(),
        };
        for (level, sibling) in siblings.iter().enumerate().rev() {
            hash = if config.path_bit(key, level) {
                hasher.hash2(sibling, &hash)?
            } else {
                hasher.hash2(&hash, sibling)?
            };
        }
        Ok(hash)
    }

    /// Whether this proof reproduces `root` for `key → value`.
    pub fn verify<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
        config: &TreeConfig,
        root: &FieldElement,
        key: &FieldElement,
        value: &FieldElement,
    ) -> bool {
        match self.root(hasher, config, key, value) {
            Ok(computed) => computed == *root,
            Err(e) => {
                tracing::debug!(error = %e, "proof rejected");
                false
            }
        }
    }

    /// Like [`Proof::verify`], mapping a mismatch to
    /// [`TreeError::ProofVerificationFailed`].
    pub fn ensure<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
        config: &TreeConfig,
        root: &FieldElement,
        key: &FieldElement,
        value: &FieldElement,
    ) -> Result<(), TreeError> {
        if self.root(hasher, config, key, value)? == *root {
            Ok(())
        } else {
            Err(TreeError::ProofVerificationFailed)
        }
    }

    /// Siblings zero-padded to `depth` entries for circuit inputs.
    pub fn circuit_siblings(&self, depth: usize) -> Result<Vec<FieldElement>, TreeError> {
        let siblings = trimmed(&self.siblings);
        if siblings.len() > depth {
            return Err(TreeError::ProofTooDeep {
                actual: siblings.len(),
                depth,
            });
        }
        let mut out = siblings.to_vec();
        out.resize(depth, FieldElement::zero());
        Ok(out)
    }

    /// Circuit auxiliary inputs `(auxHi, auxHv, noAux)`.
    pub fn aux_inputs(&self) -> (FieldElement, FieldElement, FieldElement) {
        match &self.node_aux {
            Some(aux) => (aux.key, aux.value, FieldElement::zero()),
            None => (FieldElement::zero(), FieldElement::zero(), FieldElement::one()),
        }
    }
}

fn trimmed(siblings: &[FieldElement]) -> &[FieldElement] {
    let len = siblings
        .iter()
        .rposition(|s| !s.is_zero())
        .map_or(0, |i| i + 1);
    &siblings[..len]
}
