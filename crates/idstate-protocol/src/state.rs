//! Identity state: three roots and the hash committing to them.

use serde::{Deserialize, Serialize};

use idstate_core::{CryptoError, FieldElement};
use idstate_crypto::FieldHasher;

/// The roots of an identity's claims, revocation and roots trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityState {
    /// Claims tree root.
    pub claims_root: FieldElement,
    /// Revocation tree root.
    pub revocation_root: FieldElement,
    /// Roots tree root.
    pub roots_root: FieldElement,
}

impl IdentityState {
    /// A state with only a claims root: the shape of every genesis state.
    pub fn genesis(claims_root: FieldElement) -> Self {
        Self {
            claims_root,
            revocation_root: FieldElement::zero(),
            roots_root: FieldElement::zero(),
        }
    }

    /// `H(claimsRoot, revocationRoot, rootsRoot)`.
    pub fn state<H: FieldHasher + ?Sized>(&self, hasher: &H) -> Result<FieldElement, CryptoError> {
        state_hash(hasher, &self.claims_root, &self.revocation_root, &self.roots_root)
    }
}

/// `H(claimsRoot, revocationRoot, rootsRoot)`; argument order matters.
pub fn state_hash<H: FieldHasher + ?Sized>(
    hasher: &H,
    claims_root: &FieldElement,
    revocation_root: &FieldElement,
    roots_root: &FieldElement,
) -> Result<FieldElement, CryptoError> {
    hasher.hash(&[*claims_root, *revocation_root, *roots_root])
}
