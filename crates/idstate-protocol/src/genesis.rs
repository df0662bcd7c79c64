//! # Genesis Identifiers
//!
//! An identity's identifier is derived once, from the claims root that
//! holds only its authentication claim, and never changes afterwards.
//! Derivation is versioned behind [`GenesisScheme`] so a deployment can
//! move to a new layout without touching callers.
//!
//! ## Scheme v0 ([`SumChecksumV0`])
//!
//! 1. `genesisState = H(claimsRoot, 0, 0)`
//! 2. `genesis = last 27 bytes of genesisState, big-endian`
//! 3. `id = type (2) ‖ genesis (27) ‖ checksum (2)`, where the checksum is
//!    the big-endian `u16` byte sum of `type ‖ genesis`.

use std::fmt::Debug;

use idstate_core::{CryptoError, FieldElement, Identifier};
use idstate_crypto::{FieldHasher, Poseidon};

use crate::state::IdentityState;

/// A versioned genesis-identifier derivation.
pub trait GenesisScheme: Send + Sync + Debug {
    /// Scheme version.
    fn version(&self) -> u32;

    /// Derive the identifier for `claims_root`.
    fn genesis_id(
        &self,
        hasher: &dyn FieldHasher,
        id_type: [u8; 2],
        claims_root: &FieldElement,
    ) -> Result<Identifier, CryptoError>;

    /// Whether `id` is the identifier this scheme derives from `claims_root`.
    fn is_genesis(
        &self,
        hasher: &dyn FieldHasher,
        id: &Identifier,
        claims_root: &FieldElement,
    ) -> bool {
        match self.genesis_id(hasher, id.id_type(), claims_root) {
            Ok(derived) => derived == *id,
            Err(_) => false,
        }
    }
}

/// Version 0: truncated genesis state with a byte-sum checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SumChecksumV0;

impl GenesisScheme for SumChecksumV0 {
    fn version(&self) -> u32 {
        0
    }

    fn genesis_id(
        &self,
        hasher: &dyn FieldHasher,
        id_type: [u8; 2],
        claims_root: &FieldElement,
    ) -> Result<Identifier, CryptoError> {
        let state = IdentityState::genesis(*claims_root).state(hasher)?;
        let be = state.to_be_bytes();
        let mut genesis = [0u8; 27];
        genesis.copy_from_slice(&be[5..]);
        let id = Identifier::from_parts(id_type, &genesis);
        tracing::trace!(id = %id, version = 0, "derived genesis identifier");
        Ok(id)
    }
}

/// Identifier for `claims_root` under Poseidon, scheme v0 and type `0x0000`.
pub fn genesis_id(claims_root: &FieldElement) -> Result<Identifier, CryptoError> {
    SumChecksumV0.genesis_id(&Poseidon, [0, 0], claims_root)
}

/// Whether `id` derives from `claims_root` under Poseidon and scheme v0.
pub fn is_genesis(id: &Identifier, claims_root: &FieldElement) -> bool {
    SumChecksumV0.is_genesis(&Poseidon, id, claims_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_bytes_are_state_suffix() {
        let root = FieldElement::from_u64(12345);
        let id = genesis_id(&root).unwrap();
        let state = IdentityState::genesis(root).state(&Poseidon).unwrap();
        assert_eq!(id.id_type(), [0, 0]);
        assert_eq!(&id.genesis()[..], &state.to_be_bytes()[5..]);
        assert!(id.has_valid_checksum());
    }

    #[test]
    fn test_is_genesis_round_trip() {
        let root = FieldElement::from_u64(99);
        let id = genesis_id(&root).unwrap();
        assert!(is_genesis(&id, &root));
        assert!(!is_genesis(&id, &FieldElement::from_u64(100)));
    }

    #[test]
    fn test_id_type_respected() {
        let root = FieldElement::from_u64(1);
        let id = SumChecksumV0.genesis_id(&Poseidon, [0x12, 0x34], &root).unwrap();
        assert_eq!(id.id_type(), [0x12, 0x34]);
        assert!(SumChecksumV0.is_genesis(&Poseidon, &id, &root));
        assert_ne!(id, genesis_id(&root).unwrap());
    }

    #[test]
    fn test_version() {
        assert_eq!(SumChecksumV0.version(), 0);
    }
}
