//! # Poseidon (circom parameters)
//!
//! Poseidon over the BN254 scalar field using the round constants and MDS
//! matrices published with circomlib, so hashes match the circuits that
//! consume claim, tree and state commitments. Supported arity is 1..=12.
//!
//! ## Implements
//!
//! The `FieldHash` collaborator used by the claim codec, the sparse Merkle
//! tree, identity state derivation and EdDSA message hashing.

use ark_bn254::Fr;
use light_poseidon::{Poseidon as CircomPoseidon, PoseidonHasher};

use idstate_core::{CryptoError, FieldElement};

use crate::hash::FieldHasher;

/// Largest number of inputs accepted by a single Poseidon call.
pub const MAX_ARITY: usize = 12;

/// The circom-parameterised Poseidon hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Poseidon;

impl FieldHasher for Poseidon {
    fn name(&self) -> &'static str {
        "poseidon-bn254-circom"
    }

    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
        poseidon_hash(inputs)
    }
}

/// Poseidon of `inputs` with circom parameters.
pub fn poseidon_hash(inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
    if inputs.is_empty() || inputs.len() > MAX_ARITY {
        return Err(CryptoError::HashArity(inputs.len()));
    }
    let mut hasher = CircomPoseidon::<Fr>::new_circom(inputs.len())
        .map_err(|e| CryptoError::Hash(e.to_string()))?;
    let frs: Vec<Fr> = inputs.iter().map(FieldElement::as_fr).collect();
    let out = hasher
        .hash(&frs)
        .map_err(|e| CryptoError::Hash(e.to_string()))?;
    Ok(FieldElement::from(out))
}
