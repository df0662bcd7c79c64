//! # State Transitions
//!
//! An identity moves from `oldState` to `newState` by signing
//! `H(oldState, newState)` with the key committed in its authentication
//! claim. A verifier checks, against the roots of the *old* state:
//!
//! 1. the roots hash to `oldState`;
//! 2. if the old state is flagged as genesis, it derives the identifier
//!    under the caller's [`GenesisScheme`];
//! 3. the signature verifies under the given public key;
//! 4. the public key is the one in the authentication claim;
//! 5. the authentication claim is included in the old claims tree;
//! 6. its revocation nonce is absent from the old revocation tree.
//!
//! ## Security Invariant
//!
//! Checks run against the old roots only. A transition signed after the
//! auth claim was revoked in the old state is rejected, even if the new
//! state re-adds a key.

use serde::{Deserialize, Serialize};

use idstate_claim::{auth_public_key, Claim};
use idstate_core::{CryptoError, FieldElement, Identifier, ProtocolError, TreeError};
use idstate_crypto::{verify, FieldHasher, Poseidon, PrivateKey, PublicKey, Signature};
use idstate_smt::Proof;

use crate::genesis::GenesisScheme;
use crate::profile::ProtocolProfile;
use crate::state::IdentityState;

/// A signed transition between two identity states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    /// Identifier of the transitioning identity.
    pub id: Identifier,
    /// Roots of the old state.
    pub old_roots: IdentityState,
    /// `H(old roots)`.
    pub old_state: FieldElement,
    /// The state being moved to.
    pub new_state: FieldElement,
    /// Whether the old state is the genesis state.
    pub is_old_state_genesis: bool,
    /// The authentication claim signing the transition.
    pub auth_claim: Claim,
    /// Inclusion proof of the auth claim under `old_roots.claims_root`.
    pub auth_claim_mtp: Proof,
    /// Non-inclusion proof of the auth claim's nonce under
    /// `old_roots.revocation_root`.
    pub auth_claim_non_rev_mtp: Proof,
    /// Signature over `H(old_state, new_state)`.
    pub signature: Signature,
}

/// `H(oldState, newState)`, the signed transition message.
pub fn transition_message(
    old_state: &FieldElement,
    new_state: &FieldElement,
) -> Result<FieldElement, CryptoError> {
    Poseidon.hash2(old_state, new_state)
}

/// Sign the move from `old_state` to `new_state`.
pub fn sign_transition(
    old_state: &FieldElement,
    new_state: &FieldElement,
    key: &PrivateKey,
) -> Result<Signature, CryptoError> {
    key.sign(&transition_message(old_state, new_state)?)
}

/// Verify a transition under `public_key`, the tree shapes of `profile`
/// and the identifier derivation of `scheme`.
pub fn verify_transition(
    transition: &StateTransition,
    public_key: &PublicKey,
    profile: &ProtocolProfile,
    scheme: &dyn GenesisScheme,
) -> Result<(), ProtocolError> {
    check_transition(transition, public_key, profile, scheme).map_err(|e| {
        tracing::warn!(id = %transition.id, error = %e, "rejected state transition");
        e
    })
}

fn check_transition(
    t: &StateTransition,
    public_key: &PublicKey,
    profile: &ProtocolProfile,
    scheme: &dyn GenesisScheme,
) -> Result<(), ProtocolError> {
    if t.old_roots.state(&Poseidon)? != t.old_state {
        return Err(ProtocolError::StateMismatch);
    }
    if t.is_old_state_genesis {
        let genesis_roots = IdentityState::genesis(t.old_roots.claims_root);
        if genesis_roots != t.old_roots
            || !scheme.is_genesis(&Poseidon, &t.id, &t.old_roots.claims_root)
        {
            return Err(ProtocolError::GenesisMismatch);
        }
    }

    let message = transition_message(&t.old_state, &t.new_state)?;
    match verify(public_key, &message, &t.signature) {
        Ok(()) => {}
        Err(CryptoError::InvalidSignature) => return Err(ProtocolError::InvalidSignature),
        Err(e) => return Err(e.into()),
    }

    match auth_public_key(&t.auth_claim) {
        Ok(committed) if committed == *public_key => {}
        _ => return Err(ProtocolError::AuthClaimKeyMismatch),
    }

    let (hi, hv) = t.auth_claim.encode()?.hi_hv(&Poseidon)?;
    let claims_config = profile.claims_config()?;
    if !t.auth_claim_mtp.existence
        || !t
            .auth_claim_mtp
            .verify(&Poseidon, &claims_config, &t.old_roots.claims_root, &hi, &hv)
    {
        return Err(ProtocolError::AuthClaimNotIncluded);
    }

    if t.auth_claim_non_rev_mtp.existence {
        return Err(ProtocolError::AuthClaimRevoked);
    }
    let nonce = FieldElement::from_u64(t.auth_claim.revocation_nonce);
    t.auth_claim_non_rev_mtp
        .ensure(
            &Poseidon,
            &profile.revocation_config()?,
            &t.old_roots.revocation_root,
            &nonce,
            &FieldElement::zero(),
        )
        .map_err(|e| match e {
            TreeError::AuxKeyMatchesQuery => ProtocolError::AuthClaimRevoked,
            other => ProtocolError::Tree(other),
        })?;

    tracing::debug!(id = %t.id, new_state = %t.new_state, "state transition verified");
    Ok(())
}
