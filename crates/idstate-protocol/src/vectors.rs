//! # Circuit Input Vectors
//!
//! Witness inputs for the state-transition and authentication circuits,
//! serialized with the field names those circuits declare.
//!
//! ## Encoding
//!
//! - Every number is a decimal string field element.
//! - Booleans are the field elements `0` and `1`.
//! - Sibling arrays run from the root downwards and are zero-padded to the
//!   tree depth of the profile in use; trailing zeros are part of the array.
//! - Claims are their eight slots in order.
//! - Signatures are split into `R8x`, `R8y` and `S`.

use serde::{Deserialize, Serialize};

use idstate_claim::ClaimSlots;
use idstate_core::{FieldElement, IdStateError};
use idstate_crypto::{Poseidon, Signature};

use crate::identity::Identity;
use crate::profile::ProtocolProfile;
use crate::transition::StateTransition;

/// Inputs for the state-transition circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransitionInputs {
    /// Identifier as a field element.
    #[serde(rename = "userID")]
    pub user_id: FieldElement,
    /// State being moved from.
    #[serde(rename = "oldUserState")]
    pub old_user_state: FieldElement,
    /// State being moved to.
    #[serde(rename = "newUserState")]
    pub new_user_state: FieldElement,
    /// `1` when the old state is the genesis state.
    #[serde(rename = "isOldStateGenesis")]
    pub is_old_state_genesis: FieldElement,
    /// Claims root of the old state.
    #[serde(rename = "claimsTreeRoot")]
    pub claims_tree_root: FieldElement,
    /// Siblings proving the auth claim under the old claims root.
    #[serde(rename = "authClaimMtp")]
    pub auth_claim_mtp: Vec<FieldElement>,
    /// The auth claim slots.
    #[serde(rename = "authClaim")]
    pub auth_claim: ClaimSlots,
    /// Revocation root of the old state.
    #[serde(rename = "revTreeRoot")]
    pub rev_tree_root: FieldElement,
    /// Siblings proving the auth nonce absent from the old revocation root.
    #[serde(rename = "authClaimNonRevMtp")]
    pub auth_claim_non_rev_mtp: Vec<FieldElement>,
    /// `1` when the non-revocation proof ends in an empty leaf.
    #[serde(rename = "authClaimNonRevMtpNoAux")]
    pub auth_claim_non_rev_mtp_no_aux: FieldElement,
    /// Key of the leaf met by the non-revocation proof, or `0`.
    #[serde(rename = "authClaimNonRevMtpAuxHi")]
    pub auth_claim_non_rev_mtp_aux_hi: FieldElement,
    /// Value of the leaf met by the non-revocation proof, or `0`.
    #[serde(rename = "authClaimNonRevMtpAuxHv")]
    pub auth_claim_non_rev_mtp_aux_hv: FieldElement,
    /// Roots-tree root of the old state.
    #[serde(rename = "rootsTreeRoot")]
    pub roots_tree_root: FieldElement,
    /// `R8.x` of the transition signature.
    #[serde(rename = "signatureR8x")]
    pub signature_r8x: FieldElement,
    /// `R8.y` of the transition signature.
    #[serde(rename = "signatureR8y")]
    pub signature_r8y: FieldElement,
    /// `S` of the transition signature.
    #[serde(rename = "signatureS")]
    pub signature_s: FieldElement,
}

impl StateTransitionInputs {
    /// Lay out `transition` for a circuit built with `profile`'s depths.
    pub fn from_transition(
        transition: &StateTransition,
        profile: &ProtocolProfile,
    ) -> Result<Self, IdStateError> {
        let non_rev = &transition.auth_claim_non_rev_mtp;
        let (aux_hi, aux_hv, no_aux) = non_rev.aux_inputs();
        let (r8x, r8y, s) = signature_parts(&transition.signature);
        Ok(Self {
            user_id: transition.id.to_field(),
            old_user_state: transition.old_state,
            new_user_state: transition.new_state,
            is_old_state_genesis: flag(transition.is_old_state_genesis),
            claims_tree_root: transition.old_roots.claims_root,
            auth_claim_mtp: transition
                .auth_claim_mtp
                .circuit_siblings(profile.claims_depth)?,
            auth_claim: transition.auth_claim.encode()?,
            rev_tree_root: transition.old_roots.revocation_root,
            auth_claim_non_rev_mtp: non_rev.circuit_siblings(profile.revocation_depth)?,
            auth_claim_non_rev_mtp_no_aux: no_aux,
            auth_claim_non_rev_mtp_aux_hi: aux_hi,
            auth_claim_non_rev_mtp_aux_hv: aux_hv,
            roots_tree_root: transition.old_roots.roots_root,
            signature_r8x: r8x,
            signature_r8y: r8y,
            signature_s: s,
        })
    }
}

/// Inputs for the authentication circuit: proof of control of an identity
/// by signing a challenge with a non-revoked auth key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInputs {
    /// Identifier as a field element.
    pub id: FieldElement,
    /// Public key `x`.
    #[serde(rename = "BBJAx")]
    pub bbj_ax: FieldElement,
    /// Public key `y`.
    #[serde(rename = "BBJAy")]
    pub bbj_ay: FieldElement,
    /// Claims root the auth claim is proved under.
    #[serde(rename = "BBJClaimClaimsTreeRoot")]
    pub bbj_claim_claims_tree_root: FieldElement,
    /// The signed challenge.
    pub challenge: FieldElement,
    /// `R8.x` of the challenge signature.
    #[serde(rename = "challengeSignatureR8x")]
    pub challenge_signature_r8x: FieldElement,
    /// `R8.y` of the challenge signature.
    #[serde(rename = "challengeSignatureR8y")]
    pub challenge_signature_r8y: FieldElement,
    /// `S` of the challenge signature.
    #[serde(rename = "challengeSignatureS")]
    pub challenge_signature_s: FieldElement,
    /// Current state hash.
    pub state: FieldElement,
    /// Current claims root.
    #[serde(rename = "claimsTreeRoot")]
    pub claims_tree_root: FieldElement,
    /// Current revocation root.
    #[serde(rename = "revTreeRoot")]
    pub rev_tree_root: FieldElement,
    /// Current roots-tree root.
    #[serde(rename = "rootsTreeRoot")]
    pub roots_tree_root: FieldElement,
    /// The auth claim slots.
    #[serde(rename = "authClaim")]
    pub auth_claim: ClaimSlots,
    /// Siblings proving the auth claim under the claims root.
    #[serde(rename = "authClaimMtp")]
    pub auth_claim_mtp: Vec<FieldElement>,
    /// Siblings proving the auth nonce absent from the revocation root.
    #[serde(rename = "authClaimNonRevMtp")]
    pub auth_claim_non_rev_mtp: Vec<FieldElement>,
    /// Key of the leaf met by the non-revocation proof, or `0`.
    #[serde(rename = "authClaimNonRevMtpAuxHi")]
    pub auth_claim_non_rev_mtp_aux_hi: FieldElement,
    /// Value of the leaf met by the non-revocation proof, or `0`.
    #[serde(rename = "authClaimNonRevMtpAuxHv")]
    pub auth_claim_non_rev_mtp_aux_hv: FieldElement,
    /// `1` when the non-revocation proof ends in an empty leaf.
    #[serde(rename = "authClaimNonRevMtpNoAux")]
    pub auth_claim_non_rev_mtp_no_aux: FieldElement,
}

impl AuthInputs {
    /// Sign `challenge` with `identity`'s key and prove its auth claim
    /// against the identity's current roots.
    pub fn from_identity(
        identity: &Identity,
        challenge: FieldElement,
    ) -> Result<Self, IdStateError> {
        let roots = identity.snapshot();
        let profile = identity.profile();
        let auth_claim = identity.auth_claim();
        let signature = identity.sign_challenge(&challenge)?;
        let mtp = identity.claim_proof(auth_claim, roots.claims_root)?;
        let non_rev =
            identity.non_revocation_proof(auth_claim.revocation_nonce, roots.revocation_root)?;
        let (aux_hi, aux_hv, no_aux) = non_rev.aux_inputs();
        let (r8x, r8y, s) = signature_parts(&signature);
        Ok(Self {
            id: identity.id().to_field(),
            bbj_ax: identity.public_key().x(),
            bbj_ay: identity.public_key().y(),
            bbj_claim_claims_tree_root: roots.claims_root,
            challenge,
            challenge_signature_r8x: r8x,
            challenge_signature_r8y: r8y,
            challenge_signature_s: s,
            state: roots.state(&Poseidon)?,
            claims_tree_root: roots.claims_root,
            rev_tree_root: roots.revocation_root,
            roots_tree_root: roots.roots_root,
            auth_claim: auth_claim.encode()?,
            auth_claim_mtp: mtp.circuit_siblings(profile.claims_depth)?,
            auth_claim_non_rev_mtp: non_rev.circuit_siblings(profile.revocation_depth)?,
            auth_claim_non_rev_mtp_aux_hi: aux_hi,
            auth_claim_non_rev_mtp_aux_hv: aux_hv,
            auth_claim_non_rev_mtp_no_aux: no_aux,
        })
    }
}

fn signature_parts(sig: &Signature) -> (FieldElement, FieldElement, FieldElement) {
    (sig.r8.x(), sig.r8.y(), sig.s)
}

fn flag(b: bool) -> FieldElement {
    if b {
        FieldElement::one()
    } else {
        FieldElement::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idstate_crypto::PrivateKey;

    fn identity() -> Identity {
        Identity::builder(
            PrivateKey::from_hex("28156abe7fe2fd433dc9df969286b96666489bac508612d0e16593e944c4f69f")
                .unwrap(),
        )
        .profile(ProtocolProfile::testing())
        .build()
        .unwrap()
    }

    #[test]
    fn test_state_transition_field_names() {
        let mut id = identity();
        let old = id.snapshot();
        id.revoke(9).unwrap();
        let t = id.transition_from(&old).unwrap();
        let inputs = StateTransitionInputs::from_transition(&t, id.profile()).unwrap();
        let json = serde_json::to_value(&inputs).unwrap();
        for key in [
            "userID",
            "oldUserState",
            "newUserState",
            "isOldStateGenesis",
            "claimsTreeRoot",
            "authClaimMtp",
            "authClaim",
            "revTreeRoot",
            "authClaimNonRevMtp",
            "authClaimNonRevMtpNoAux",
            "authClaimNonRevMtpAuxHi",
            "authClaimNonRevMtpAuxHv",
            "rootsTreeRoot",
            "signatureR8x",
            "signatureR8y",
            "signatureS",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json.as_object().unwrap().len(), 16);
        assert_eq!(json["isOldStateGenesis"], "1");
        assert_eq!(json["authClaimMtp"].as_array().unwrap().len(), 4);
        assert_eq!(json["authClaim"].as_array().unwrap().len(), 8);
        assert_eq!(json["revTreeRoot"], "0");
    }

    #[test]
    fn test_empty_revocation_tree_has_no_aux() {
        let id = identity();
        let t = id.transition_from(&id.snapshot()).unwrap();
        let inputs = StateTransitionInputs::from_transition(&t, id.profile()).unwrap();
        assert_eq!(inputs.auth_claim_non_rev_mtp_no_aux, FieldElement::one());
        assert!(inputs.auth_claim_non_rev_mtp.iter().all(FieldElement::is_zero));
    }

    #[test]
    fn test_auth_inputs_field_names() {
        let id = identity();
        let inputs = AuthInputs::from_identity(&id, FieldElement::from_u64(1)).unwrap();
        let json = serde_json::to_value(&inputs).unwrap();
        for key in [
            "id",
            "BBJAx",
            "BBJAy",
            "BBJClaimClaimsTreeRoot",
            "challenge",
            "challengeSignatureR8x",
            "challengeSignatureR8y",
            "challengeSignatureS",
            "state",
            "claimsTreeRoot",
            "revTreeRoot",
            "rootsTreeRoot",
            "authClaim",
            "authClaimMtp",
            "authClaimNonRevMtp",
            "authClaimNonRevMtpAuxHi",
            "authClaimNonRevMtpAuxHv",
            "authClaimNonRevMtpNoAux",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["challenge"], "1");
        assert_eq!(inputs.bbj_ax, id.public_key().x());
    }

    #[test]
    fn test_auth_inputs_signature_verifies() {
        let id = identity();
        let challenge = FieldElement::from_u64(42);
        let inputs = AuthInputs::from_identity(&id, challenge).unwrap();
        let sig = id.sign_challenge(&challenge).unwrap();
        assert_eq!(inputs.challenge_signature_s, sig.s);
        assert_eq!(inputs.state, id.state().unwrap());
    }
}
