//! # Identity
//!
//! An identity owns a Baby Jubjub key, three sparse Merkle trees and the
//! identifier derived at genesis. [`IdentityBuilder`] performs the genesis
//! sequence in one place:
//!
//! 1. derive the public key and its authentication claim;
//! 2. insert the auth claim into an empty claims tree;
//! 3. derive the identifier from that claims root;
//! 4. insert any further claims.
//!
//! ## Security Invariant
//!
//! - The identifier is computed once in [`IdentityBuilder::build`] and is
//!   never recomputed, whatever the trees hold later.
//! - The private key is never logged; `Debug` omits it.

use std::fmt;
use std::sync::Arc;

use idstate_claim::{auth_claim, Claim};
use idstate_core::{CryptoError, FieldElement, IdStateError, Identifier, TreeError};
use idstate_crypto::{Poseidon, PrivateKey, PublicKey, Signature};
use idstate_smt::{MemoryNodeStore, NodeStore, Proof, SparseMerkleTree};

use crate::genesis::{GenesisScheme, SumChecksumV0};
use crate::profile::ProtocolProfile;
use crate::state::IdentityState;
use crate::transition::{sign_transition, StateTransition};

type SharedTree = SparseMerkleTree<Poseidon, Arc<dyn NodeStore>>;

/// Builder for [`Identity`].
pub struct IdentityBuilder {
    private_key: PrivateKey,
    profile: ProtocolProfile,
    store: Option<Arc<dyn NodeStore>>,
    revocation_nonce: u64,
    claims: Vec<Claim>,
    scheme: Box<dyn GenesisScheme>,
}

impl IdentityBuilder {
    /// Start an identity for `private_key` with the default profile.
    pub fn new(private_key: PrivateKey) -> Self {
        Self {
            private_key,
            profile: ProtocolProfile::default(),
            store: None,
            revocation_nonce: 0,
            claims: Vec::new(),
            scheme: Box::new(SumChecksumV0),
        }
    }

    /// Tree depths, bit order and identifier type.
    pub fn profile(mut self, profile: ProtocolProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Node store shared with other identities.
    pub fn store<S: NodeStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Revocation nonce of the authentication claim.
    pub fn revocation_nonce(mut self, nonce: u64) -> Self {
        self.revocation_nonce = nonce;
        self
    }

    /// A claim to insert after genesis.
    pub fn claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Claims to insert after genesis.
    pub fn claims(mut self, claims: impl IntoIterator<Item = Claim>) -> Self {
        self.claims.extend(claims);
        self
    }

    /// Genesis derivation scheme.
    pub fn genesis_scheme(mut self, scheme: impl GenesisScheme + 'static) -> Self {
        self.scheme = Box::new(scheme);
        self
    }

    /// Run the genesis sequence.
    pub fn build(self) -> Result<Identity, IdStateError> {
        let store: Arc<dyn NodeStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryNodeStore::new()),
        };
        let mut claims =
            SparseMerkleTree::with_parts(Poseidon, store.clone(), self.profile.claims_config()?)?;
        let revocations =
            SparseMerkleTree::with_parts(Poseidon, store.clone(), self.profile.revocation_config()?)?;
        let roots = SparseMerkleTree::with_parts(Poseidon, store, self.profile.roots_config()?)?;

        let public_key = self.private_key.public_key();
        let auth = auth_claim(&public_key, self.revocation_nonce);
        let (hi, hv) = auth.hi_hv(&Poseidon)?;
        let genesis_claims_root = claims.add(hi, hv)?;
        let id = self
            .scheme
            .genesis_id(&Poseidon, self.profile.id_type_bytes(), &genesis_claims_root)?;
        tracing::debug!(
            id = %id,
            scheme = self.scheme.version(),
            claims_root = %genesis_claims_root,
            "created identity"
        );

        let mut identity = Identity {
            private_key: self.private_key,
            public_key,
            profile: self.profile,
            auth_claim: auth,
            id,
            genesis_claims_root,
            claims,
            revocations,
            roots,
            scheme: self.scheme,
        };
        for claim in &self.claims {
            identity.add_claim(claim)?;
        }
        Ok(identity)
    }
}

/// An identity with its key, trees and identifier.
pub struct Identity {
    private_key: PrivateKey,
    public_key: PublicKey,
    profile: ProtocolProfile,
    auth_claim: Claim,
    id: Identifier,
    genesis_claims_root: FieldElement,
    claims: SharedTree,
    revocations: SharedTree,
    roots: SharedTree,
    scheme: Box<dyn GenesisScheme>,
}

impl Identity {
    /// Start building an identity.
    pub fn builder(private_key: PrivateKey) -> IdentityBuilder {
        IdentityBuilder::new(private_key)
    }

    /// The identifier fixed at genesis.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// The public key committed in the auth claim.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The authentication claim.
    pub fn auth_claim(&self) -> &Claim {
        &self.auth_claim
    }

    /// Profile the trees were built with.
    pub fn profile(&self) -> &ProtocolProfile {
        &self.profile
    }

    /// Scheme the identifier was derived with.
    pub fn genesis_scheme(&self) -> &dyn GenesisScheme {
        self.scheme.as_ref()
    }

    /// Claims root holding only the auth claim.
    pub fn genesis_claims_root(&self) -> FieldElement {
        self.genesis_claims_root
    }

    /// Current roots.
    pub fn snapshot(&self) -> IdentityState {
        IdentityState {
            claims_root: self.claims.root(),
            revocation_root: self.revocations.root(),
            roots_root: self.roots.root(),
        }
    }

    /// Current state hash.
    pub fn state(&self) -> Result<FieldElement, CryptoError> {
        self.snapshot().state(&Poseidon)
    }

    /// Whether the identity is still in its genesis state.
    pub fn is_genesis(&self) -> Result<bool, CryptoError> {
        let genesis = IdentityState::genesis(self.genesis_claims_root).state(&Poseidon)?;
        Ok(self.state()? == genesis
            && self
                .scheme
                .is_genesis(&Poseidon, &self.id, &self.genesis_claims_root))
    }

    /// Insert a claim; returns the new claims root.
    pub fn add_claim(&mut self, claim: &Claim) -> Result<FieldElement, IdStateError> {
        let (hi, hv) = claim.hi_hv(&Poseidon)?;
        let root = self.claims.add(hi, hv)?;
        tracing::debug!(id = %self.id, claims_root = %root, "added claim");
        Ok(root)
    }

    /// Revoke the claim with `nonce`; returns the new revocation root.
    pub fn revoke(&mut self, nonce: u64) -> Result<FieldElement, TreeError> {
        let root = self
            .revocations
            .add(FieldElement::from_u64(nonce), FieldElement::zero())?;
        tracing::debug!(id = %self.id, nonce, "revoked claim");
        Ok(root)
    }

    /// Record the current claims root in the roots tree.
    pub fn publish_claims_root(&mut self) -> Result<FieldElement, TreeError> {
        self.roots.add(self.claims.root(), FieldElement::zero())
    }

    /// Proof of `claim` under `claims_root` (any historical root).
    pub fn claim_proof(&self, claim: &Claim, claims_root: FieldElement) -> Result<Proof, IdStateError> {
        let (hi, _) = claim.hi_hv(&Poseidon)?;
        Ok(self.claims.generate_proof(&hi, claims_root)?)
    }

    /// Proof that `nonce` is (not) revoked under `revocation_root`.
    pub fn non_revocation_proof(
        &self,
        nonce: u64,
        revocation_root: FieldElement,
    ) -> Result<Proof, TreeError> {
        self.revocations
            .generate_proof(&FieldElement::from_u64(nonce), revocation_root)
    }

    /// Proof that `claims_root` is (not) in the roots tree under `roots_root`.
    pub fn roots_proof(
        &self,
        claims_root: &FieldElement,
        roots_root: FieldElement,
    ) -> Result<Proof, TreeError> {
        self.roots.generate_proof(claims_root, roots_root)
    }

    /// Sign an arbitrary field element.
    pub fn sign(&self, message: &FieldElement) -> Result<Signature, CryptoError> {
        self.private_key.sign(message)
    }

    /// Sign an authentication challenge.
    pub fn sign_challenge(&self, challenge: &FieldElement) -> Result<Signature, CryptoError> {
        self.sign(challenge)
    }

    /// Sign the move from `old` to the current state, with the auth claim
    /// proofs taken against `old`.
    pub fn transition_from(&self, old: &IdentityState) -> Result<StateTransition, IdStateError> {
        let old_state = old.state(&Poseidon)?;
        let new_state = self.state()?;
        let genesis_state = IdentityState::genesis(self.genesis_claims_root).state(&Poseidon)?;
        let auth_claim_mtp = self.claim_proof(&self.auth_claim, old.claims_root)?;
        let auth_claim_non_rev_mtp =
            self.non_revocation_proof(self.auth_claim.revocation_nonce, old.revocation_root)?;
        let signature = sign_transition(&old_state, &new_state, &self.private_key)?;
        tracing::debug!(
            id = %self.id,
            old_state = %old_state,
            new_state = %new_state,
            "signed state transition"
        );
        Ok(StateTransition {
            id: self.id,
            old_roots: *old,
            old_state,
            new_state,
            is_old_state_genesis: old_state == genesis_state,
            auth_claim: self.auth_claim.clone(),
            auth_claim_mtp,
            auth_claim_non_rev_mtp,
            signature,
        })
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("public_key", &self.public_key)
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}
