//! # Authentication Claim
//!
//! The claim that binds a Baby Jubjub public key to an identity. Its index
//! data holds the key's `x` (slot 2) and `y` (slot 3) coordinates, so the
//! claims tree can hold a given key only once.

use idstate_core::{CryptoError, DecodingError};
use idstate_crypto::PublicKey;

use crate::claim::{Claim, MerklizedRoot, SubjectPosition};
use crate::schema::SchemaHash;

/// Schema hash of the Baby Jubjub authentication claim.
pub const AUTH_SCHEMA_HASH: SchemaHash = SchemaHash::from_bytes([
    0xca, 0x93, 0x88, 0x57, 0x24, 0x1d, 0xb9, 0x45, 0x1e, 0xa3, 0x29, 0x25, 0x6b, 0x9c, 0x06, 0xe5,
]);

/// Build the authentication claim for `public_key`.
pub fn auth_claim(public_key: &PublicKey, revocation_nonce: u64) -> Claim {
    Claim {
        schema: AUTH_SCHEMA_HASH,
        subject: SubjectPosition::None,
        merklized: MerklizedRoot::None,
        updatable: false,
        version: 0,
        index_data: [public_key.x(), public_key.y()],
        value_data: Default::default(),
        revocation_nonce,
        expiration: None,
    }
}

/// Read the public key committed by an authentication claim.
pub fn auth_public_key(claim: &Claim) -> Result<PublicKey, CryptoError> {
    if claim.schema != AUTH_SCHEMA_HASH {
        return Err(CryptoError::InvalidPublicKey(format!(
            "claim schema {} is not the auth schema",
            claim.schema
        )));
    }
    PublicKey::from_coordinates(claim.index_data[0], claim.index_data[1])
}

impl Claim {
    /// True when this is an authentication claim.
    pub fn is_auth_claim(&self) -> bool {
        self.schema == AUTH_SCHEMA_HASH
    }
}

/// Convenience for callers holding raw slots.
pub fn auth_public_key_from_slots(
    slots: &crate::codec::ClaimSlots,
) -> Result<PublicKey, DecodingError> {
    let claim = Claim::decode(slots)?;
    auth_public_key(&claim).map_err(|e| DecodingError::MalformedHeader(e.to_string()))
}
