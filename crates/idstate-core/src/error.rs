//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the identity-state stack. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - One enum per component: field parsing, claim encoding, claim decoding,
//!   the sparse Merkle tree, cryptographic primitives and the state
//!   transition protocol.
//! - Protocol rejections are distinct variants so callers can tell a
//!   revoked authentication claim from a forged signature.
//! - Library code never panics on malformed input; every failure path ends
//!   in one of these variants.

use thiserror::Error;

/// Top-level error type for the identity-state stack.
#[derive(Error, Debug)]
pub enum IdStateError {
    /// Field element parsing or range check failed.
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// Hex input could not be decoded.
    #[error("hex error: {0}")]
    Hex(#[from] HexError),

    /// Claim could not be encoded into slots.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Slots could not be decoded into a claim.
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),

    /// Sparse Merkle tree operation failed.
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Hashing or signature primitive failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// State transition was rejected.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Error converting to or from a BN254 scalar field element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The integer is not smaller than the field modulus.
    #[error("value {0} is not less than the BN254 scalar field modulus")]
    OutOfRange(String),

    /// The byte input is longer than 32 bytes.
    #[error("field element encoding is {0} bytes, expected at most 32")]
    TooLong(usize),

    /// The text input is not a decimal integer.
    #[error("invalid decimal field element {0:?}")]
    Parse(String),
}

/// Error decoding a fixed-width hex string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// Input contains non-hex characters or has odd length.
    #[error("invalid hex: {0}")]
    Invalid(String),

    /// Input decodes to the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength {
        /// Required byte count.
        expected: usize,
        /// Decoded byte count.
        actual: usize,
    },
}

/// Error encoding a claim into its eight slots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A data value does not fit in a field element.
    #[error("slot {slot} overflows the field: {source}")]
    SlotOverflow {
        /// Slot index (0..8).
        slot: usize,
        /// Underlying range error.
        source: FieldError,
    },

    /// A raw byte payload exceeds the 32-byte slot width.
    #[error("data payload is {0} bytes, a slot holds at most 32")]
    DataTooLong(usize),

    /// An expiration instant precedes the unix epoch.
    #[error("expiration timestamp {0} precedes the unix epoch")]
    InvalidExpiration(i64),

    /// Two claim fields compete for the same slot.
    #[error("slot {slot} is claimed by both {first} and {second}")]
    ConflictingPosition {
        /// Slot index (0..8).
        slot: usize,
        /// Field already occupying the slot.
        first: &'static str,
        /// Field attempting to occupy the slot.
        second: &'static str,
    },
}

/// Error decoding eight slots into a claim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodingError {
    /// Subject flag bits hold an unassigned code.
    #[error("unknown subject position code {0:#05b}")]
    InvalidSubjectFlag(u8),

    /// Merklized-root flag bits hold an unassigned code.
    #[error("unknown merklized root position code {0:#05b}")]
    InvalidMerklizeFlag(u8),

    /// The header names a subject slot that is empty.
    #[error("subject position {0} is flagged but slot is zero")]
    MissingSubject(&'static str),

    /// A slot reserved by the header holds data.
    #[error("slot {0} must be zero for this header")]
    UnexpectedSlotData(usize),

    /// Reserved bytes in the header or identifier slots are non-zero.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// An expiration date is present while the expirable flag is clear.
    #[error("expiration date present without the expirable flag")]
    ExpirationWithoutFlag,
}

/// Error in sparse Merkle tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The key is already present in the tree.
    #[error("key already exists in the tree")]
    KeyAlreadyExists,

    /// The key is not present in the tree.
    #[error("key not found in the tree")]
    KeyNotFound,

    /// Placing the leaf would exceed the configured depth.
    #[error("reached maximum tree depth {0}")]
    MaxDepthReached(usize),

    /// A referenced node hash is missing from the node store.
    #[error("node {0} not found in store")]
    NodeNotFound(String),

    /// A proof does not reproduce the expected root.
    #[error("merkle proof verification failed")]
    ProofVerificationFailed,

    /// The configured depth is outside 1..=254.
    #[error("invalid tree depth {0}, expected 1..=254")]
    InvalidDepth(usize),

    /// A non-existence proof names the queried key as its auxiliary leaf.
    #[error("auxiliary node key equals the queried key")]
    AuxKeyMatchesQuery,

    /// A proof is deeper than the requested circuit depth.
    #[error("proof has {actual} siblings, circuit depth is {depth}")]
    ProofTooDeep {
        /// Number of significant siblings.
        actual: usize,
        /// Target depth.
        depth: usize,
    },

    /// The node hash function failed.
    #[error("node hashing failed: {0}")]
    Hash(String),
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A compressed signature is not 64 bytes.
    #[error("compressed signature must be 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// The `R8` point or `S` scalar of a compressed signature is invalid.
    #[error("signature decompression failed: {0}")]
    SignatureDecompressionFailed(String),

    /// A public key is malformed or not on the curve.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature verification failed.
    #[error("signature verification failed")]
    InvalidSignature,

    /// Private key input is malformed.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Hash called with an unsupported number of inputs.
    #[error("hash arity {0} is outside the supported range 1..=12")]
    HashArity(usize),

    /// Hash backend failure.
    #[error("hash failed: {0}")]
    Hash(String),

    /// A point does not satisfy the curve equation.
    #[error("point is not on the Baby Jubjub curve")]
    NotOnCurve,
}

/// Error in the state transition protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The authentication claim is not included under the old claims root.
    #[error("authentication claim is not included in the claims tree")]
    AuthClaimNotIncluded,

    /// The authentication claim's revocation nonce is in the revocation tree.
    #[error("authentication claim is revoked")]
    AuthClaimRevoked,

    /// The transition signature does not verify.
    #[error("transition signature is invalid")]
    InvalidSignature,

    /// The supplied roots do not hash to the claimed old state.
    #[error("roots do not hash to the old state")]
    StateMismatch,

    /// The old state is flagged as genesis but does not derive the identifier.
    #[error("old state is not the genesis state of the identifier")]
    GenesisMismatch,

    /// The verifying key differs from the key committed in the auth claim.
    #[error("public key does not match the authentication claim")]
    AuthClaimKeyMismatch,

    /// Tree failure while checking a proof.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Crypto failure while checking a signature or hash.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Claim could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Auth claim could not be decoded.
    #[error(transparent)]
    Decoding(#[from] DecodingError),
}

impl From<CryptoError> for TreeError {
    fn from(e: CryptoError) -> Self {
        TreeError::Hash(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_wraps_component_errors() {
        let err: IdStateError = TreeError::KeyAlreadyExists.into();
        assert!(matches!(err, IdStateError::Tree(TreeError::KeyAlreadyExists)));
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_protocol_error_is_transparent_over_tree_error() {
        let err: ProtocolError = TreeError::ProofVerificationFailed.into();
        assert_eq!(err.to_string(), "merkle proof verification failed");
    }

    #[test]
    fn test_crypto_error_maps_into_tree_hash_error() {
        let err: TreeError = CryptoError::HashArity(13).into();
        assert!(matches!(err, TreeError::Hash(msg) if msg.contains("13")));
    }

    #[test]
    fn test_slot_overflow_display_names_slot() {
        let err = EncodingError::SlotOverflow {
            slot: 6,
            source: FieldError::OutOfRange("p".into()),
        };
        assert!(err.to_string().starts_with("slot 6"));
    }
}
