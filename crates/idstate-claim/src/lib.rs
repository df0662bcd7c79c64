//! # idstate-claim — Claim Encoding
//!
//! A claim is the unit of attestation committed into an identity's claims
//! tree. On the wire it is exactly eight field elements:
//!
//! | Slot | Section | Content |
//! |------|---------|---------|
//! | 0 | index | schema hash, header flags, version |
//! | 1 | index | subject identifier (subject in index) |
//! | 2–3 | index | index data, merklized root in slot 2 |
//! | 4 | value | revocation nonce, expiration date |
//! | 5 | value | subject identifier (subject in value) |
//! | 6–7 | value | value data, merklized root in slot 6 |
//!
//! The claims tree stores `hIndex = H(slots 0..4)` as key and
//! `hValue = H(slots 4..8)` as value, so two claims with the same index
//! section cannot coexist in one tree.

pub mod auth;
pub mod claim;
pub mod codec;
pub mod schema;

pub use auth::{auth_claim, auth_public_key, auth_public_key_from_slots, AUTH_SCHEMA_HASH};
pub use claim::{Claim, ClaimBuilder, MerklizedRoot, SubjectPosition};
pub use codec::ClaimSlots;
pub use schema::SchemaHash;
