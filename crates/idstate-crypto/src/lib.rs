//! # idstate-crypto — ZK-Friendly Primitives
//!
//! Provides the hash and signature primitives the identity-state stack
//! commits with:
//!
//! - **Poseidon** over the BN254 scalar field with the circom parameter
//!   set, behind the [`FieldHasher`] trait so trees and codecs stay
//!   hash-agnostic.
//! - **Baby Jubjub** twisted Edwards arithmetic and point compression.
//! - **EdDSA-Poseidon** key derivation, signing and verification.
//!
//! ## Crate Policy
//!
//! - Depends only on `idstate-core` internally.
//! - Private key bytes are zeroized on drop and never serialized.
//! - No mocking of cryptographic operations in tests.

pub mod babyjubjub;
pub mod eddsa;
pub mod hash;
pub mod poseidon;

pub use babyjubjub::Point;
pub use eddsa::{verify, PrivateKey, PublicKey, Signature};
pub use hash::FieldHasher;
pub use poseidon::{poseidon_hash, Poseidon};
