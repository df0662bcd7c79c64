#![deny(missing_docs)]

//! # idstate-core — Foundational Types
//!
//! Shared primitives for every crate in the identity-state stack:
//!
//! - [`FieldElement`]: an element of the BN254 scalar field, the unit of
//!   every claim slot, tree key, tree value and state hash.
//! - [`Identifier`]: the 31-byte identity identifier derived from the
//!   genesis state.
//! - Hex helpers for fixed-width byte arrays.
//! - The [`error`] taxonomy used across the workspace.
//!
//! ## Crate Policy
//!
//! - No I/O, no logging, no randomness. Everything here is pure.
//! - Out-of-range field input is an error, never silently reduced.

pub mod bytes;
pub mod error;
pub mod field;
pub mod identifier;

pub use error::{
    CryptoError, DecodingError, EncodingError, FieldError, HexError, IdStateError, ProtocolError,
    TreeError,
};
pub use field::FieldElement;
pub use identifier::Identifier;
