//! # idstate-protocol — Identity State Protocol
//!
//! Ties claims, trees and signatures into identities:
//!
//! - [`IdentityState`]: the three tree roots and their state hash
//!   `H(claimsRoot, revocationRoot, rootsRoot)`.
//! - [`GenesisScheme`]: derivation of the permanent identifier from the
//!   first claims root.
//! - [`Identity`]: an identity's key, trees and identifier, built by
//!   [`IdentityBuilder`].
//! - [`StateTransition`]: a signed move from one state to the next, and
//!   [`verify_transition`] to check it.
//! - [`vectors`]: circuit input shapes with the exact JSON field names the
//!   circuits expect.
//!
//! ## State Machine
//!
//! `Genesis → Transitioned(1) → Transitioned(2) → …`. Each transition is
//! verified against the state immediately before it.

pub mod genesis;
pub mod identity;
pub mod profile;
pub mod state;
pub mod transition;
pub mod vectors;

pub use genesis::{genesis_id, is_genesis, GenesisScheme, SumChecksumV0};
pub use identity::{Identity, IdentityBuilder};
pub use profile::ProtocolProfile;
pub use state::IdentityState;
pub use transition::{sign_transition, transition_message, verify_transition, StateTransition};
pub use vectors::{AuthInputs, StateTransitionInputs};
