//! # Vectors Subcommand
//!
//! Builds an identity from a private key under the loaded profile and
//! emits circuit inputs:
//!
//! - `state-transition`: genesis state → state after revoking the given
//!   nonces. The transition is verified before it is written.
//! - `auth`: a signed challenge proved against the genesis state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use idstate_core::FieldElement;
use idstate_protocol::{
    verify_transition, AuthInputs, Identity, ProtocolProfile, StateTransitionInputs,
};

use crate::key::parse_private_key;

/// Arguments for the `idstate vectors` subcommand.
#[derive(Args, Debug)]
pub struct VectorsArgs {
    #[command(subcommand)]
    pub command: VectorsCommand,
}

/// Vector subcommands.
#[derive(Subcommand, Debug)]
pub enum VectorsCommand {
    /// State-transition circuit inputs.
    StateTransition {
        /// Private key (hex-encoded 32 bytes).
        #[arg(long)]
        private_key: String,
        /// Nonces to revoke in the new state (repeatable).
        #[arg(long = "revoke", default_values_t = vec![1u64])]
        revoke: Vec<u64>,
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Auth circuit inputs.
    Auth {
        /// Private key (hex-encoded 32 bytes).
        #[arg(long)]
        private_key: String,
        /// Challenge as a decimal field element.
        #[arg(long)]
        challenge: String,
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Execute the vectors subcommand.
pub fn run_vectors(args: &VectorsArgs, profile: &ProtocolProfile) -> Result<u8> {
    match &args.command {
        VectorsCommand::StateTransition {
            private_key,
            revoke,
            out,
        } => cmd_state_transition(private_key, revoke, profile, out.as_deref()),
        VectorsCommand::Auth {
            private_key,
            challenge,
            out,
        } => cmd_auth(private_key, challenge, profile, out.as_deref()),
    }
}

fn identity(private_key: &str, profile: &ProtocolProfile) -> Result<Identity> {
    let sk = parse_private_key(private_key)?;
    Identity::builder(sk)
        .profile(*profile)
        .build()
        .context("failed to create identity")
}

fn state_transition_inputs(
    private_key: &str,
    revoke: &[u64],
    profile: &ProtocolProfile,
) -> Result<StateTransitionInputs> {
    let mut id = identity(private_key, profile)?;
    let genesis = id.snapshot();
    for nonce in revoke {
        id.revoke(*nonce)
            .with_context(|| format!("failed to revoke nonce {nonce}"))?;
    }
    let transition = id
        .transition_from(&genesis)
        .context("failed to sign state transition")?;
    verify_transition(&transition, id.public_key(), profile, id.genesis_scheme())
        .context("generated transition does not verify")?;
    Ok(StateTransitionInputs::from_transition(&transition, profile)?)
}

fn cmd_state_transition(
    private_key: &str,
    revoke: &[u64],
    profile: &ProtocolProfile,
    out: Option<&Path>,
) -> Result<u8> {
    let inputs = state_transition_inputs(private_key, revoke, profile)?;
    crate::emit_json(&inputs, out)?;
    Ok(0)
}

fn auth_inputs(
    private_key: &str,
    challenge: &str,
    profile: &ProtocolProfile,
) -> Result<AuthInputs> {
    let challenge = FieldElement::from_decimal(challenge)
        .with_context(|| format!("invalid challenge: {challenge}"))?;
    let id = identity(private_key, profile)?;
    Ok(AuthInputs::from_identity(&id, challenge)?)
}

fn cmd_auth(
    private_key: &str,
    challenge: &str,
    profile: &ProtocolProfile,
    out: Option<&Path>,
) -> Result<u8> {
    let inputs = auth_inputs(private_key, challenge, profile)?;
    crate::emit_json(&inputs, out)?;
    Ok(0)
}
