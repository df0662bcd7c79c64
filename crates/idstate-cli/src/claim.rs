//! # Claim Subcommand
//!
//! Encodes authentication claims into their eight slots with `hIndex` and
//! `hValue`, and decodes slot vectors back into claims.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use idstate_claim::{auth_claim, Claim, ClaimSlots};
use idstate_core::FieldElement;
use idstate_crypto::Poseidon;

use crate::key::parse_private_key;

/// Arguments for the `idstate claim` subcommand.
#[derive(Args, Debug)]
pub struct ClaimArgs {
    #[command(subcommand)]
    pub command: ClaimCommand,
}

/// Claim subcommands.
#[derive(Subcommand, Debug)]
pub enum ClaimCommand {
    /// Encode the authentication claim of a private key.
    Auth {
        /// Private key (hex-encoded 32 bytes).
        #[arg(long)]
        private_key: String,
        /// Revocation nonce of the claim.
        #[arg(long, default_value_t = 0)]
        nonce: u64,
    },

    /// Decode eight decimal slots into a claim.
    Decode {
        /// Slots `i0 i1 i2 i3 v0 v1 v2 v3`.
        #[arg(value_name = "SLOT", num_args = 8, required = true)]
        slots: Vec<String>,
    },
}

/// Execute the claim subcommand.
pub fn run_claim(args: &ClaimArgs) -> Result<u8> {
    match &args.command {
        ClaimCommand::Auth { private_key, nonce } => cmd_auth(private_key, *nonce),
        ClaimCommand::Decode { slots } => cmd_decode(slots),
    }
}

fn auth_json(private_key: &str, nonce: u64) -> Result<serde_json::Value> {
    let sk = parse_private_key(private_key)?;
    let claim = auth_claim(&sk.public_key(), nonce);
    let slots = claim.encode().context("failed to encode auth claim")?;
    let (hi, hv) = slots.hi_hv(&Poseidon).context("failed to hash auth claim")?;
    Ok(json!({
        "slots": slots,
        "hIndex": hi,
        "hValue": hv,
        "claim": claim,
    }))
}

fn cmd_auth(private_key: &str, nonce: u64) -> Result<u8> {
    crate::emit_json(&auth_json(private_key, nonce)?, None)?;
    Ok(0)
}

fn decode_slots(slots: &[String]) -> Result<Claim> {
    if slots.len() != 8 {
        bail!("expected 8 slots, got {}", slots.len());
    }
    let mut elements = [FieldElement::zero(); 8];
    for (dst, src) in elements.iter_mut().zip(slots) {
        *dst = FieldElement::from_decimal(src)
            .with_context(|| format!("invalid slot: {src}"))?;
    }
    Claim::decode(&ClaimSlots(elements)).context("failed to decode claim")
}

fn cmd_decode(slots: &[String]) -> Result<u8> {
    let claim = decode_slots(slots)?;
    crate::emit_json(&claim, None)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "28156abe7fe2fd433dc9df969286b96666489bac508612d0e16593e944c4f69f";

    #[test]
    fn auth_claim_output_shape() {
        let value = auth_json(KEY_HEX, 3).unwrap();
        assert_eq!(value["slots"].as_array().unwrap().len(), 8);
        assert!(value["hIndex"].is_string());
        assert!(value["hValue"].is_string());
        assert_eq!(value["claim"]["revocationNonce"], 3);
    }

    #[test]
    fn auth_slots_decode_back() {
        let value = auth_json(KEY_HEX, 7).unwrap();
        let slots: Vec<String> = value["slots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap().to_string())
            .collect();
        let claim = decode_slots(&slots).unwrap();
        let sk = parse_private_key(KEY_HEX).unwrap();
        assert_eq!(claim, auth_claim(&sk.public_key(), 7));
    }

    #[test]
    fn wrong_slot_count_rejected() {
        assert!(decode_slots(&["0".to_string()]).is_err());
    }
}
