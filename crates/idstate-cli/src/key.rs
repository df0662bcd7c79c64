//! # Key Subcommand
//!
//! Baby Jubjub key generation and public key derivation.
//!
//! ## Security Invariant
//!
//! Generated private keys go to the requested file or stdout only; they
//! are never logged.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use idstate_crypto::PrivateKey;

/// Arguments for the `idstate key` subcommand.
#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

/// Key subcommands.
#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Derive the public key of a private key.
    Public {
        /// Private key (hex-encoded 32 bytes).
        #[arg(long)]
        private_key: String,
    },

    /// Generate a new private key.
    Generate {
        /// Write the key pair JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Execute the key subcommand.
pub fn run_key(args: &KeyArgs) -> Result<u8> {
    match &args.command {
        KeyCommand::Public { private_key } => cmd_public(private_key),
        KeyCommand::Generate { out } => cmd_generate(out.as_deref()),
    }
}

/// Parse a hex private key with a CLI-friendly error.
pub fn parse_private_key(hex: &str) -> Result<PrivateKey> {
    PrivateKey::from_hex(hex.trim()).context("invalid private key")
}

fn key_json(sk: &PrivateKey) -> serde_json::Value {
    let pk = sk.public_key();
    json!({
        "publicKey": pk.to_hex(),
        "x": pk.x(),
        "y": pk.y(),
    })
}

fn cmd_public(private_key: &str) -> Result<u8> {
    let sk = parse_private_key(private_key)?;
    crate::emit_json(&key_json(&sk), None)?;
    Ok(0)
}

fn cmd_generate(out: Option<&Path>) -> Result<u8> {
    let sk = PrivateKey::generate();
    let mut value = key_json(&sk);
    value["privateKey"] = json!(sk
        .as_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<String>());
    crate::emit_json(&value, out)?;
    tracing::info!(public_key = %sk.public_key(), "generated key");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "28156abe7fe2fd433dc9df969286b96666489bac508612d0e16593e944c4f69f";

    #[test]
    fn public_key_derivation() {
        assert_eq!(cmd_public(KEY_HEX).unwrap(), 0);
    }

    #[test]
    fn invalid_private_key_rejected() {
        let err = cmd_public("zz").unwrap_err();
        assert!(format!("{err:#}").contains("invalid private key"));
    }

    #[test]
    fn generate_writes_key_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        assert_eq!(cmd_generate(Some(&path)).unwrap(), 0);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let sk_hex = value["privateKey"].as_str().unwrap();
        assert_eq!(sk_hex.len(), 64);
        let sk = parse_private_key(sk_hex).unwrap();
        assert_eq!(value["publicKey"], sk.public_key().to_hex());
    }
}
