//! # Hash Subcommand
//!
//! Poseidon hash of one to twelve decimal field elements.

use anyhow::{bail, Context, Result};
use clap::Args;

use idstate_core::FieldElement;
use idstate_crypto::poseidon::MAX_ARITY;
use idstate_crypto::{poseidon_hash, FieldHasher, Poseidon};

/// Arguments for the `idstate hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Field elements as decimal strings.
    #[arg(value_name = "ELEMENT", required = true)]
    pub elements: Vec<String>,
}

/// Execute the hash subcommand.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let digest = hash_decimal(&args.elements)?;
    println!("{digest}");
    Ok(0)
}

fn hash_decimal(elements: &[String]) -> Result<FieldElement> {
    if elements.is_empty() || elements.len() > MAX_ARITY {
        bail!("expected 1 to {MAX_ARITY} elements, got {}", elements.len());
    }
    let inputs = elements
        .iter()
        .map(|e| {
            FieldElement::from_decimal(e)
                .with_context(|| format!("invalid field element: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(hasher = Poseidon.name(), arity = inputs.len(), "hashing");
    Ok(poseidon_hash(&inputs)?)
}
