//! # idstate-cli — Identity State CLI
//!
//! Provides the `idstate` command-line interface over the identity state
//! crates.
//!
//! ## Subcommands
//!
//! - `idstate key`: Baby Jubjub key generation and public key derivation.
//! - `idstate hash`: Poseidon hashing of decimal field elements.
//! - `idstate claim`: Authentication claim slots and `hIndex`/`hValue`.
//! - `idstate vectors`: State-transition and auth circuit inputs.
//!
//! ```bash
//! idstate key public --private-key 28156abe7fe2fd433dc9df969286b96666489bac508612d0e16593e944c4f69f
//! idstate hash 1 2
//! idstate --profile profile.yaml vectors state-transition --private-key … --out st.json
//! ```

pub mod claim;
pub mod config;
pub mod hash;
pub mod key;
pub mod vectors;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty-print `value` as JSON to `out`, or to stdout when `out` is `None`.
pub fn emit_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match out {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}
