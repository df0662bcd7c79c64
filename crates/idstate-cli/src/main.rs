//! # idstate CLI entry point
//!
//! Parses command-line arguments, loads the protocol profile and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use idstate_cli::claim::{run_claim, ClaimArgs};
use idstate_cli::config::load_profile;
use idstate_cli::hash::{run_hash, HashArgs};
use idstate_cli::key::{run_key, KeyArgs};
use idstate_cli::vectors::{run_vectors, VectorsArgs};

/// Identity state toolkit.
///
/// Derives Baby Jubjub keys, hashes field elements with Poseidon, encodes
/// authentication claims and emits circuit input vectors for state
/// transitions and challenge authentication.
#[derive(Parser, Debug)]
#[command(name = "idstate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Protocol profile (YAML or JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Baby Jubjub key generation and public key derivation.
    Key(KeyArgs),

    /// Poseidon hash of decimal field elements.
    Hash(HashArgs),

    /// Claim encoding.
    Claim(ClaimArgs),

    /// Circuit input vectors.
    Vectors(VectorsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("idstate CLI starting");

    let profile = match load_profile(cli.profile.as_deref()) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Key(args) => run_key(&args),
        Commands::Hash(args) => run_hash(&args),
        Commands::Claim(args) => run_claim(&args),
        Commands::Vectors(args) => run_vectors(&args, &profile),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
