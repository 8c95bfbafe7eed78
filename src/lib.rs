//! Provenant: tamper-evident verification core for governance workspaces
//!
//! **Provenant is the integrity layer of a local-first governance workspace
//! where humans and autonomous agents jointly produce artifacts.**
//!
//! It carries two load-bearing subsystems:
//!
//! - **Ledger & bundle verification**: an append-only, hash-chained audit
//!   trail of governance events, a detached verification block for exported
//!   bundles, and detached ECDSA P-256 signatures over canonical JSON. All
//!   digests route through one canonical encoder, so independently computed
//!   hashes reproduce bit-for-bit across machines.
//! - **Optimistic write coordination**: per-artifact revision counters with
//!   compare-and-increment semantics that reject stale concurrent writes,
//!   plus per-agent heartbeat tracking for staleness detection.
//!
//! # Principles
//!
//! - **Deterministic**: verification of the same input always yields the
//!   same result; no network I/O, no hidden state.
//! - **Report everything**: integrity violations never abort a run; every
//!   failing check across every entry is collected and reported.
//! - **Fail closed**: unknown signature algorithms are rejected outright.
//! - **Advisory concurrency**: revisions and heartbeats are ephemeral,
//!   process-local, and explicitly resettable; they prevent lost updates,
//!   they are not a system of record.
//!
//! # CLI
//!
//! ```bash
//! # Verify an exported bundle (or '-' for stdin)
//! provenant verify bundle.json
//!
//! # Machine-readable report
//! provenant verify bundle.json --json
//! ```
//!
//! Exit codes: 0 on full success, 1 on any verification failure or
//! unparseable input, 2 on usage error.

pub mod core;

use crate::core::bundle;
use crate::core::error::ProvenantError;
use crate::core::report;
use crate::core::signature;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;

#[derive(Parser, Debug)]
#[clap(
    name = "provenant",
    version = env!("CARGO_PKG_VERSION"),
    about = "Tamper-evident bundle verification for local-first governance workspaces"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify an exported bundle or signed deliverable.
    Verify(VerifyCli),
}

#[derive(clap::Args, Debug)]
pub struct VerifyCli {
    /// Bundle JSON file path, or '-' to read standard input.
    #[clap(value_name = "INPUT")]
    pub input: String,
    /// Output machine-readable JSON.
    #[clap(long)]
    pub json: bool,
}

fn read_input(input: &str) -> Result<String, ProvenantError> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn run_verify(cli: &VerifyCli) -> Result<bool, ProvenantError> {
    let raw = read_input(&cli.input)?;
    let document: serde_json::Value = serde_json::from_str(&raw)?;

    if signature::is_signed_bundle(&document) {
        // Signed deliverables always report as the compact JSON result.
        let result = signature::verify_signed_bundle(&document)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result.valid);
    }

    let report_data = bundle::verify_bundle(&document)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report_data)?);
    } else {
        print!("{}", report::render_bundle_report(&report_data));
    }
    Ok(report_data.valid)
}

/// Execute a parsed CLI invocation, returning the process exit code.
pub fn run(cli: &Cli) -> i32 {
    match &cli.command {
        Command::Verify(verify_cli) => match run_verify(verify_cli) {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                eprintln!("provenant: {}", e);
                1
            }
        },
    }
}
