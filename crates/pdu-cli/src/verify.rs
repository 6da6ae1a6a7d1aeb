//! # Verify Subcommand
//!
//! Checks a received envelope's signature against an author's public key.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pdu_core::EnvelopeRecord;
use pdu_crypto::Ed25519PublicKey;

use crate::input::read_envelope;

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Author's public key as 64 hex chars.
    #[arg(long)]
    pub public_key: String,

    /// Envelope JSON file. Reads stdin when omitted.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Verify and return the author's address.
pub fn run(args: &VerifyArgs) -> anyhow::Result<String> {
    let record = read_envelope(args.file.as_deref())?;
    check(&record, &args.public_key)
}

pub fn check(record: &EnvelopeRecord, public_key_hex: &str) -> anyhow::Result<String> {
    let public_key = Ed25519PublicKey::from_hex(public_key_hex).context("parsing public key")?;
    record
        .verify(&public_key)
        .with_context(|| format!("envelope {} failed verification", record.signature()))?;
    Ok(public_key.address())
}
