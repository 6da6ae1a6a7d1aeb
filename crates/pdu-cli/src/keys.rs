//! # Key Subcommands
//!
//! `keygen` and `address`.

use clap::Args;
use pdu_crypto::Ed25519KeyPair;
use serde::Serialize;

/// Arguments for the keygen subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {}

/// Arguments for the address subcommand.
#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Private key as 64 hex chars.
    #[arg(long)]
    pub key: String,
}

/// Output of `keygen`.
#[derive(Debug, Serialize)]
pub struct GeneratedKey {
    pub private_key: String,
    pub public_key: String,
    pub address: String,
}

pub fn keygen(_args: &KeygenArgs) -> GeneratedKey {
    let kp = Ed25519KeyPair::generate();
    let public_key = kp.public_key();
    tracing::info!(address = %public_key.address(), "generated key pair");
    GeneratedKey {
        private_key: kp.to_hex(),
        address: public_key.address(),
        public_key: public_key.to_hex(),
    }
}

pub fn address(args: &AddressArgs) -> anyhow::Result<String> {
    let kp = Ed25519KeyPair::from_hex(&args.key)?;
    Ok(kp.public_key().address())
}
