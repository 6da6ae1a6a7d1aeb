//! # pdu CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// PDU envelope toolchain.
///
/// Generates keys, composes and seals envelopes, and decodes and verifies
/// envelopes received from peers.
#[derive(Parser, Debug)]
#[command(name = "pdu", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate a new private key.
    Keygen(pdu_cli::keys::KeygenArgs),
    /// Derive the address of a private key.
    Address(pdu_cli::keys::AddressArgs),
    /// Compose and seal an info envelope.
    Compose(pdu_cli::compose::ComposeArgs),
    /// Decode a received envelope.
    Decode(pdu_cli::decode::DecodeArgs),
    /// Verify a received envelope's signature.
    Verify(pdu_cli::verify::VerifyArgs),
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen(args) => print_json(&pdu_cli::keys::keygen(&args))?,
        Commands::Address(args) => println!("{}", pdu_cli::keys::address(&args)?),
        Commands::Compose(args) => print_json(&pdu_cli::compose::run(&args)?)?,
        Commands::Decode(args) => print_json(&pdu_cli::decode::run(&args)?)?,
        Commands::Verify(args) => {
            let address = pdu_cli::verify::run(&args)?;
            println!("ok {address}");
        }
    }

    Ok(())
}
