//! # pdu-cli — PDU Envelope Command-Line Interface
//!
//! A terminal replacement for the mobile signing form: paste a private key,
//! compose a message, seal it, and inspect what comes back.
//!
//! ## Subcommands
//!
//! - `keygen` — Generate a private key and print its address
//! - `address` — Derive the address of a private key
//! - `compose` — Build an info body, seal it, print transport JSON
//! - `decode` — Decode a received envelope's capsule and payload
//! - `verify` — Check a received envelope's signature
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handlers delegate to `pdu-core` and `pdu-crypto`.
//! - Results go to stdout; logs go to stderr.

pub mod compose;
pub mod decode;
pub mod input;
pub mod keys;
pub mod verify;
