//! # pdu-crypto — Ed25519 Backend for Envelope Signing
//!
//! Implements the `pdu-core` signing seam with Ed25519:
//!
//! - **Key pairs** generated from the OS RNG or restored from a hex seed.
//! - **Addresses** derived from public keys.
//! - **`EnvelopeSigner`** for `Ed25519KeyPair` and **`EnvelopeVerifier`**
//!   for `Ed25519PublicKey`, both over `CanonicalBytes`.
//!
//! Keystore encryption and signer recovery from a signature are not
//! provided; Ed25519 signatures do not carry a recoverable public key.
//!
//! ## Crate Policy
//!
//! - Depends only on `pdu-core` internally.
//! - No mocking of cryptographic operations in tests.

pub mod ed25519;
mod hex;

pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
