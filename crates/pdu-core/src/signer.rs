//! # Signing Seam
//!
//! The envelope core does not fix a signature scheme. Sealing and
//! verification go through these two traits; `pdu-crypto` provides the
//! Ed25519 implementation. Both operate on [`CanonicalBytes`] only, so a
//! signer can never be handed bytes that skipped canonicalization.

use crate::canonical::CanonicalBytes;
use crate::error::CryptoError;

/// Produces envelope signatures.
pub trait EnvelopeSigner {
    /// The address identifying this signer.
    fn address(&self) -> String;

    /// Sign the canonical signing payload, returning the signature text
    /// that becomes the envelope's identity.
    fn sign(&self, payload: &CanonicalBytes) -> Result<String, CryptoError>;
}

/// Checks envelope signatures.
pub trait EnvelopeVerifier {
    /// Returns `Ok(())` iff `signature` is valid over `payload`.
    fn verify(&self, payload: &CanonicalBytes, signature: &str) -> Result<(), CryptoError>;
}

impl<T: EnvelopeSigner + ?Sized> EnvelopeSigner for &T {
    fn address(&self) -> String {
        (**self).address()
    }

    fn sign(&self, payload: &CanonicalBytes) -> Result<String, CryptoError> {
        (**self).sign(payload)
    }
}

impl<T: EnvelopeVerifier + ?Sized> EnvelopeVerifier for &T {
    fn verify(&self, payload: &CanonicalBytes, signature: &str) -> Result<(), CryptoError> {
        (**self).verify(payload, signature)
    }
}
