//! # Ed25519 Keys and Signatures
//!
//! The Ed25519 backend behind the envelope signing seam.
//!
//! ## Security Invariant
//!
//! - Signing input is `&CanonicalBytes`; raw bytes cannot be signed.
//! - `Ed25519KeyPair` does not implement `Serialize` and its `Debug` output
//!   hides the private key. The private key leaves the type only through the
//!   explicit [`Ed25519KeyPair::to_hex`].
//!
//! ## Wire forms
//!
//! - Private keys: 64 lowercase hex chars (the 32-byte seed).
//! - Public keys: 64 lowercase hex chars; serde uses the same form.
//! - Signatures: 128 lowercase hex chars. This string is the envelope's
//!   `signature` and identity.
//! - Addresses: `0x` + hex of the last 20 bytes of SHA-256(public key).

use ed25519_dalek::{Signer, Verifier};
use pdu_core::{CanonicalBytes, CryptoError, EnvelopeSigner, EnvelopeVerifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::hex::{hex_prefix, hex_to_array, to_hex};

/// An Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing envelopes.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        hex_to_array(hex)
            .map(Self)
            .map_err(|e| CryptoError::KeyError(format!("public key: {e}")))
    }

    /// The address derived from this key.
    pub fn address(&self) -> String {
        let hash = Sha256::digest(self.0);
        format!("0x{}", to_hex(&hash[12..]))
    }

    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl EnvelopeVerifier for Ed25519PublicKey {
    fn verify(&self, payload: &CanonicalBytes, signature: &str) -> Result<(), CryptoError> {
        let signature = Ed25519Signature::from_hex(signature)?;
        verify(payload, &signature, self)
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        hex_to_array(hex)
            .map(Self)
            .map_err(|e| CryptoError::VerificationFailed(format!("signature: {e}")))
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Parse a private key from its 64-character hex form.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let seed: [u8; 32] =
            hex_to_array(hex).map_err(|e| CryptoError::KeyError(format!("private key: {e}")))?;
        Ok(Self::from_seed(&seed))
    }

    /// Export the private key seed as hex.
    pub fn to_hex(&self) -> String {
        to_hex(self.signing_key.as_bytes())
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        let sig = self.signing_key.sign(data.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

impl EnvelopeSigner for Ed25519KeyPair {
    fn address(&self) -> String {
        self.public_key().address()
    }

    fn sign(&self, payload: &CanonicalBytes) -> Result<String, CryptoError> {
        Ok(Ed25519KeyPair::sign(self, payload).to_hex())
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over canonical bytes.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(content: &str) -> CanonicalBytes {
        CanonicalBytes::signing_payload(content, &[]).unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let data = payload("eyJ0IjowfQ==");
        let sig = kp.sign(&data);
        verify(&data, &sig, &kp.public_key()).expect("valid signature should verify");
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let data = payload("a");
        let sig = kp1.sign(&data);
        assert!(verify(&data, &sig, &kp2.public_key()).is_err());
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&payload("original"));
        assert!(verify(&payload("tampered"), &sig, &kp.public_key()).is_err());
    }

    #[test]
    fn test_deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = Ed25519KeyPair::from_seed(&seed);
        let kp2 = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(&payload("x")), kp2.sign(&payload("x")));
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let hex = kp.to_hex();
        assert_eq!(hex.len(), 64);
        let restored = Ed25519KeyPair::from_hex(&hex).unwrap();
        assert_eq!(restored.public_key(), kp.public_key());
    }

    #[test]
    fn test_private_key_hex_rejects_garbage() {
        assert!(matches!(
            Ed25519KeyPair::from_hex("not-hex"),
            Err(CryptoError::KeyError(_))
        ));
        assert!(Ed25519KeyPair::from_hex(&"ab".repeat(31)).is_err());
    }

    #[test]
    fn test_address_format() {
        let kp = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let addr = EnvelopeSigner::address(&kp);
        assert!(addr.starts_with("0x"));
        assert_eq!(addr.len(), 2 + 40);
        assert_eq!(addr, kp.public_key().address());
    }

    #[test]
    fn test_signer_trait_produces_hex_signature() {
        let kp = Ed25519KeyPair::generate();
        let data = payload("y");
        let sig = EnvelopeSigner::sign(&kp, &data).unwrap();
        assert_eq!(sig.len(), 128);
        EnvelopeVerifier::verify(&kp.public_key(), &data, &sig).unwrap();
    }

    #[test]
    fn test_verifier_rejects_malformed_signature() {
        let kp = Ed25519KeyPair::generate();
        assert!(matches!(
            EnvelopeVerifier::verify(&kp.public_key(), &payload("y"), "abcd"),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn test_public_key_serde_json_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let pk2: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        let debug = format!("{kp:?}");
        assert_eq!(debug, "Ed25519KeyPair(<private>)");
        assert!(!debug.contains(&kp.to_hex()));
    }
}
