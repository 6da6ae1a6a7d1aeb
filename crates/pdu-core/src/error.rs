//! # Error Types — Structured Error Hierarchy
//!
//! Every failure in the envelope stack is a typed value. Decoding errors in
//! particular are returned for attacker-controlled input and must never be
//! replaced by a panic.
//!
//! ## Design
//!
//! - Decode errors name the layer (`Stage`) or the field that failed.
//! - Resource errors carry the index of the offending entry and wrap the
//!   underlying cause; the whole body decode fails with them.
//! - Crypto errors carry a human-readable reason from the backend.

use thiserror::Error;

use crate::capsule::CapsuleKind;

/// Top-level error type for the PDU envelope stack.
#[derive(Error, Debug)]
pub enum PduError {
    /// Payload decoding failed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Payload encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Envelope construction, sealing, or verification failed.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Resource checksum verification failed.
    #[error("checksum error: {0}")]
    Checksum(#[from] ChecksumError),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Cryptographic backend failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Envelope store rejected an operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The payload layer in which a decode failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The envelope's outer `content` string.
    Content,
    /// The capsule's inner `d` blob.
    CapsuleData,
    /// A resource descriptor's inline `data` field.
    ResourceData,
}

impl Stage {
    /// Returns the stage identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::CapsuleData => "capsule data",
            Self::ResourceData => "resource data",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error while decoding the layered payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A field expected to be base64 failed to decode.
    #[error("invalid base64 in {stage}")]
    InvalidBase64 {
        /// Layer that held the malformed base64.
        stage: Stage,
    },

    /// Decoded bytes are not a well-formed JSON object.
    #[error("invalid JSON object in {stage}")]
    InvalidJson {
        /// Layer whose decoded bytes failed to parse.
        stage: Stage,
    },

    /// A required key is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A key is present with the wrong JSON type.
    #[error("field `{0}` has the wrong type")]
    TypeMismatch(&'static str),

    /// A single resource entry failed; the whole body is rejected.
    #[error("resource {index}: {cause}")]
    ResourceDecode {
        /// Position of the failing entry in `resources`.
        index: usize,
        /// The underlying failure.
        cause: Box<DecodeError>,
    },

    /// A typed payload accessor was called on a capsule of another kind.
    #[error("expected {expected} capsule, found kind {found}")]
    WrongKind {
        /// The kind the accessor decodes.
        expected: CapsuleKind,
        /// The capsule's actual `t` tag.
        found: i64,
    },
}

/// Error while encoding a payload layer.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// JSON serialization failed.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error constructing, sealing, or verifying an envelope record.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// A required wire field is empty.
    #[error("envelope field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// The envelope's content could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The envelope's payload could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The signing payload could not be canonicalized.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// The signing backend failed or the signature did not verify.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Error verifying a resource checksum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    /// The resource has no inline data to hash; it must be fetched first.
    #[error("resource has no inline data")]
    NoInlineData,

    /// The computed checksum differs from the declared `cs`.
    #[error("checksum mismatch: declared {expected}, computed {actual}")]
    Mismatch {
        /// The checksum carried by the descriptor.
        expected: String,
        /// The checksum computed over the inline data.
        actual: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no stable canonical form and are rejected.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// The backend could not produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Error raised by the envelope store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An envelope with this signature is already held.
    #[error("duplicate envelope {0}")]
    Duplicate(String),

    /// No envelope with this signature is held.
    #[error("unknown envelope {0}")]
    UnknownEnvelope(String),
}
