//! # pdu-core — Signed Envelopes and the Layered Payload Codec
//!
//! An envelope is `{content, refs, signature}`. Its `content` is a base64
//! JSON *capsule* `{t, v, d}` whose `d` is in turn a base64 JSON *body*
//! `{text, quote, resources}`. This crate owns that data model and the
//! transforms between the wire strings and typed values.
//!
//! ## Key Design Principles
//!
//! 1. **Decoding is total.** Content comes from untrusted peers. Every
//!    derived layer is an explicit fallible accessor returning
//!    `Result<_, DecodeError>`; nothing panics on malformed input.
//!
//! 2. **All or nothing.** A body with one malformed resource entry is
//!    rejected as a whole. A partially decoded body would present
//!    truncated content as if it were what the author signed.
//!
//! 3. **Signed fields are immutable.** `EnvelopeRecord` exposes no setters.
//!    Local-only metadata lives in the `EnvelopeStore` side table.
//!
//! 4. **Identity is the signature.** Equality and hashing of envelope
//!    records look at `signature` alone.
//!
//! 5. **Signers see canonical bytes only.** `EnvelopeSigner::sign()` takes
//!    `&CanonicalBytes`, produced by JCS canonicalization of
//!    `{content, refs}`.
//!
//! ## Crate Policy
//!
//! - No I/O, no global state. Decoding and encoding are pure and may run
//!   concurrently on any number of threads.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod body;
pub mod canonical;
pub mod capsule;
pub mod codec;
pub mod digest;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod resource;
pub mod signer;
pub mod store;

// Re-export primary types for ergonomic imports.
pub use body::Body;
pub use canonical::CanonicalBytes;
pub use capsule::{Capsule, CapsuleKind, CAPSULE_VERSION};
pub use codec::{decode_body, decode_capsule, encode_body, encode_capsule, encode_content};
pub use digest::{resource_checksum, ContentDigest};
pub use envelope::{DecodedEnvelope, EnvelopeRecord};
pub use error::{
    CanonicalizationError, ChecksumError, CryptoError, DecodeError, EncodeError, EnvelopeError,
    PduError, Stage, StoreError,
};
pub use payload::{BornPayload, ProfilePayload};
pub use resource::{ResourceDescriptor, FORMAT_IMAGE};
pub use signer::{EnvelopeSigner, EnvelopeVerifier};
pub use store::{Annotations, DuplicatePolicy, EnvelopeStore, Provenance};
