//! # Envelope Record
//!
//! The signed unit of published content: `content`, `refs`, `signature`.
//!
//! ## Security Invariant
//!
//! The three wire fields are private and have no setters. The signature
//! covers `content` and `refs`; a record whose fields could be patched after
//! signing would no longer match its signature, so a changed envelope must
//! be sealed again. Local annotations live in the store's side table, not
//! here.
//!
//! ## Identity
//!
//! `PartialEq` and `Hash` look at `signature` only. Two records with the
//! same signature but different content compare equal: they are the same
//! logical envelope as far as consumer caches are concerned.

use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::canonical::CanonicalBytes;
use crate::capsule::Capsule;
use crate::error::{DecodeError, EnvelopeError};
use crate::resource::ResourceDescriptor;
use crate::signer::{EnvelopeSigner, EnvelopeVerifier};

/// A signed envelope as carried on the wire.
///
/// Serializes as the transport object
/// `{"content": <base64>, "refs": [<string>...], "signature": <string>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WireEnvelope")]
pub struct EnvelopeRecord {
    content: String,
    #[serde(rename = "refs")]
    references: Vec<String>,
    signature: String,
}

#[derive(Deserialize)]
struct WireEnvelope {
    content: String,
    refs: Vec<String>,
    signature: String,
}

impl TryFrom<WireEnvelope> for EnvelopeRecord {
    type Error = EnvelopeError;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        Self::new(wire.content, wire.refs, wire.signature)
    }
}

impl EnvelopeRecord {
    /// Assemble a record from received wire fields.
    ///
    /// # Errors
    ///
    /// `EnvelopeError::EmptyField` if `content` or `signature` is empty.
    pub fn new(
        content: impl Into<String>,
        references: Vec<String>,
        signature: impl Into<String>,
    ) -> Result<Self, EnvelopeError> {
        let content = content.into();
        let signature = signature.into();
        if content.is_empty() {
            return Err(EnvelopeError::EmptyField("content"));
        }
        if signature.is_empty() {
            return Err(EnvelopeError::EmptyField("signature"));
        }
        Ok(Self {
            content,
            references,
            signature,
        })
    }

    /// Sign `capsule` together with `references` and build the record.
    pub fn seal(
        capsule: &Capsule,
        references: Vec<String>,
        signer: &impl EnvelopeSigner,
    ) -> Result<Self, EnvelopeError> {
        let content = capsule.encode()?;
        let payload = CanonicalBytes::signing_payload(&content, &references)?;
        let signature = signer.sign(&payload)?;
        tracing::debug!(
            signer = %signer.address(),
            refs = references.len(),
            "sealed envelope"
        );
        Self::new(content, references, signature)
    }

    /// Seal an info body.
    pub fn seal_body(
        body: &Body,
        references: Vec<String>,
        signer: &impl EnvelopeSigner,
    ) -> Result<Self, EnvelopeError> {
        Self::seal(&body.to_capsule()?, references, signer)
    }

    /// The base64 content blob.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Signatures of referenced envelopes, in order.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// The signature, which is also this record's identity.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The bytes the signature covers.
    pub fn signing_payload(&self) -> Result<CanonicalBytes, EnvelopeError> {
        Ok(CanonicalBytes::signing_payload(
            &self.content,
            &self.references,
        )?)
    }

    /// Check the signature against `verifier`.
    pub fn verify(&self, verifier: &impl EnvelopeVerifier) -> Result<(), EnvelopeError> {
        let payload = self.signing_payload()?;
        verifier.verify(&payload, &self.signature).map_err(|e| {
            tracing::warn!(signature = %self.signature, error = %e, "envelope verification failed");
            EnvelopeError::from(e)
        })
    }

    /// Decode the first payload layer.
    pub fn capsule(&self) -> Result<Capsule, DecodeError> {
        Capsule::decode(&self.content)
    }

    /// Decode both layers down to the body.
    pub fn body(&self) -> Result<Body, DecodeError> {
        self.capsule()?.body()
    }

    /// Decode both layers and return the resource list.
    pub fn resources(&self) -> Result<Vec<ResourceDescriptor>, DecodeError> {
        Ok(self.body()?.resources)
    }
}

impl PartialEq for EnvelopeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for EnvelopeRecord {}

impl Hash for EnvelopeRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}

/// An envelope with compute-once caches for its decoded layers.
///
/// A cache is filled by computing first and publishing second; threads that
/// race on first access each decode and the losers' results are dropped.
/// Nobody waits on another thread's decode. Failed decodes are not cached.
#[derive(Debug)]
pub struct DecodedEnvelope {
    record: EnvelopeRecord,
    capsule: OnceLock<Capsule>,
    body: OnceLock<Body>,
}

impl DecodedEnvelope {
    pub fn new(record: EnvelopeRecord) -> Self {
        Self {
            record,
            capsule: OnceLock::new(),
            body: OnceLock::new(),
        }
    }

    pub fn record(&self) -> &EnvelopeRecord {
        &self.record
    }

    pub fn into_record(self) -> EnvelopeRecord {
        self.record
    }

    pub fn capsule(&self) -> Result<Capsule, DecodeError> {
        if let Some(capsule) = self.capsule.get() {
            return Ok(capsule.clone());
        }
        let capsule = self.record.capsule()?;
        let _ = self.capsule.set(capsule.clone());
        Ok(capsule)
    }

    pub fn body(&self) -> Result<Body, DecodeError> {
        if let Some(body) = self.body.get() {
            return Ok(body.clone());
        }
        let body = self.capsule()?.body()?;
        let _ = self.body.set(body.clone());
        Ok(body)
    }

    pub fn resources(&self) -> Result<Vec<ResourceDescriptor>, DecodeError> {
        Ok(self.body()?.resources)
    }
}

impl From<EnvelopeRecord> for DecodedEnvelope {
    fn from(record: EnvelopeRecord) -> Self {
        Self::new(record)
    }
}
