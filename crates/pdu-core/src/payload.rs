//! # Typed Payloads for Born and Profile Capsules
//!
//! Besides info bodies, a capsule's `d` can carry the announcement of a new
//! identity (`BornPayload`) or a profile update (`ProfilePayload`). Both are
//! decoded with the same strictness as bodies: required fields must be
//! present with the right JSON type.

use serde::Serialize;

use crate::canonical::CanonicalBytes;
use crate::capsule::{Capsule, CapsuleKind};
use crate::error::{CryptoError, EncodeError, EnvelopeError};
use crate::resource::ResourceDescriptor;
use crate::signer::{EnvelopeSigner, EnvelopeVerifier};

/// Announcement of a new identity, endorsed by its parents.
///
/// Wire form: `{"addr": <string>, "sigs": [<string>...]}`. A missing or
/// `null` `sigs` decodes as an empty list.
///
/// Each entry of `sigs` is a parent's signature over the canonical form of
/// `{"addr": <addr>}`. Signatures do not name their signer, so checking one
/// takes the parent's verifier from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct BornPayload {
    /// Address of the identity being created.
    pub addr: String,
    /// Parent endorsement signatures over `addr`.
    pub sigs: Vec<String>,
}

impl BornPayload {
    /// A born payload with no endorsements yet.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            sigs: Vec::new(),
        }
    }

    /// The bytes a parent endorsement covers.
    pub fn endorsement_payload(&self) -> Result<CanonicalBytes, EnvelopeError> {
        Ok(CanonicalBytes::new(&Endorsement { addr: &self.addr })?)
    }

    /// Append `signer`'s endorsement of `addr`.
    pub fn endorse(&mut self, signer: &impl EnvelopeSigner) -> Result<(), EnvelopeError> {
        let signature = signer.sign(&self.endorsement_payload()?)?;
        tracing::debug!(addr = %self.addr, parent = %signer.address(), "endorsed born payload");
        self.sigs.push(signature);
        Ok(())
    }

    /// Check the endorsement at `index` against a parent's verifier.
    ///
    /// # Errors
    ///
    /// `CryptoError::VerificationFailed` when there is no endorsement at
    /// `index` or it was not made by `verifier`'s key.
    pub fn verify_endorsement(
        &self,
        index: usize,
        verifier: &impl EnvelopeVerifier,
    ) -> Result<(), EnvelopeError> {
        let signature = self.sigs.get(index).ok_or_else(|| {
            CryptoError::VerificationFailed(format!("no endorsement at index {index}"))
        })?;
        verifier.verify(&self.endorsement_payload()?, signature)?;
        Ok(())
    }

    /// Wrap this payload in a current-version born capsule.
    pub fn to_capsule(&self) -> Result<Capsule, EncodeError> {
        Capsule::wrap(CapsuleKind::Born, self)
    }
}

#[derive(Serialize)]
struct Endorsement<'a> {
    addr: &'a str,
}

/// A profile update for the sending identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ProfilePayload {
    pub name: String,
    pub email: String,
    pub bio: String,
    pub url: String,
    pub location: String,
    /// Avatar image; written as `null` when unset.
    pub avatar: Option<ResourceDescriptor>,
    /// Free-form extension data.
    pub extra: String,
}

impl ProfilePayload {
    /// Wrap this payload in a current-version profile capsule.
    pub fn to_capsule(&self) -> Result<Capsule, EncodeError> {
        Capsule::wrap(CapsuleKind::Profile, self)
    }
}
