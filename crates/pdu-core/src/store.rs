//! # Envelope Store
//!
//! An in-memory set of envelopes keyed by signature, plus a side table of
//! local annotations (provenance, profile) for the envelopes it holds.
//!
//! Annotations are never written into an [`EnvelopeRecord`]: they are not
//! covered by the signature, so they live beside the record under the same
//! key. Removing an envelope drops its annotations.
//!
//! What happens when a second envelope with a held signature arrives is
//! the caller's choice, fixed per store by [`DuplicatePolicy`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::envelope::EnvelopeRecord;
use crate::error::StoreError;
use crate::payload::ProfilePayload;

/// How the store treats an insert whose signature is already held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first envelope; the insert fails with `StoreError::Duplicate`.
    #[default]
    Reject,
    /// The incoming envelope replaces the held one; annotations are kept.
    Replace,
}

/// Who vouched for an envelope, recorded after local verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Address of the author.
    pub address: String,
    /// Signatures establishing the author's origin.
    pub signatures: Vec<String>,
}

/// Local-only data attached to one held envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub provenance: Option<Provenance>,
    pub profile: Option<ProfilePayload>,
}

impl Annotations {
    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.provenance.is_none() && self.profile.is_none()
    }
}

/// In-memory envelope set with an annotation side table.
#[derive(Debug, Default)]
pub struct EnvelopeStore {
    policy: DuplicatePolicy,
    envelopes: HashMap<String, EnvelopeRecord>,
    order: Vec<String>,
    annotations: HashMap<String, Annotations>,
}

impl EnvelopeStore {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Insert an envelope under its signature.
    ///
    /// Returns the replaced envelope under [`DuplicatePolicy::Replace`].
    pub fn insert(&mut self, record: EnvelopeRecord) -> Result<Option<EnvelopeRecord>, StoreError> {
        let key = record.signature().to_string();
        if self.envelopes.contains_key(&key) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    tracing::warn!(signature = %key, "rejected duplicate envelope");
                    return Err(StoreError::Duplicate(key));
                }
                DuplicatePolicy::Replace => {
                    tracing::debug!(signature = %key, "replacing envelope");
                    return Ok(self.envelopes.insert(key, record));
                }
            }
        }
        self.order.push(key.clone());
        self.envelopes.insert(key, record);
        Ok(None)
    }

    pub fn get(&self, signature: &str) -> Option<&EnvelopeRecord> {
        self.envelopes.get(signature)
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.envelopes.contains_key(signature)
    }

    /// Remove an envelope and its annotations.
    pub fn remove(&mut self, signature: &str) -> Option<EnvelopeRecord> {
        let removed = self.envelopes.remove(signature)?;
        self.order.retain(|s| s != signature);
        self.annotations.remove(signature);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Held envelopes in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EnvelopeRecord> {
        self.order.iter().filter_map(|s| self.envelopes.get(s))
    }

    /// Referenced signatures that no held envelope carries, in first-seen order.
    pub fn missing_references(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.iter()
            .flat_map(|record| record.references())
            .filter(|r| !self.envelopes.contains_key(r.as_str()))
            .filter(|r| seen.insert(r.as_str()))
            .cloned()
            .collect()
    }

    /// Mutable annotation slot for a held envelope.
    pub fn annotate(&mut self, signature: &str) -> Result<&mut Annotations, StoreError> {
        if !self.envelopes.contains_key(signature) {
            return Err(StoreError::UnknownEnvelope(signature.to_string()));
        }
        Ok(self.annotations.entry(signature.to_string()).or_default())
    }

    /// Annotations attached to a held envelope, if any.
    pub fn annotations(&self, signature: &str) -> Option<&Annotations> {
        self.annotations.get(signature).filter(|a| !a.is_empty())
    }
}
