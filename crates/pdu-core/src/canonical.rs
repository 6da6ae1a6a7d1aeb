//! # Canonical Signing Bytes
//!
//! `CanonicalBytes` is the only input accepted by envelope signers and
//! verifiers. Producing it always runs the same pipeline, so a signature
//! computed by one implementation can be checked by any other.
//!
//! ## Rules
//!
//! 1. Floats are rejected. Numbers in signed material are integers.
//! 2. Object keys are sorted and separators are compact (RFC 8785, JCS).
//! 3. Strings pass through as UTF-8 without ASCII escaping.
//!
//! The signing payload of an envelope is the canonical form of
//! `{"content": <content>, "refs": [<refs>...]}`, see
//! [`CanonicalBytes::signing_payload`].

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new`] and
///   [`CanonicalBytes::signing_payload`].
/// - The bytes contain no float numbers.
/// - Object keys are sorted with compact separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

#[derive(Serialize)]
struct SigningPayload<'a> {
    content: &'a str,
    refs: &'a [String],
}

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// float, or `SerializationFailed` if JSON serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// The bytes an envelope signature covers: its content and its references.
    pub fn signing_payload(
        content: &str,
        refs: &[String],
    ) -> Result<Self, CanonicalizationError> {
        Self::new(&SigningPayload { content, refs })
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}
