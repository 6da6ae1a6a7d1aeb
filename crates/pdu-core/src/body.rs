//! # Body — Second Payload Layer
//!
//! What an info capsule's `d` decodes to: message text, an optional quoted
//! envelope, and the ordered resource list. Resource order is the display
//! and attachment order and is preserved through every transform.

use serde::Serialize;

use crate::capsule::{Capsule, CapsuleKind};
use crate::codec;
use crate::error::{DecodeError, EncodeError};
use crate::resource::ResourceDescriptor;

/// Decoded message body.
///
/// Serializes with the fixed key order `text`, `quote`, `resources`; a
/// `None` quote is written as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Body {
    /// Message text; may be empty.
    pub text: String,
    /// Signature of a quoted envelope.
    pub quote: Option<String>,
    /// Attached resources in display order.
    pub resources: Vec<ResourceDescriptor>,
}

impl Body {
    /// A body with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quote: None,
            resources: Vec::new(),
        }
    }

    /// Set the quoted envelope.
    pub fn with_quote(mut self, signature: impl Into<String>) -> Self {
        self.quote = Some(signature.into());
        self
    }

    /// Append a resource.
    pub fn with_resource(mut self, resource: ResourceDescriptor) -> Self {
        self.resources.push(resource);
        self
    }

    /// Decode a body from a capsule's `d` blob.
    pub fn decode(d: &str) -> Result<Self, DecodeError> {
        codec::decode_body(d)
    }

    /// Encode this body into a capsule `d` blob.
    pub fn encode(&self) -> Result<String, EncodeError> {
        codec::encode_layer(self)
    }

    /// Wrap this body in a current-version info capsule.
    pub fn to_capsule(&self) -> Result<Capsule, EncodeError> {
        Capsule::wrap(CapsuleKind::Info, self)
    }
}
