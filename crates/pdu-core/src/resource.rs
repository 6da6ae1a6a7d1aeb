//! # Resource Descriptors
//!
//! One attached item of a body: an image, a file, or a quoted reference. A
//! descriptor is either inline (`data` carries the bytes) or remote (`data`
//! is absent and the item is fetched through `url`). `url` is present in
//! both cases and doubles as a cache key.

use serde::Serialize;

use crate::codec;
use crate::digest::resource_checksum;
use crate::error::ChecksumError;

/// `format` tag for image resources.
pub const FORMAT_IMAGE: i64 = 1;

/// One resource attached to a body.
///
/// `format` is a closed tag shared with producers; this crate preserves the
/// integer and leaves interpretation to callers. On the wire `data` is a
/// standard base64 string or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceDescriptor {
    /// Media kind tag.
    pub format: i64,
    /// Inline bytes, if the resource is embedded.
    #[serde(serialize_with = "codec::serialize_opt_base64")]
    pub data: Option<Vec<u8>>,
    /// Stable locator.
    pub url: String,
    /// Checksum string for integrity verification.
    pub cs: String,
}

impl ResourceDescriptor {
    /// An inline resource; `cs` is computed from `data`.
    pub fn inline(format: i64, data: Vec<u8>, url: impl Into<String>) -> Self {
        let cs = resource_checksum(&data);
        Self {
            format,
            data: Some(data),
            url: url.into(),
            cs,
        }
    }

    /// A resource that must be fetched through `url`.
    pub fn remote(format: i64, url: impl Into<String>, cs: impl Into<String>) -> Self {
        Self {
            format,
            data: None,
            url: url.into(),
            cs: cs.into(),
        }
    }

    /// Whether the bytes are carried inline.
    pub fn is_inline(&self) -> bool {
        self.data.is_some()
    }

    /// Check inline `data` against `cs`.
    pub fn verify_checksum(&self) -> Result<(), ChecksumError> {
        let data = self.data.as_ref().ok_or(ChecksumError::NoInlineData)?;
        verify_fetched(&self.cs, data)
    }
}

/// Check bytes fetched for a remote resource against its declared `cs`.
pub fn verify_fetched(cs: &str, data: &[u8]) -> Result<(), ChecksumError> {
    let actual = resource_checksum(data);
    if actual == cs {
        Ok(())
    } else {
        Err(ChecksumError::Mismatch {
            expected: cs.to_string(),
            actual,
        })
    }
}
