//! # Capsule — First Payload Layer
//!
//! The capsule is what an envelope's `content` decodes to: a kind tag `t`,
//! a version tag `v`, and an opaque base64 blob `d` holding the second
//! layer. Decoding a capsule never interprets `t` or `v`, so capsules of
//! kinds this crate does not know about still decode and re-encode intact.

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::codec;
use crate::error::{DecodeError, EncodeError};
use crate::payload::{BornPayload, ProfilePayload};

/// Version tag written by this crate's encoders.
pub const CAPSULE_VERSION: i64 = 1;

/// The meaning of a capsule's `t` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapsuleKind {
    /// `t = 0`: a text message with resources; `d` holds a [`Body`].
    Info,
    /// `t = 1`: announces a new identity; `d` holds a [`BornPayload`].
    Born,
    /// `t = 2`: updates an identity's profile; `d` holds a [`ProfilePayload`].
    Profile,
    /// Any other tag, preserved verbatim.
    Unknown(i64),
}

impl CapsuleKind {
    /// Map a wire tag to a kind.
    pub fn from_tag(t: i64) -> Self {
        match t {
            0 => Self::Info,
            1 => Self::Born,
            2 => Self::Profile,
            other => Self::Unknown(other),
        }
    }

    /// The wire tag for this kind.
    pub fn tag(&self) -> i64 {
        match self {
            Self::Info => 0,
            Self::Born => 1,
            Self::Profile => 2,
            Self::Unknown(t) => *t,
        }
    }
}

impl std::fmt::Display for CapsuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Born => f.write_str("born"),
            Self::Profile => f.write_str("profile"),
            Self::Unknown(t) => write!(f, "unknown({t})"),
        }
    }
}

/// The first decoded layer of an envelope's content.
///
/// Field order is the wire order used by [`Capsule::encode`]: `t`, `v`, `d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capsule {
    /// Kind tag.
    pub t: i64,
    /// Version tag.
    pub v: i64,
    /// Base64 blob holding the second layer.
    pub d: String,
}

impl Capsule {
    /// Build a current-version capsule around an already encoded inner blob.
    pub fn new(kind: CapsuleKind, d: impl Into<String>) -> Self {
        Self {
            t: kind.tag(),
            v: CAPSULE_VERSION,
            d: d.into(),
        }
    }

    /// Serialize `payload` as the inner layer and wrap it.
    pub fn wrap(kind: CapsuleKind, payload: &impl Serialize) -> Result<Self, EncodeError> {
        Ok(Self::new(kind, codec::encode_layer(payload)?))
    }

    /// Decode a capsule from an envelope's `content`.
    pub fn decode(content: &str) -> Result<Self, DecodeError> {
        codec::decode_capsule(content)
    }

    /// Encode this capsule into an envelope `content` string.
    pub fn encode(&self) -> Result<String, EncodeError> {
        codec::encode_layer(self)
    }

    /// The kind named by `t`.
    pub fn kind(&self) -> CapsuleKind {
        CapsuleKind::from_tag(self.t)
    }

    /// Decode `d` as a [`Body`], whatever the kind tag says.
    pub fn body(&self) -> Result<Body, DecodeError> {
        codec::decode_body(&self.d)
    }

    /// Decode `d` as a [`BornPayload`]. Fails unless this is a born capsule.
    pub fn born(&self) -> Result<BornPayload, DecodeError> {
        self.expect_kind(CapsuleKind::Born)?;
        codec::decode_born(&self.d)
    }

    /// Decode `d` as a [`ProfilePayload`]. Fails unless this is a profile capsule.
    pub fn profile(&self) -> Result<ProfilePayload, DecodeError> {
        self.expect_kind(CapsuleKind::Profile)?;
        codec::decode_profile(&self.d)
    }

    fn expect_kind(&self, expected: CapsuleKind) -> Result<(), DecodeError> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(DecodeError::WrongKind {
                expected,
                found: self.t,
            })
        }
    }
}
