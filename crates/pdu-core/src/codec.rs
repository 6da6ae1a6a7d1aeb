//! # Layered Payload Codec
//!
//! An envelope's `content` is two nested base64 → JSON layers:
//!
//! ```text
//! content (base64) ──▶ { "t": <int>, "v": <int>, "d": <base64> }          Capsule
//! d       (base64) ──▶ { "text": <string>, "quote": <string|null>,         Body
//!                        "resources": [ { "format": <int>,
//!                                         "data": <base64|null>,
//!                                         "url": <string>,
//!                                         "cs": <string> }, ... ] }
//! ```
//!
//! Decoding walks a `serde_json::Value` by hand instead of deriving
//! `Deserialize`, so that an absent key and a wrongly typed key surface as
//! distinct errors, and so that a failing resource entry reports its index.
//!
//! ## Security Invariant
//!
//! Content may come from an untrusted peer. Every function here is total:
//! malformed input yields a `DecodeError`, never a panic, and never a
//! partially decoded body.
//!
//! Encoding goes through `serde` derives whose field order is the fixed
//! wire order. Base64 is the standard alphabet with padding in both
//! directions. Decoding accepts non-zero trailing bits in the final symbol
//! (`"AB=="` is `[0x00]`), as other PDU implementations do; encoding always
//! writes them as zero.

use base64::{
    alphabet,
    engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
    Engine as _,
};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::body::Body;
use crate::capsule::{Capsule, CapsuleKind};
use crate::error::{DecodeError, EncodeError, Stage};
use crate::payload::{BornPayload, ProfilePayload};
use crate::resource::ResourceDescriptor;

type Object = Map<String, Value>;

/// Standard padded alphabet, lenient about trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Stage 1: decode an envelope's `content` into a [`Capsule`].
pub fn decode_capsule(content: &str) -> Result<Capsule, DecodeError> {
    let obj = decode_object(content, Stage::Content)?;
    let capsule = Capsule {
        t: int_field(&obj, "t")?,
        v: int_field(&obj, "v")?,
        d: str_field(&obj, "d")?,
    };
    tracing::debug!(t = capsule.t, v = capsule.v, "decoded capsule");
    Ok(capsule)
}

/// Stage 2: decode a capsule's `d` blob into a [`Body`].
///
/// Any resource entry that fails to decode fails the whole body with
/// [`DecodeError::ResourceDecode`].
pub fn decode_body(d: &str) -> Result<Body, DecodeError> {
    let obj = decode_object(d, Stage::CapsuleData)?;
    let text = str_field(&obj, "text")?;
    let quote = opt_str_field(&obj, "quote")?;
    let resources = array_field(&obj, "resources")?
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            decode_resource(entry, "resources").map_err(|cause| DecodeError::ResourceDecode {
                index,
                cause: Box::new(cause),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(resources = resources.len(), "decoded body");
    Ok(Body {
        text,
        quote,
        resources,
    })
}

/// Decode a born capsule's `d` blob.
pub fn decode_born(d: &str) -> Result<BornPayload, DecodeError> {
    let obj = decode_object(d, Stage::CapsuleData)?;
    let addr = str_field(&obj, "addr")?;
    let sigs = match obj.get("sigs") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or(DecodeError::TypeMismatch("sigs"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(DecodeError::TypeMismatch("sigs")),
    };
    Ok(BornPayload { addr, sigs })
}

/// Decode a profile capsule's `d` blob.
pub fn decode_profile(d: &str) -> Result<ProfilePayload, DecodeError> {
    let obj = decode_object(d, Stage::CapsuleData)?;
    let avatar = match obj.get("avatar") {
        None | Some(Value::Null) => None,
        Some(entry) => Some(decode_resource(entry, "avatar")?),
    };
    Ok(ProfilePayload {
        name: str_field(&obj, "name")?,
        email: str_field(&obj, "email")?,
        bio: str_field(&obj, "bio")?,
        url: str_field(&obj, "url")?,
        location: str_field(&obj, "location")?,
        avatar,
        extra: str_field(&obj, "extra")?,
    })
}

/// Decode one resource object. `field` names the containing key for the
/// error raised when the entry is not an object.
fn decode_resource(entry: &Value, field: &'static str) -> Result<ResourceDescriptor, DecodeError> {
    let obj = entry.as_object().ok_or(DecodeError::TypeMismatch(field))?;
    let format = int_field(obj, "format")?;
    let data = match obj.get("data") {
        None | Some(Value::Null) => None,
        Some(Value::String(encoded)) => Some(decode_base64(encoded, Stage::ResourceData)?),
        Some(_) => return Err(DecodeError::TypeMismatch("data")),
    };
    Ok(ResourceDescriptor {
        format,
        data,
        url: str_field(obj, "url")?,
        cs: str_field(obj, "cs")?,
    })
}

fn decode_base64(input: &str, stage: Stage) -> Result<Vec<u8>, DecodeError> {
    LENIENT
        .decode(input)
        .map_err(|_| DecodeError::InvalidBase64 { stage })
}

fn decode_object(input: &str, stage: Stage) -> Result<Object, DecodeError> {
    let bytes = decode_base64(input, stage)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(obj)) => Ok(obj),
        _ => Err(DecodeError::InvalidJson { stage }),
    }
}

fn required<'a>(obj: &'a Object, name: &'static str) -> Result<&'a Value, DecodeError> {
    obj.get(name).ok_or(DecodeError::MissingField(name))
}

/// JSON integers only; `1.0` is a type mismatch.
fn int_field(obj: &Object, name: &'static str) -> Result<i64, DecodeError> {
    required(obj, name)?
        .as_i64()
        .ok_or(DecodeError::TypeMismatch(name))
}

fn str_field(obj: &Object, name: &'static str) -> Result<String, DecodeError> {
    required(obj, name)?
        .as_str()
        .map(str::to_owned)
        .ok_or(DecodeError::TypeMismatch(name))
}

fn opt_str_field(obj: &Object, name: &'static str) -> Result<Option<String>, DecodeError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::TypeMismatch(name)),
    }
}

fn array_field<'a>(obj: &'a Object, name: &'static str) -> Result<&'a Vec<Value>, DecodeError> {
    required(obj, name)?
        .as_array()
        .ok_or(DecodeError::TypeMismatch(name))
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize a layer to JSON and base64-encode it.
pub fn encode_layer(payload: &impl Serialize) -> Result<String, EncodeError> {
    let json = serde_json::to_vec(payload)?;
    Ok(STANDARD.encode(json))
}

/// Encode a capsule into envelope `content`.
pub fn encode_capsule(capsule: &Capsule) -> Result<String, EncodeError> {
    encode_layer(capsule)
}

/// Encode a body into a capsule `d` blob.
pub fn encode_body(body: &Body) -> Result<String, EncodeError> {
    encode_layer(body)
}

/// Build envelope `content` for `payload` in a current-version capsule of
/// the given kind.
pub fn encode_content(kind: CapsuleKind, payload: &impl Serialize) -> Result<String, EncodeError> {
    Capsule::wrap(kind, payload)?.encode()
}

pub(crate) fn serialize_opt_base64<S: Serializer>(
    data: &Option<Vec<u8>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match data {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::FORMAT_IMAGE;
    use serde_json::json;

    fn b64(value: &Value) -> String {
        STANDARD.encode(serde_json::to_vec(value).unwrap())
    }

    fn content_with_body(body: &Value) -> String {
        b64(&json!({"t": 1, "v": 1, "d": b64(body)}))
    }

    #[test]
    fn test_decode_hi_example() {
        let content = content_with_body(&json!({"text": "hi", "quote": null, "resources": []}));
        let capsule = decode_capsule(&content).unwrap();
        assert_eq!((capsule.t, capsule.v), (1, 1));
        let body = decode_body(&capsule.d).unwrap();
        assert_eq!(body, Body::new("hi"));
    }

    #[test]
    fn test_invalid_outer_base64() {
        assert_eq!(
            decode_capsule("not!base64").unwrap_err(),
            DecodeError::InvalidBase64 {
                stage: Stage::Content
            }
        );
    }

    #[test]
    fn test_outer_not_json_object() {
        let content = STANDARD.encode(b"[1,2,3]");
        assert_eq!(
            decode_capsule(&content).unwrap_err(),
            DecodeError::InvalidJson {
                stage: Stage::Content
            }
        );
        let garbage = STANDARD.encode(b"{not json");
        assert!(matches!(
            decode_capsule(&garbage),
            Err(DecodeError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_capsule_missing_and_mistyped_fields() {
        let missing_t = b64(&json!({"v": 1, "d": "e30="}));
        assert_eq!(
            decode_capsule(&missing_t).unwrap_err(),
            DecodeError::MissingField("t")
        );
        let string_v = b64(&json!({"t": 0, "v": "1", "d": "e30="}));
        assert_eq!(
            decode_capsule(&string_v).unwrap_err(),
            DecodeError::TypeMismatch("v")
        );
        let float_t = b64(&json!({"t": 1.0, "v": 1, "d": "e30="}));
        assert_eq!(
            decode_capsule(&float_t).unwrap_err(),
            DecodeError::TypeMismatch("t")
        );
        let numeric_d = b64(&json!({"t": 0, "v": 1, "d": 5}));
        assert_eq!(
            decode_capsule(&numeric_d).unwrap_err(),
            DecodeError::TypeMismatch("d")
        );
    }

    #[test]
    fn test_inner_base64_failure_is_scoped_to_capsule_data() {
        assert_eq!(
            decode_body("%%%").unwrap_err(),
            DecodeError::InvalidBase64 {
                stage: Stage::CapsuleData
            }
        );
    }

    #[test]
    fn test_quote_absent_and_null_both_none() {
        let absent = decode_body(&b64(&json!({"text": "", "resources": []}))).unwrap();
        let null = decode_body(&b64(&json!({"text": "", "quote": null, "resources": []}))).unwrap();
        assert_eq!(absent.quote, None);
        assert_eq!(null.quote, None);
        let set = decode_body(&b64(&json!({"text": "", "quote": "", "resources": []}))).unwrap();
        assert_eq!(set.quote, Some(String::new()));
    }

    #[test]
    fn test_body_requires_text_and_resources() {
        assert_eq!(
            decode_body(&b64(&json!({"resources": []}))).unwrap_err(),
            DecodeError::MissingField("text")
        );
        assert_eq!(
            decode_body(&b64(&json!({"text": "x"}))).unwrap_err(),
            DecodeError::MissingField("resources")
        );
        assert_eq!(
            decode_body(&b64(&json!({"text": "x", "resources": {}}))).unwrap_err(),
            DecodeError::TypeMismatch("resources")
        );
        assert_eq!(
            decode_body(&b64(&json!({"text": "x", "quote": 3, "resources": []}))).unwrap_err(),
            DecodeError::TypeMismatch("quote")
        );
    }

    #[test]
    fn test_resource_null_data() {
        let body = decode_body(&b64(&json!({
            "text": "",
            "resources": [
                {"format": 1, "data": null, "url": "http://x/img.png", "cs": "abc123"}
            ]
        })))
        .unwrap();
        assert_eq!(
            body.resources,
            vec![ResourceDescriptor::remote(FORMAT_IMAGE, "http://x/img.png", "abc123")]
        );
    }

    #[test]
    fn test_resource_absent_data_is_none() {
        let body = decode_body(&b64(&json!({
            "text": "",
            "resources": [{"format": 1, "url": "http://x/img.png", "cs": "abc123"}]
        })))
        .unwrap();
        assert_eq!(body.resources[0].data, None);
        assert!(!body.resources[0].is_inline());
    }

    #[test]
    fn test_resource_data_mistyped() {
        let err = decode_body(&b64(&json!({
            "text": "",
            "resources": [{"format": 1, "data": 7, "url": "u", "cs": "c"}]
        })))
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::ResourceDecode {
                index: 0,
                cause: Box::new(DecodeError::TypeMismatch("data")),
            }
        );
    }

    #[test]
    fn test_trailing_bits_accepted() {
        let body = decode_body(&b64(&json!({
            "text": "",
            "resources": [{"format": 1, "data": "AB==", "url": "u", "cs": "c"}]
        })))
        .unwrap();
        assert_eq!(body.resources[0].data, Some(vec![0x00]));
        // Re-encoding normalizes the trailing bits.
        let json = serde_json::to_value(&body.resources[0]).unwrap();
        assert_eq!(json["data"], "AA==");
    }

    #[test]
    fn test_missing_padding_still_rejected() {
        let err = decode_body(&b64(&json!({
            "text": "",
            "resources": [{"format": 1, "data": "AA", "url": "u", "cs": "c"}]
        })))
        .unwrap_err();
        assert!(matches!(err, DecodeError::ResourceDecode { index: 0, .. }));
    }

    #[test]
    fn test_resource_inline_data() {
        let body = decode_body(&b64(&json!({
            "text": "",
            "resources": [{"format": 2, "data": "AAEC", "url": "u", "cs": "c"}]
        })))
        .unwrap();
        assert_eq!(body.resources[0].data, Some(vec![0, 1, 2]));
        assert_eq!(body.resources[0].format, 2);
    }

    #[test]
    fn test_resource_missing_url_fails_whole_body() {
        let err = decode_body(&b64(&json!({
            "text": "",
            "resources": [
                {"format": 1, "data": null, "url": "a", "cs": "1"},
                {"format": 1, "data": null, "cs": "2"},
                {"format": 1, "data": null, "url": "c", "cs": "3"}
            ]
        })))
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::ResourceDecode {
                index: 1,
                cause: Box::new(DecodeError::MissingField("url")),
            }
        );
    }

    #[test]
    fn test_resource_bad_data_base64_is_scoped() {
        let err = decode_body(&b64(&json!({
            "text": "",
            "resources": [{"format": 1, "data": "!!", "url": "u", "cs": "c"}]
        })))
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::ResourceDecode {
                index: 0,
                cause: Box::new(DecodeError::InvalidBase64 {
                    stage: Stage::ResourceData
                }),
            }
        );
    }

    #[test]
    fn test_resource_entry_not_object() {
        let err = decode_body(&b64(&json!({"text": "", "resources": ["x"]}))).unwrap_err();
        assert!(matches!(err, DecodeError::ResourceDecode { index: 0, .. }));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let content = b64(&json!({"t": 0, "v": 2, "d": "e30=", "extra": true}));
        assert_eq!(decode_capsule(&content).unwrap().v, 2);
    }

    #[test]
    fn test_decode_is_idempotent() {
        let body = Body::new("again")
            .with_resource(ResourceDescriptor::inline(FORMAT_IMAGE, vec![9; 16], "u"));
        let content = encode_content(CapsuleKind::Info, &body).unwrap();
        let first = decode_body(&decode_capsule(&content).unwrap().d).unwrap();
        let second = decode_body(&decode_capsule(&content).unwrap().d).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, body);
    }

    #[test]
    fn test_encode_body_wire_bytes() {
        let d = encode_body(&Body::new("hi")).unwrap();
        let json = STANDARD.decode(d).unwrap();
        assert_eq!(json, br#"{"text":"hi","quote":null,"resources":[]}"#);
    }

    #[test]
    fn test_born_decoding() {
        let born = decode_born(&b64(&json!({"addr": "0xabc"}))).unwrap();
        assert_eq!(born, BornPayload::new("0xabc"));
        let with_sigs = decode_born(&b64(&json!({"addr": "0xabc", "sigs": ["s1", "s2"]}))).unwrap();
        assert_eq!(with_sigs.sigs, ["s1", "s2"]);
        assert_eq!(
            decode_born(&b64(&json!({"addr": "0xabc", "sigs": [1]}))).unwrap_err(),
            DecodeError::TypeMismatch("sigs")
        );
        assert_eq!(
            decode_born(&b64(&json!({"sigs": []}))).unwrap_err(),
            DecodeError::MissingField("addr")
        );
    }

    #[test]
    fn test_profile_requires_fields() {
        let err = decode_profile(&b64(&json!({"name": "n"}))).unwrap_err();
        assert_eq!(err, DecodeError::MissingField("email"));
        let bad_avatar = decode_profile(&b64(&json!({
            "name": "", "email": "", "bio": "", "url": "", "location": "", "extra": "",
            "avatar": "not an object"
        })))
        .unwrap_err();
        assert_eq!(bad_avatar, DecodeError::TypeMismatch("avatar"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn resource() -> impl Strategy<Value = ResourceDescriptor> {
        (
            any::<i64>(),
            proptest::option::of(prop::collection::vec(any::<u8>(), 0..64)),
            ".{0,40}",
            "[A-Za-z0-9+/=]{0,44}",
        )
            .prop_map(|(format, data, url, cs)| ResourceDescriptor {
                format,
                data,
                url,
                cs,
            })
    }

    fn body() -> impl Strategy<Value = Body> {
        (
            ".{0,80}",
            proptest::option::of(".{0,40}"),
            prop::collection::vec(resource(), 0..6),
        )
            .prop_map(|(text, quote, resources)| Body {
                text,
                quote,
                resources,
            })
    }

    proptest! {
        /// Every body survives encode → decode unchanged, resource order included.
        #[test]
        fn body_roundtrip(b in body()) {
            let decoded = decode_body(&encode_body(&b).unwrap()).unwrap();
            prop_assert_eq!(decoded, b);
        }

        /// Every capsule survives encode → decode unchanged.
        #[test]
        fn capsule_roundtrip(t in any::<i64>(), v in any::<i64>(), d in ".{0,60}") {
            let c = Capsule { t, v, d };
            let decoded = decode_capsule(&encode_capsule(&c).unwrap()).unwrap();
            prop_assert_eq!(decoded, c);
        }

        /// Arbitrary input never panics the decoder.
        #[test]
        fn decode_never_panics(s in ".{0,200}") {
            let _ = decode_capsule(&s);
            let _ = decode_body(&s);
            let _ = decode_born(&s);
            let _ = decode_profile(&s);
        }

        /// Arbitrary base64-wrapped bytes never panic the decoder either.
        #[test]
        fn decode_never_panics_on_valid_base64(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
            let encoded = STANDARD.encode(&bytes);
            let _ = decode_capsule(&encoded);
            let _ = decode_body(&encoded);
        }
    }
}
