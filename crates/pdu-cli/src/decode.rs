//! # Decode Subcommand
//!
//! Decodes a received envelope into a JSON report: the wire identity, the
//! capsule header, and the payload typed by the capsule's kind.
//!
//! A born or profile capsule whose `d` does not have that kind's shape is
//! read as an info body instead, the way clients that only know bodies read
//! every capsule. The typed error is kept in the report's `note`.

use std::path::PathBuf;

use clap::Args;
use pdu_core::{Capsule, CapsuleKind, DecodeError, DecodedEnvelope, EnvelopeRecord};
use serde::Serialize;
use serde_json::Value;

use crate::input::read_envelope;

/// Arguments for the decode subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Envelope JSON file. Reads stdin when omitted.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// What `decode` prints.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub signature: String,
    pub refs: Vec<String>,
    pub kind: String,
    pub t: i64,
    pub v: i64,
    /// The typed payload, or the raw `d` blob for unknown kinds.
    pub payload: Value,
    /// Why the payload is a body despite the capsule's kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub fn run(args: &DecodeArgs) -> anyhow::Result<DecodeReport> {
    let record = read_envelope(args.file.as_deref())?;
    report(record)
}

pub fn report(record: EnvelopeRecord) -> anyhow::Result<DecodeReport> {
    let decoded = DecodedEnvelope::new(record);
    let capsule = decoded.capsule()?;
    let mut note = None;
    let payload = match capsule.kind() {
        CapsuleKind::Info => serde_json::to_value(decoded.body()?)?,
        CapsuleKind::Born => match capsule.born() {
            Ok(born) => serde_json::to_value(born)?,
            Err(e) => body_fallback(&decoded, &capsule, e, &mut note)?,
        },
        CapsuleKind::Profile => match capsule.profile() {
            Ok(profile) => serde_json::to_value(profile)?,
            Err(e) => body_fallback(&decoded, &capsule, e, &mut note)?,
        },
        CapsuleKind::Unknown(t) => {
            tracing::warn!(t, "unknown capsule kind; payload left encoded");
            Value::String(capsule.d.clone())
        }
    };
    let record = decoded.into_record();
    Ok(DecodeReport {
        signature: record.signature().to_string(),
        refs: record.references().to_vec(),
        kind: capsule.kind().to_string(),
        t: capsule.t,
        v: capsule.v,
        payload,
        note,
    })
}

/// Read a mis-shaped typed payload as a body. Fails with the typed error
/// when the blob is not a body either.
fn body_fallback(
    decoded: &DecodedEnvelope,
    capsule: &Capsule,
    typed: DecodeError,
    note: &mut Option<String>,
) -> anyhow::Result<Value> {
    if !matches!(
        typed,
        DecodeError::MissingField(_) | DecodeError::TypeMismatch(_)
    ) {
        return Err(typed.into());
    }
    match decoded.body() {
        Ok(body) => {
            tracing::warn!(kind = %capsule.kind(), error = %typed, "payload read as body");
            *note = Some(format!("not a {} payload ({typed}); read as body", capsule.kind()));
            Ok(serde_json::to_value(body)?)
        }
        Err(_) => Err(typed.into()),
    }
}
