//! Reading envelopes from files or stdin.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use pdu_core::EnvelopeRecord;

/// Read transport JSON from `file`, or from stdin when `file` is `None`.
pub fn read_envelope(file: Option<&Path>) -> anyhow::Result<EnvelopeRecord> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading envelope from stdin")?;
            buf
        }
    };
    parse_envelope(&raw)
}

/// Parse transport JSON into a validated record.
pub fn parse_envelope(raw: &str) -> anyhow::Result<EnvelopeRecord> {
    serde_json::from_str(raw.trim()).context("parsing envelope JSON")
}
