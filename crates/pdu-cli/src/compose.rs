//! # Compose Subcommand
//!
//! Builds an info body from flags, seals it with the given private key, and
//! returns the transport envelope.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use pdu_core::{Body, EnvelopeRecord, ResourceDescriptor, FORMAT_IMAGE};
use pdu_crypto::Ed25519KeyPair;

/// Arguments for the compose subcommand.
#[derive(Args, Debug, Default)]
pub struct ComposeArgs {
    /// Private key as 64 hex chars.
    #[arg(long)]
    pub key: String,

    /// Message text.
    #[arg(long, default_value = "")]
    pub text: String,

    /// Signature of a quoted envelope.
    #[arg(long)]
    pub quote: Option<String>,

    /// Signature of a referenced envelope. Repeatable; order is kept.
    #[arg(long = "ref")]
    pub refs: Vec<String>,

    /// Remote image as `<url>,<cs>`. Repeatable.
    #[arg(long = "remote")]
    pub remote: Vec<String>,

    /// Inline image as `<path>=<url>`; the file is embedded. Repeatable.
    #[arg(long = "inline")]
    pub inline: Vec<String>,

    /// Resource format tag used for `--remote` and `--inline`.
    #[arg(long, default_value_t = FORMAT_IMAGE)]
    pub format: i64,
}

/// `<url>,<cs>`, split at the last comma; base64 checksums never contain one.
fn parse_remote(value: &str) -> anyhow::Result<(&str, &str)> {
    match value.rsplit_once(',') {
        Some((url, cs)) if !url.is_empty() && !cs.is_empty() => Ok((url, cs)),
        _ => bail!("--remote expects <url>,<cs>, got {value:?}"),
    }
}

/// `<path>=<url>`, split at the first `=`; the URL may carry a query string.
fn parse_inline(value: &str) -> anyhow::Result<(&str, &str)> {
    match value.split_once('=') {
        Some((path, url)) if !path.is_empty() && !url.is_empty() => Ok((path, url)),
        _ => bail!("--inline expects <path>=<url>, got {value:?}"),
    }
}

/// Assemble the body described by `args`. Remote resources come first,
/// then inline ones, each group in flag order.
pub fn build_body(args: &ComposeArgs) -> anyhow::Result<Body> {
    let mut body = Body::new(args.text.clone());
    body.quote = args.quote.clone();
    for value in &args.remote {
        let (url, cs) = parse_remote(value)?;
        body = body.with_resource(ResourceDescriptor::remote(args.format, url, cs));
    }
    for value in &args.inline {
        let (path, url) = parse_inline(value)?;
        let path = PathBuf::from(path);
        let data = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        body = body.with_resource(ResourceDescriptor::inline(args.format, data, url));
    }
    Ok(body)
}

pub fn run(args: &ComposeArgs) -> anyhow::Result<EnvelopeRecord> {
    let signer = Ed25519KeyPair::from_hex(&args.key).context("loading private key")?;
    let body = build_body(args)?;
    let record = EnvelopeRecord::seal_body(&body, args.refs.clone(), &signer)
        .context("sealing envelope")?;
    tracing::info!(signature = %record.signature(), "composed envelope");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "689ac13dc3f424c8d5a6ef07a2e443311fc40ae4c370dac127bf5c1267e1ac98";

    #[test]
    fn test_compose_seals_body() {
        let args = ComposeArgs {
            key: KEY.into(),
            text: "Hello World!!".into(),
            quote: Some("q".into()),
            refs: vec!["r1".into(), "r2".into()],
            remote: vec!["http://x/img.png,D0Y2x49l02OezloGS1rnU+NAhhShT7GKtNdUDSwkhUM=".into()],
            format: FORMAT_IMAGE,
            ..ComposeArgs::default()
        };
        let record = run(&args).unwrap();
        assert_eq!(record.references(), ["r1", "r2"]);
        let body = record.body().unwrap();
        assert_eq!(body.text, "Hello World!!");
        assert_eq!(body.quote.as_deref(), Some("q"));
        assert_eq!(body.resources[0].url, "http://x/img.png");
        assert_eq!(body.resources[0].cs, "D0Y2x49l02OezloGS1rnU+NAhhShT7GKtNdUDSwkhUM=");
        let kp = Ed25519KeyPair::from_hex(KEY).unwrap();
        record.verify(&kp.public_key()).unwrap();
    }

    #[test]
    fn test_parse_flag_pairs() {
        assert_eq!(
            parse_remote("http://x/?a=1,b=2,abc=").unwrap(),
            ("http://x/?a=1,b=2", "abc=")
        );
        assert!(parse_remote("no-separator").is_err());
        assert!(parse_remote("trailing,").is_err());
        assert_eq!(
            parse_inline("a.png=http://x/a.png?v=2").unwrap(),
            ("a.png", "http://x/a.png?v=2")
        );
        assert!(parse_inline("=http://x").is_err());
    }

    #[test]
    fn test_inline_missing_file() {
        let args = ComposeArgs {
            key: KEY.into(),
            inline: vec!["/definitely/not/here.png=http://x/a.png".into()],
            ..ComposeArgs::default()
        };
        assert!(build_body(&args).is_err());
    }

    #[test]
    fn test_bad_key_is_reported() {
        let err = run(&ComposeArgs {
            key: "nope".into(),
            ..ComposeArgs::default()
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("loading private key"));
    }
}
