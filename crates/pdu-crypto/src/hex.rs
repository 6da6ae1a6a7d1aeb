//! Hex helpers for key and signature wire forms.

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn hex_prefix(bytes: &[u8]) -> String {
    to_hex(&bytes[..bytes.len().min(4)])
}

/// Parse exactly `N` bytes of hex. Surrounding whitespace and an optional
/// `0x` prefix are accepted; case is ignored.
pub(crate) fn hex_to_array<const N: usize>(hex: &str) -> Result<[u8; N], String> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() != N * 2 {
        return Err(format!("expected {} hex chars, got {}", N * 2, hex.len()));
    }
    if let Some(pos) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(format!("invalid hex digit at position {pos}"));
    }
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        let pair = &hex[i * 2..i * 2 + 2];
        *byte = u8::from_str_radix(pair, 16).map_err(|e| format!("invalid hex: {e}"))?;
    }
    Ok(out)
}
