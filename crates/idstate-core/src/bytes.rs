//! Fixed-width hex helpers.

use crate::error::HexError;

/// Decode a hex string (optionally `0x`-prefixed) into exactly `N` bytes.
pub fn decode_hex_array<const N: usize>(input: &str) -> Result<[u8; N], HexError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(trimmed).map_err(|e| HexError::Invalid(e.to_string()))?;
    if bytes.len() != N {
        return Err(HexError::WrongLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// First eight hex chars of a byte string, for `Debug` output.
pub fn hex_prefix(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}
