//! `data:<mime>;base64,<payload>` encoding for images kept inside the record.

use base64::{engine::general_purpose::STANDARD, Engine};

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Splits a base64 data URI into its media type and decoded bytes.
/// Returns `None` for anything that is not a well-formed base64 data URI.
pub fn decode(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}
