//! Base64 transport encoding for remote file contents.
//!
//! The contents API wraps base64 payloads at 60 columns. Decoding strips the
//! line breaks and then requires the bytes to be valid UTF-8, so non-ASCII
//! note text survives the round trip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encodes UTF-8 text as standard, unwrapped base64.
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decodes (possibly line-wrapped) base64 into UTF-8 text.
pub fn decode_content(encoded: &str) -> Result<String, String> {
    let compact: String = encoded
        .chars()
        .filter(|ch| !matches!(ch, '\n' | '\r'))
        .collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| format!("invalid base64 content: {err}"))?;
    String::from_utf8(bytes).map_err(|err| format!("content is not valid UTF-8: {err}"))
}
