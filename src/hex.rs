//! Uppercase hex rendering of keys
//!
//! Keys are binary, so logs and the CLI show them as hex.

use crate::error::{OrdKvError, Result};

/// Render bytes as uppercase hex, two characters per byte
pub fn encode(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}

/// Parse hex (either case) back into bytes
pub fn decode(text: &str) -> Result<Vec<u8>> {
    ::hex::decode(text.trim())
        .map_err(|e| OrdKvError::invalid(format!("bad hex {:?}: {}", text, e)))
}
