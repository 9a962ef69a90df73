//! HTTP cache validation module
//!
//! Provides weak `ETag` generation and conditional request matching.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Length of the base64 digest kept in the tag
const DIGEST_LEN: usize = 27;

/// Generate a weak `ETag` from the body bytes
///
/// # Returns
/// Weak validator, e.g. `W/"1a-3Xk…"`: body length in hex, then a
/// truncated base64 SHA-256 of the body
pub fn generate_etag(content: &[u8]) -> String {
    let digest = STANDARD.encode(Sha256::digest(content));
    let digest = &digest[..DIGEST_LEN];
    format!("W/\"{:x}-{digest}\"", content.len())
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag or a comma-separated list. Each entry must equal
/// the server tag exactly; `*` is not treated as a wildcard.
///
/// # Returns
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| client_etag.split(',').any(|e| e.trim() == etag))
}
