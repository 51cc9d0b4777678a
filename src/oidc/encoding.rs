//! Base64url helpers shared by the PKCE and ID-token paths.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::{DecodeError, Engine};
use sha2::{Digest, Sha256};

/// Base64url-encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Base64url-decode a string.
///
/// Tolerates missing padding by re-padding to a multiple of four characters,
/// then translating the url-safe alphabet back before a standard decode.
pub fn base64url_decode(data: &str) -> Result<Vec<u8>, DecodeError> {
    let mut replaced = data.replace('-', "+").replace('_', "/");
    let lack = replaced.len() % 4;
    if lack > 0 {
        replaced.push_str(&"=".repeat(4 - lack));
    }
    STANDARD.decode(replaced)
}

/// Hash a value the way `at_hash` is computed: SHA-256, then the first half
/// of the digest, base64url-encoded.
pub fn generate_hash(value: &str) -> String {
    let hash = Sha256::digest(value.as_bytes());
    let half_of_hash = &hash[..hash.len() / 2];
    base64url_encode(half_of_hash)
}
