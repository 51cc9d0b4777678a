//! ID token verification.
//!
//! The checks run in a fixed order and the first failure wins, so the
//! reported reason is deterministic even when several claims are wrong at
//! once: structure, key resolution, signature, iss, aud, nonce, at_hash,
//! exp, iat.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey};

use super::claims::IdTokenClaims;
use super::encoding::{base64url_decode, generate_hash};
use super::keys::PublicKeySet;

/// Maximum accepted age of the `iat` claim, in seconds.
const MAX_ISSUED_AT_AGE_SECS: i64 = 600;

/// Reason an ID token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// The compact serialization or one of its segments did not parse.
    Malformed,
    /// No usable public key for the token's key ID.
    PublicKeyResource,
    /// The RSA-SHA256 signature did not match.
    Signature,
    /// The `iss` claim did not match the provider's issuer.
    Issuer,
    /// The first `aud` entry did not match the client ID.
    Audience,
    /// The `nonce` claim did not match the stored nonce.
    Nonce,
    /// The `at_hash` claim did not match the access token.
    AccessTokenHash,
    /// The `exp` claim is in the past.
    Expired,
    /// The `iat` claim is older than the accepted window.
    IssuedAt,
}

impl std::fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let message = match self {
            VerificationFailure::Malformed => "Malformed ID Token",
            VerificationFailure::PublicKeyResource => "Failed to get public key resource",
            VerificationFailure::Signature => "Invalid signature",
            VerificationFailure::Issuer => "Unmatched iss",
            VerificationFailure::Audience => "Unmatched aud",
            VerificationFailure::Nonce => "Unmatched nonce",
            VerificationFailure::AccessTokenHash => "Invalid Access Token(Token Substitution)",
            VerificationFailure::Expired => "The ID Token expired",
            VerificationFailure::IssuedAt => "Invalid iat",
        };
        f.write_str(message)
    }
}

impl std::error::Error for VerificationFailure {}

/// Verify an ID token against the provider's keys and the values of the
/// current authorization attempt.
///
/// # Arguments
///
/// * `jwt` - The compact-serialized ID token
/// * `keys` - The provider's current signing keys
/// * `issuer` - Issuer identifier from the discovery document
/// * `client_id` - The relying party's client ID
/// * `access_token` - Access token issued alongside the ID token
/// * `expected_nonce` - Nonce stored when the authorization request was built
///
/// # Returns
///
/// The parsed claims when every check passes, otherwise the first failing
/// check's reason.
pub fn verify(
    jwt: &str,
    keys: &PublicKeySet,
    issuer: &str,
    client_id: &str,
    access_token: &str,
    expected_nonce: &str,
) -> Result<IdTokenClaims, VerificationFailure> {
    let segments: Vec<&str> = jwt.split('.').collect();
    if segments.len() != 3 {
        return Err(VerificationFailure::Malformed);
    }
    let (header, payload, signature) = (segments[0], segments[1], segments[2]);

    let decoded_header =
        base64url_decode(header).map_err(|_| VerificationFailure::Malformed)?;
    let decoded_header: serde_json::Value =
        serde_json::from_slice(&decoded_header).map_err(|_| VerificationFailure::Malformed)?;

    let decoding_key = decoded_header
        .get("kid")
        .and_then(|kid| kid.as_str())
        .and_then(|kid| keys.decoding_key(kid))
        .ok_or(VerificationFailure::PublicKeyResource)?;

    verify_signature(header, payload, signature, &decoding_key)?;

    let decoded_payload =
        base64url_decode(payload).map_err(|_| VerificationFailure::Malformed)?;
    let claims: IdTokenClaims =
        serde_json::from_slice(&decoded_payload).map_err(|_| VerificationFailure::Malformed)?;

    if claims.iss != issuer {
        return Err(VerificationFailure::Issuer);
    }

    if claims.aud.first().map(String::as_str) != Some(client_id) {
        return Err(VerificationFailure::Audience);
    }

    if claims.nonce.as_deref() != Some(expected_nonce) {
        return Err(VerificationFailure::Nonce);
    }

    if claims.at_hash.as_deref() != Some(generate_hash(access_token).as_str()) {
        return Err(VerificationFailure::AccessTokenHash);
    }

    let now = Utc::now().timestamp();

    if claims.exp <= now {
        return Err(VerificationFailure::Expired);
    }

    if claims.iat < now - MAX_ISSUED_AT_AGE_SECS {
        return Err(VerificationFailure::IssuedAt);
    }

    Ok(claims)
}

/// Check the RSA-SHA256 signature over the exact `header.payload` string.
fn verify_signature(
    header: &str,
    payload: &str,
    signature: &str,
    key: &DecodingKey,
) -> Result<(), VerificationFailure> {
    let message = format!("{}.{}", header, payload);
    match jsonwebtoken::crypto::verify(signature, message.as_bytes(), key, Algorithm::RS256) {
        Ok(true) => Ok(()),
        _ => Err(VerificationFailure::Signature),
    }
}
