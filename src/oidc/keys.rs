//! Signing-key retrieval from the provider's public-keys endpoint.

use std::collections::HashMap;

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{keys_error, Error, ErrorKind, KeyFetchErrorKind};
use crate::http::AuthenticatedClient;

/// The provider's current signing keys, keyed by key ID.
///
/// The endpoint serves a JSON object mapping each `kid` to PEM key material.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PublicKeySet {
    keys: HashMap<String, String>,
}

impl PublicKeySet {
    /// Build a key set from an existing kid → PEM mapping.
    pub fn from_map(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }

    /// Get the raw key material for a key ID.
    pub fn get(&self, kid: &str) -> Option<&str> {
        self.keys.get(kid).map(String::as_str)
    }

    /// Resolve a key ID to a verification key.
    ///
    /// Returns `None` when the key ID is unknown or its PEM material does not
    /// parse as an RSA public key.
    pub fn decoding_key(&self, kid: &str) -> Option<DecodingKey> {
        let pem = self.keys.get(kid)?;
        DecodingKey::from_rsa_pem(pem.as_bytes()).ok()
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Fetch the provider's current signing keys.
///
/// No caching: every verification sees the provider's current set, so a
/// rotated-away key surfaces as a verification failure rather than a silent
/// fallback to a stale key.
pub(crate) async fn fetch(
    client: &AuthenticatedClient,
    public_keys_endpoint: &str,
) -> Result<PublicKeySet, Error> {
    debug!("fetching public keys from {}", public_keys_endpoint);

    let response = client.get(public_keys_endpoint).send().await.map_err(|e| {
        warn!("public keys request failed: {:?}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Keys(KeyFetchErrorKind::Network),
        }
    })?;

    if !response.status().is_success() {
        let status = response.status();
        warn!("public keys request returned {}", status);
        return Err(keys_error(
            KeyFetchErrorKind::Network,
            &format!("public keys request returned {}", status),
        ));
    }

    response.json::<PublicKeySet>().await.map_err(|e| {
        warn!("failed to parse public keys response: {:?}", e);
        keys_error(
            KeyFetchErrorKind::InvalidResponse,
            &format!("malformed public keys response: {}", e),
        )
    })
}
