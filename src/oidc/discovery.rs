//! Provider metadata discovery.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{discovery_error, DiscoveryErrorKind, Error, ErrorKind};
use crate::http::AuthenticatedClient;

/// Provider metadata published at the well-known configuration URL.
///
/// Every field is required; a document missing any of them is rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDocument {
    /// Issuer identifier the ID token `iss` claim must match.
    pub issuer: String,
    /// Endpoint the authorization request is sent to.
    pub authorization_endpoint: String,
    /// Endpoint the authorization code is exchanged at.
    pub token_endpoint: String,
    /// Endpoint serving the resource owner's claims.
    pub userinfo_endpoint: String,
    /// Endpoint serving the provider's current signing keys, keyed by key ID.
    #[serde(rename = "jwks_uri")]
    pub public_keys_endpoint: String,
    /// Scopes the provider supports, in the provider's order.
    pub scopes_supported: Vec<String>,
}

/// Fetch and parse the discovery document.
///
/// Callers cache the result; this performs one unconditional round-trip.
pub(crate) async fn fetch(
    client: &AuthenticatedClient,
    discovery_url: &str,
) -> Result<DiscoveryDocument, Error> {
    debug!("fetching discovery document from {}", discovery_url);

    let response = client.get(discovery_url).send().await.map_err(|e| {
        warn!("discovery request failed: {:?}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Discovery(DiscoveryErrorKind::Network),
        }
    })?;

    if !response.status().is_success() {
        let status = response.status();
        warn!("discovery request returned {}", status);
        return Err(discovery_error(
            DiscoveryErrorKind::Network,
            &format!("discovery request returned {}", status),
        ));
    }

    response.json::<DiscoveryDocument>().await.map_err(|e| {
        warn!("failed to parse discovery document: {:?}", e);
        discovery_error(
            DiscoveryErrorKind::InvalidDocument,
            &format!("malformed discovery document: {}", e),
        )
    })
}
