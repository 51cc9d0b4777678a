//! Relying-party configuration.

use secrecy::SecretString;

/// Client registration values for the relying party.
///
/// Immutable after construction; one instance per registered client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OAuth client ID issued by the identity provider.
    pub client_id: String,
    /// OAuth client secret issued by the identity provider.
    pub client_secret: SecretString,
    /// Redirect URI registered for the client.
    pub redirect_uri: String,
}

impl ProviderConfig {
    /// Create a new configuration.
    pub fn new(client_id: String, client_secret: SecretString, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
        }
    }
}
