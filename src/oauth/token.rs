//! Verified access-token result.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use secrecy::SecretString;

/// Tokens returned by a successful, verified code exchange.
///
/// Instances only exist after the embedded ID token passed verification;
/// there is no unverified variant.
#[derive(Debug, Clone)]
pub struct AccessTokenResult {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Refresh token, when the provider issued one.
    pub refresh_token: Option<SecretString>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// The raw ID token JWT that was verified.
    pub id_token: String,
    /// Remaining response values the provider sent alongside the tokens.
    pub raw: HashMap<String, serde_json::Value>,
}

impl AccessTokenResult {
    /// Check if the access token is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| expires <= Utc::now())
            .unwrap_or(false)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> Option<chrono::Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }
}
