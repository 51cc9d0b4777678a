//! Wire-level authorization-code exchange against the token endpoint.

use std::collections::HashMap;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::http::AuthenticatedClient;

/// Form body of the authorization-code grant request.
#[derive(Debug, Serialize)]
struct TokenExchangeRequest {
    grant_type: String,
    code: String,
    code_verifier: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

/// Token endpoint response, before ID-token verification.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub id_token: Option<String>,
    /// Everything else the provider sent (token_type, scope, ...).
    #[serde(flatten)]
    pub raw: HashMap<String, serde_json::Value>,
}

/// POST the authorization-code grant and parse the response.
///
/// Fails on a non-success status or an OAuth error payload. The provider's
/// `error_description` is preferred over `error` for the surfaced message.
pub(crate) async fn exchange(
    client: &AuthenticatedClient,
    token_endpoint: &str,
    config: &ProviderConfig,
    code: &str,
    code_verifier: &str,
) -> Result<TokenResponse, Error> {
    let request = TokenExchangeRequest {
        grant_type: "authorization_code".to_string(),
        code: code.to_string(),
        code_verifier: code_verifier.to_string(),
        client_id: config.client_id.clone(),
        client_secret: config.client_secret.expose_secret().clone(),
        redirect_uri: config.redirect_uri.clone(),
    };

    debug!("exchanging authorization code for tokens");

    let response = client
        .post(token_endpoint)
        .form(&request)
        .send()
        .await
        .map_err(|e| {
            warn!("token exchange request failed: {:?}", e);
            Error::from(e)
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        warn!("failed to read token response body: {:?}", e);
        Error::from(e)
    })?;

    let data: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);

    if !status.is_success() || data.get("error").is_some() {
        let message = data
            .get("error_description")
            .and_then(|v| v.as_str())
            .or_else(|| data.get("error").and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());
        warn!("identity provider rejected the code exchange: {}", message);
        return Err(oauth_error(OAuthErrorKind::Protocol, &message));
    }

    serde_json::from_value(data).map_err(|e| {
        warn!("failed to parse token response: {:?}", e);
        oauth_error(
            OAuthErrorKind::InvalidResponse,
            &format!("invalid token response: {}", e),
        )
    })
}
