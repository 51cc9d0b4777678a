//! Authorization request construction.

use url::Url;

use crate::config::ProviderConfig;
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::pkce::PkceVerifier;
use crate::oauth::state::random_token;

/// Caller-supplied options for one authorization attempt.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationOptions {
    /// Scopes to request. When `None`, the provider's supported scopes are used.
    pub scopes: Option<Vec<String>>,
    /// CSRF state token. Generated when `None`.
    pub state: Option<String>,
    /// Replay-protection nonce. Generated when `None`, independently of `state`.
    pub nonce: Option<String>,
}

/// Authorization request with URL and the per-attempt values the caller
/// must persist until the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// CSRF state parameter for validation.
    pub state: String,
    /// Nonce embedded in the request, echoed back inside the ID token.
    pub nonce: String,
    /// PKCE verifier to be supplied at code exchange.
    pub code_verifier: String,
    /// PKCE challenge embedded in the request.
    pub code_challenge: String,
}

/// Assemble the authorization URL and per-attempt values.
///
/// Pure aside from randomness; the discovery round-trip happens in the
/// provider before this is called.
///
/// # Arguments
///
/// * `authorization_endpoint` - From the discovery document
/// * `default_scopes` - The provider's supported scopes, used only when the
///   caller supplies none
/// * `config` - Client registration values
/// * `options` - Per-attempt overrides
pub fn build(
    authorization_endpoint: &str,
    default_scopes: &[String],
    config: &ProviderConfig,
    options: AuthorizationOptions,
) -> Result<AuthorizationRequest, Error> {
    let mut url = Url::parse(authorization_endpoint).map_err(|e| {
        oauth_error(
            OAuthErrorKind::AuthorizationFailed,
            &format!("invalid authorization endpoint: {}", e),
        )
    })?;

    let state = options.state.unwrap_or_else(random_token);
    let nonce = options.nonce.unwrap_or_else(random_token);

    let verifier = PkceVerifier::generate();
    let challenge = verifier.challenge();

    let scopes = options
        .scopes
        .unwrap_or_else(|| default_scopes.to_vec())
        .join(" ");

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &scopes)
        .append_pair("state", &state)
        .append_pair("nonce", &nonce)
        .append_pair("code_challenge", challenge.as_str())
        .append_pair("code_challenge_method", "S256")
        .append_pair("bail", "1");

    Ok(AuthorizationRequest {
        url: url.to_string(),
        state,
        nonce,
        code_verifier: verifier.as_str().to_string(),
        code_challenge: challenge.as_str().to_string(),
    })
}
