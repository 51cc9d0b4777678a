//! The relying-party provider.
//!
//! Ties the pieces together in flow order: discovery, authorization request,
//! code exchange, ID-token verification, resource-owner retrieval. One
//! instance per registered client; the discovery document is fetched once
//! and cached for the lifetime of the instance.

use chrono::Utc;
use secrecy::SecretString;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{
    invalid_token_error, oauth_error, token_error, Error, OAuthErrorKind, TokenErrorKind,
};
use crate::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use crate::oauth::{
    authorization, exchange, AccessTokenResult, AuthorizationOptions, AuthorizationRequest,
};
use crate::oidc::{
    fetch_discovery, fetch_keys, verify, DiscoveryDocument, IdTokenClaims, PublicKeySet,
};
use crate::resource_owner::ResourceOwner;

/// Well-known configuration URL of the YConnect v2 identity provider.
pub const DEFAULT_DISCOVERY_URL: &str =
    "https://auth.login.yahoo.co.jp/yconnect/v2/.well-known/openid-configuration";

/// OpenID Connect relying party for a single registered client.
pub struct Provider {
    config: ProviderConfig,
    http: AuthenticatedClient,
    discovery_url: String,
    discovery: OnceCell<DiscoveryDocument>,
}

impl Provider {
    /// Create a provider against the default discovery URL.
    pub fn new(config: ProviderConfig) -> Result<Self, Error> {
        Self::with_discovery_url(config, DEFAULT_DISCOVERY_URL.to_string())
    }

    /// Create a provider against a specific well-known configuration URL.
    pub fn with_discovery_url(config: ProviderConfig, discovery_url: String) -> Result<Self, Error> {
        let http = AuthenticatedClientBuilder::new().build()?;
        Ok(Self {
            config,
            http,
            discovery_url,
            discovery: OnceCell::new(),
        })
    }

    /// Replace the HTTP client, e.g. with one configured for retries.
    pub fn with_http_client(mut self, http: AuthenticatedClient) -> Self {
        self.http = http;
        self
    }

    /// The client registration values this provider was built with.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve the provider metadata.
    ///
    /// The first caller performs the fetch; concurrent and later callers get
    /// the cached document. The cache lives as long as the provider instance.
    pub async fn discovery(&self) -> Result<&DiscoveryDocument, Error> {
        self.discovery
            .get_or_try_init(|| fetch_discovery(&self.http, &self.discovery_url))
            .await
    }

    /// Build the authorization URL and the per-attempt values the caller
    /// must persist until the callback.
    pub async fn authorization_request(
        &self,
        options: AuthorizationOptions,
    ) -> Result<AuthorizationRequest, Error> {
        let discovery = self.discovery().await?;
        authorization::build(
            &discovery.authorization_endpoint,
            &discovery.scopes_supported,
            &self.config,
            options,
        )
    }

    /// Exchange an authorization code for tokens and verify the ID token.
    ///
    /// The ID token is verified with the nonce stored for this attempt and
    /// the issued access token before anything is returned; when any check
    /// fails the tokens are discarded and the failure reason is surfaced.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from the callback
    /// * `code_verifier` - PKCE verifier stored for this attempt
    /// * `nonce` - Nonce stored for this attempt
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        nonce: &str,
    ) -> Result<AccessTokenResult, Error> {
        let discovery = self.discovery().await?;
        let response = exchange::exchange(
            &self.http,
            &discovery.token_endpoint,
            &self.config,
            code,
            code_verifier,
        )
        .await?;

        let id_token = response.id_token.clone().ok_or_else(|| {
            token_error(
                TokenErrorKind::MissingIdToken,
                "token response carried no id_token",
            )
        })?;

        let claims = self
            .verify_id_token(&id_token, &response.access_token, nonce)
            .await?;
        debug!("ID token verified for subject {}", claims.sub);

        let expires_at = response
            .expires_in
            .map(|seconds| Utc::now() + chrono::Duration::seconds(seconds));

        Ok(AccessTokenResult {
            access_token: SecretString::from(response.access_token),
            refresh_token: response.refresh_token.map(SecretString::from),
            expires_at,
            id_token,
            raw: response.raw,
        })
    }

    /// Fetch the provider's current signing keys.
    pub async fn fetch_public_keys(&self) -> Result<PublicKeySet, Error> {
        let discovery = self.discovery().await?;
        fetch_keys(&self.http, &discovery.public_keys_endpoint).await
    }

    /// Verify an ID token against the provider's current keys.
    ///
    /// # Arguments
    ///
    /// * `jwt` - The compact-serialized ID token
    /// * `access_token` - Access token issued alongside it
    /// * `expected_nonce` - Nonce stored for this authorization attempt
    pub async fn verify_id_token(
        &self,
        jwt: &str,
        access_token: &str,
        expected_nonce: &str,
    ) -> Result<IdTokenClaims, Error> {
        let discovery = self.discovery().await?;
        let keys = self.fetch_public_keys().await?;

        verify(
            jwt,
            &keys,
            &discovery.issuer,
            &self.config.client_id,
            access_token,
            expected_nonce,
        )
        .map_err(|reason| {
            warn!("discarding ID token: {}", reason);
            invalid_token_error(reason)
        })
    }

    /// Fetch the resource owner's claims from the userinfo endpoint.
    pub async fn resource_owner(&self, access_token: &str) -> Result<ResourceOwner, Error> {
        let discovery = self.discovery().await?;

        let response = self
            .http
            .get(&discovery.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("userinfo request failed: {:?}", e);
                Error::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("userinfo request returned {}", status);
            return Err(oauth_error(
                OAuthErrorKind::Protocol,
                &format!("userinfo request returned {}", status),
            ));
        }

        let payload = response.json::<Map<String, Value>>().await.map_err(|e| {
            warn!("failed to parse userinfo response: {:?}", e);
            oauth_error(
                OAuthErrorKind::InvalidResponse,
                &format!("malformed userinfo response: {}", e),
            )
        })?;

        Ok(ResourceOwner::new(payload))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};

    use super::*;
    use crate::error::{DiscoveryErrorKind, ErrorKind};
    use crate::oidc::VerificationFailure;
    use crate::test_support::{
        signed_id_token, standard_claims, TEST_KID, TEST_RSA_PUBLIC_PEM,
    };

    const ISSUER: &str = "https://idp.example";

    fn test_config() -> ProviderConfig {
        ProviderConfig::new(
            "abc".to_string(),
            SecretString::from("secret".to_string()),
            "https://rp.example/callback".to_string(),
        )
    }

    fn provider_for(server: &mockito::ServerGuard) -> Provider {
        Provider::with_discovery_url(
            test_config(),
            format!("{}/.well-known/openid-configuration", server.url()),
        )
        .unwrap()
    }

    fn discovery_body(base: &str) -> String {
        serde_json::json!({
            "issuer": ISSUER,
            "authorization_endpoint": format!("{base}/authorize"),
            "token_endpoint": format!("{base}/token"),
            "userinfo_endpoint": format!("{base}/userinfo"),
            "jwks_uri": format!("{base}/public-keys"),
            "scopes_supported": ["openid", "profile"]
        })
        .to_string()
    }

    async fn mock_discovery(server: &mut mockito::ServerGuard) -> mockito::Mock {
        let base = server.url();
        server
            .mock("GET", "/.well-known/openid-configuration")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(discovery_body(&base))
            .create_async()
            .await
    }

    async fn mock_public_keys(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/public-keys")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({ TEST_KID: TEST_RSA_PUBLIC_PEM }).to_string())
            .create_async()
            .await
    }

    async fn mock_token_endpoint(
        server: &mut mockito::ServerGuard,
        id_token: &str,
    ) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "access_token": "tok123",
                    "refresh_token": "refresh123",
                    "expires_in": 3600,
                    "id_token": id_token,
                    "token_type": "Bearer"
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_discovery_fetched_once() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let mock = server
            .mock("GET", "/.well-known/openid-configuration")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(discovery_body(&base))
            .expect(1)
            .create_async()
            .await;
        let provider = provider_for(&server);

        let first = provider.discovery().await.unwrap().issuer.clone();
        let second = provider.discovery().await.unwrap().issuer.clone();

        mock.assert_async().await;
        assert_eq!(first, ISSUER);
        assert_eq!(second, ISSUER);
    }

    #[tokio::test]
    async fn test_authorization_request_uses_discovery() {
        let mut server = mockito::Server::new_async().await;
        mock_discovery(&mut server).await;
        let provider = provider_for(&server);

        let request = provider
            .authorization_request(AuthorizationOptions::default())
            .await
            .unwrap();

        assert!(request.url.starts_with(&format!("{}/authorize?", server.url())));
        assert!(request.url.contains("scope=openid+profile"));
        assert!(request.url.contains("bail=1"));
        assert!(request.url.contains("code_challenge_method=S256"));
    }

    #[tokio::test]
    async fn test_discovery_failure_yields_no_authorization_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/.well-known/openid-configuration")
            .with_status(500)
            .create_async()
            .await;
        let provider = provider_for(&server);

        let err = provider
            .authorization_request(AuthorizationOptions::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Discovery(DiscoveryErrorKind::Network)
        );
    }

    #[tokio::test]
    async fn test_exchange_code_returns_verified_tokens() {
        let mut server = mockito::Server::new_async().await;
        mock_discovery(&mut server).await;
        mock_public_keys(&mut server).await;
        let id_token = signed_id_token(TEST_KID, &standard_claims(ISSUER, "abc", "n1", "tok123"));
        mock_token_endpoint(&mut server, &id_token).await;
        let provider = provider_for(&server);

        let result = provider
            .exchange_code("auth-code", "verifier", "n1")
            .await
            .unwrap();

        assert_eq!(result.access_token.expose_secret(), "tok123");
        assert_eq!(
            result.refresh_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("refresh123")
        );
        assert_eq!(result.id_token, id_token);
        assert!(result.expires_at.is_some());
        assert!(!result.is_expired());
        assert_eq!(
            result.raw.get("token_type").and_then(|v| v.as_str()),
            Some("Bearer")
        );
    }

    #[tokio::test]
    async fn test_exchange_code_rejects_unmatched_nonce() {
        let mut server = mockito::Server::new_async().await;
        mock_discovery(&mut server).await;
        mock_public_keys(&mut server).await;
        // token minted for nonce "n1", but the session stored "n2"
        let id_token = signed_id_token(TEST_KID, &standard_claims(ISSUER, "abc", "n1", "tok123"));
        mock_token_endpoint(&mut server, &id_token).await;
        let provider = provider_for(&server);

        let err = provider
            .exchange_code("auth-code", "verifier", "n2")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Token(TokenErrorKind::Verification(VerificationFailure::Nonce))
        );
        assert_eq!(err.to_string(), "Invalid ID token: Unmatched nonce");
    }

    #[tokio::test]
    async fn test_exchange_code_rejects_unknown_kid() {
        let mut server = mockito::Server::new_async().await;
        mock_discovery(&mut server).await;
        mock_public_keys(&mut server).await;
        let id_token = signed_id_token(
            "rotated-away",
            &standard_claims(ISSUER, "abc", "n1", "tok123"),
        );
        mock_token_endpoint(&mut server, &id_token).await;
        let provider = provider_for(&server);

        let err = provider
            .exchange_code("auth-code", "verifier", "n1")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Token(TokenErrorKind::Verification(
                VerificationFailure::PublicKeyResource
            ))
        );
    }

    #[tokio::test]
    async fn test_exchange_code_requires_id_token() {
        let mut server = mockito::Server::new_async().await;
        mock_discovery(&mut server).await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({ "access_token": "tok123", "token_type": "Bearer" }).to_string(),
            )
            .create_async()
            .await;
        let provider = provider_for(&server);

        let err = provider
            .exchange_code("auth-code", "verifier", "n1")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Token(TokenErrorKind::MissingIdToken)
        );
    }

    #[tokio::test]
    async fn test_resource_owner_fetch() {
        let mut server = mockito::Server::new_async().await;
        mock_discovery(&mut server).await;
        server
            .mock("GET", "/userinfo")
            .match_header("authorization", "Bearer tok123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "sub": "user-1",
                    "name": "Taro Yamada",
                    "email": "taro@example.com"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let provider = provider_for(&server);

        let owner = provider.resource_owner("tok123").await.unwrap();
        assert_eq!(owner.id(), Some("user-1"));
        assert_eq!(owner.name(), Some("Taro Yamada"));
        assert_eq!(owner.email(), Some("taro@example.com"));
    }

    #[tokio::test]
    async fn test_resource_owner_rejected_status() {
        let mut server = mockito::Server::new_async().await;
        mock_discovery(&mut server).await;
        server
            .mock("GET", "/userinfo")
            .with_status(401)
            .create_async()
            .await;
        let provider = provider_for(&server);

        let err = provider.resource_owner("expired").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::Protocol));
    }
}
