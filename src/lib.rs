//! # yconnect-auth
//!
//! OpenID Connect relying-party flow for the YConnect identity provider:
//! - Discovery-document resolution with an instance-scoped cache
//! - Authorization request construction with PKCE, state and nonce
//! - Authorization-code exchange over an injected HTTP client
//! - ID-token signature and claim verification against fetched public keys
//! - Resource-owner retrieval from the userinfo endpoint
//!
//! ## Flow
//!
//! ```rust,ignore
//! use secrecy::SecretString;
//! use yconnect_auth::{AuthorizationOptions, Provider, ProviderConfig, StateManager};
//!
//! let provider = Provider::new(ProviderConfig::new(
//!     client_id,
//!     SecretString::from(client_secret),
//!     redirect_uri,
//! ))?;
//! let states = StateManager::new();
//!
//! // authorize leg: redirect the user, keep the per-attempt values
//! let request = provider.authorization_request(AuthorizationOptions::default()).await?;
//! states.store(&request.state, request.nonce, request.code_verifier);
//!
//! // callback leg: check state, then exchange and verify in one step
//! let attempt = states.require(&returned_state)?;
//! let tokens = provider.exchange_code(&code, &attempt.code_verifier, &attempt.nonce).await?;
//! let owner = provider.resource_owner(tokens.access_token.expose_secret()).await?;
//! ```
//!
//! Tokens are only ever returned after the embedded ID token passed every
//! verification check. Nothing is retried internally; callers wanting
//! retry/backoff inject a client built with
//! [`http::AuthenticatedClientBuilder`].

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod oidc;
pub mod provider;
pub mod resource_owner;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::ProviderConfig;
pub use error::{Error, ErrorKind};
pub use oauth::{
    AccessTokenResult, AuthorizationOptions, AuthorizationRequest, PkceChallenge, PkceVerifier,
    StateData, StateManager,
};
pub use oidc::{DiscoveryDocument, IdTokenClaims, PublicKeySet, VerificationFailure};
pub use provider::{Provider, DEFAULT_DISCOVERY_URL};
pub use resource_owner::ResourceOwner;
