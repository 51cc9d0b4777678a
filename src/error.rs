//! Error types for the `yconnect-auth` crate.
//!
//! A root Error struct holds an error kind and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

use crate::oidc::VerificationFailure;

/// Top-level error type for the crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Discovery(DiscoveryErrorKind),
    Keys(KeyFetchErrorKind),
    OAuth(OAuthErrorKind),
    Token(TokenErrorKind),
    State(StateErrorKind),
    Http(HttpErrorKind),
}

/// Errors from discovery-document resolution.
#[derive(Debug, PartialEq)]
pub enum DiscoveryErrorKind {
    Network,
    InvalidDocument,
}

/// Errors from public-key retrieval.
#[derive(Debug, PartialEq)]
pub enum KeyFetchErrorKind {
    Network,
    InvalidResponse,
}

/// Errors from OAuth operations.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    AuthorizationFailed,
    /// The identity provider reported an error during the code exchange.
    Protocol,
    Network,
    InvalidResponse,
}

/// Errors from token handling after a successful exchange.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    /// The token endpoint response carried no `id_token`.
    MissingIdToken,
    /// ID token verification failed with the given reason.
    Verification(VerificationFailure),
}

/// Errors from the session state collaborator.
#[derive(Debug, PartialEq)]
pub enum StateErrorKind {
    /// The returned `state` did not match a pending authorization attempt.
    CsrfMismatch,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Discovery(kind) => write!(f, "Discovery error: {:?}", kind),
            ErrorKind::Keys(kind) => write!(f, "Key fetch error: {:?}", kind),
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Token(TokenErrorKind::Verification(reason)) => {
                write!(f, "Invalid ID token: {}", reason)
            }
            ErrorKind::Token(kind) => write!(f, "Token error: {:?}", kind),
            ErrorKind::State(kind) => write!(f, "State error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::Network),
        }
    }
}

/// Helper function to create discovery errors.
pub fn discovery_error(kind: DiscoveryErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Discovery(kind),
    }
}

/// Helper function to create key fetch errors.
pub fn keys_error(kind: KeyFetchErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Keys(kind),
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}

/// Helper function to create an invalid-token error from a verification failure.
pub fn invalid_token_error(reason: VerificationFailure) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Token(TokenErrorKind::Verification(reason)),
    }
}

/// Helper function to create state errors.
pub fn state_error(kind: StateErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::State(kind),
    }
}
