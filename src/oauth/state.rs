//! CSRF state management for the authorization flow.
//!
//! The core only generates state, nonce and code verifier; the caller keeps
//! them between the authorize and callback legs. This manager is the
//! in-memory session collaborator for that job.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::{state_error, Error, StateErrorKind};

/// Generate a cryptographically random token (32 bytes, hex encoded).
pub(crate) fn random_token() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Data stored for one authorization attempt.
#[derive(Debug, Clone)]
pub struct StateData {
    /// Nonce embedded in the authorization request.
    pub nonce: String,
    /// PKCE verifier for the code exchange.
    pub code_verifier: String,
    /// When this state expires.
    pub expires_at: DateTime<Utc>,
}

/// Manager for OAuth state parameters with expiration.
///
/// Stores the nonce and PKCE verifier under their CSRF state token, one set
/// per authorization attempt. A state validates at most once.
#[derive(Clone)]
pub struct StateManager {
    states: Arc<Mutex<HashMap<String, StateData>>>,
    ttl: Duration,
}

impl StateManager {
    /// Create a new state manager with default TTL of 10 minutes.
    pub fn new() -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::minutes(10),
        }
    }

    /// Create a new state manager with custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Store the values of an authorization attempt under its state token.
    ///
    /// # Arguments
    ///
    /// * `state` - The CSRF state token of the attempt
    /// * `nonce` - The nonce embedded in the authorization request
    /// * `code_verifier` - The PKCE verifier for the code exchange
    pub fn store(&self, state: &str, nonce: String, code_verifier: String) {
        let data = StateData {
            nonce,
            code_verifier,
            expires_at: Utc::now() + self.ttl,
        };

        let mut states = self.states.lock().unwrap();
        states.insert(state.to_string(), data);
    }

    /// Validate and consume a state token.
    ///
    /// Removes the state from storage and returns associated data if valid.
    ///
    /// # Arguments
    ///
    /// * `state` - The state token returned on the callback
    ///
    /// # Returns
    ///
    /// `Some(StateData)` if valid, `None` if unknown, expired, or already used.
    pub fn validate(&self, state: &str) -> Option<StateData> {
        let mut states = self.states.lock().unwrap();

        // Remove and return the state data if it exists
        if let Some(data) = states.remove(state) {
            // Check if expired
            if Utc::now() > data.expires_at {
                return None;
            }
            Some(data)
        } else {
            None
        }
    }

    /// Validate a state token, surfacing the CSRF check as a typed error.
    ///
    /// Call this with the `state` query parameter of the callback before
    /// exchanging the authorization code.
    pub fn require(&self, state: &str) -> Result<StateData, Error> {
        self.validate(state).ok_or_else(|| {
            state_error(
                StateErrorKind::CsrfMismatch,
                "state did not match a pending authorization attempt",
            )
        })
    }

    /// Clean up expired states.
    ///
    /// Should be called periodically to prevent memory leaks.
    pub fn cleanup_expired(&self) {
        let mut states = self.states.lock().unwrap();
        let now = Utc::now();
        states.retain(|_, data| data.expires_at > now);
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
