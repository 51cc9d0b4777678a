//! OAuth 2.0 authorization-code flow with PKCE.

pub(crate) mod authorization;
pub(crate) mod exchange;

mod pkce;
mod state;
mod token;

pub use authorization::{AuthorizationOptions, AuthorizationRequest};
pub use pkce::{PkceChallenge, PkceVerifier};
pub use state::{StateData, StateManager};
pub use token::AccessTokenResult;
