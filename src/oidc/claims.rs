//! ID token claims.

use std::collections::HashMap;

use serde::Deserialize;

/// Claims carried by a verified ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer identifier.
    pub iss: String,
    /// Subject identifier of the authenticated end user.
    pub sub: String,
    /// Audiences the token was issued for. Only the first entry is checked
    /// against the client ID.
    pub aud: Vec<String>,
    /// Nonce echoed back from the authorization request.
    #[serde(default)]
    pub nonce: Option<String>,
    /// Access-token hash binding the ID token to the access token.
    #[serde(default)]
    pub at_hash: Option<String>,
    /// Expiration time, seconds since the epoch.
    pub exp: i64,
    /// Issued-at time, seconds since the epoch.
    pub iat: i64,
    /// Remaining profile claims.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_deserialization() {
        let json = r#"{
            "iss": "https://idp.example",
            "sub": "user-1",
            "aud": ["abc", "other"],
            "nonce": "n1",
            "at_hash": "hash",
            "exp": 1705320000,
            "iat": 1705316400,
            "name": "Taro Yamada",
            "email": "taro@example.com"
        }"#;

        let claims: IdTokenClaims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.iss, "https://idp.example");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.aud, ["abc", "other"]);
        assert_eq!(claims.nonce.as_deref(), Some("n1"));
        assert_eq!(claims.at_hash.as_deref(), Some("hash"));
        assert_eq!(claims.exp, 1705320000);
        assert_eq!(claims.iat, 1705316400);
        assert_eq!(
            claims.extra.get("name").and_then(|v| v.as_str()),
            Some("Taro Yamada")
        );
    }

    #[test]
    fn test_optional_claims_absent() {
        let json = r#"{
            "iss": "https://idp.example",
            "sub": "user-1",
            "aud": ["abc"],
            "exp": 1705320000,
            "iat": 1705316400
        }"#;

        let claims: IdTokenClaims = serde_json::from_str(json).unwrap();
        assert!(claims.nonce.is_none());
        assert!(claims.at_hash.is_none());
        assert!(claims.extra.is_empty());
    }
}
