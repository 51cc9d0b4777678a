//! Resource owner accessor over the userinfo payload.

use serde_json::{Map, Value};

/// Claims payload of the authenticated resource owner.
///
/// Thin accessor over the raw mapping; a missing key yields `None`,
/// never an error.
#[derive(Debug, Clone)]
pub struct ResourceOwner {
    response: Map<String, Value>,
}

impl ResourceOwner {
    /// Wrap a raw claims payload.
    pub fn new(response: Map<String, Value>) -> Self {
        Self { response }
    }

    fn string_value(&self, key: &str) -> Option<&str> {
        self.response.get(key).and_then(Value::as_str)
    }

    /// Get resource owner id (`sub`).
    pub fn id(&self) -> Option<&str> {
        self.string_value("sub")
    }

    /// Get resource owner name.
    pub fn name(&self) -> Option<&str> {
        self.string_value("name")
    }

    /// Get resource owner first name (`given_name`).
    pub fn first_name(&self) -> Option<&str> {
        self.string_value("given_name")
    }

    /// Get resource owner last name (`family_name`).
    pub fn last_name(&self) -> Option<&str> {
        self.string_value("family_name")
    }

    /// Get resource owner nickname.
    pub fn nickname(&self) -> Option<&str> {
        self.string_value("nickname")
    }

    /// Get resource owner picture url.
    pub fn picture(&self) -> Option<&str> {
        self.string_value("picture")
    }

    /// Get resource owner email.
    pub fn email(&self) -> Option<&str> {
        self.string_value("email")
    }

    /// Get resource owner postal address, when present.
    pub fn address(&self) -> Option<&Map<String, Value>> {
        self.response.get("address").and_then(Value::as_object)
    }

    /// All of the owner details available, as received.
    pub fn to_map(&self) -> &Map<String, Value> {
        &self.response
    }
}

impl From<Map<String, Value>> for ResourceOwner {
    fn from(response: Map<String, Value>) -> Self {
        Self::new(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResourceOwner {
        let value = serde_json::json!({
            "sub": "user-1",
            "name": "Taro Yamada",
            "given_name": "Taro",
            "family_name": "Yamada",
            "nickname": "taro",
            "picture": "https://img.example/taro.png",
            "email": "taro@example.com",
            "address": {
                "country": "JP",
                "locality": "Tokyo"
            }
        });
        ResourceOwner::new(value.as_object().unwrap().clone())
    }

    #[test]
    fn test_accessors() {
        let owner = sample();
        assert_eq!(owner.id(), Some("user-1"));
        assert_eq!(owner.name(), Some("Taro Yamada"));
        assert_eq!(owner.first_name(), Some("Taro"));
        assert_eq!(owner.last_name(), Some("Yamada"));
        assert_eq!(owner.nickname(), Some("taro"));
        assert_eq!(owner.picture(), Some("https://img.example/taro.png"));
        assert_eq!(owner.email(), Some("taro@example.com"));
    }

    #[test]
    fn test_address_nested_object() {
        let owner = sample();
        let address = owner.address().unwrap();
        assert_eq!(address.get("country").and_then(Value::as_str), Some("JP"));
        assert_eq!(address.get("locality").and_then(Value::as_str), Some("Tokyo"));
    }

    #[test]
    fn test_missing_keys_yield_none() {
        let owner = ResourceOwner::new(Map::new());
        assert!(owner.id().is_none());
        assert!(owner.name().is_none());
        assert!(owner.first_name().is_none());
        assert!(owner.last_name().is_none());
        assert!(owner.nickname().is_none());
        assert!(owner.picture().is_none());
        assert!(owner.email().is_none());
        assert!(owner.address().is_none());
    }

    #[test]
    fn test_raw_passthrough() {
        let owner = sample();
        assert!(owner.to_map().contains_key("sub"));
        assert!(owner.to_map().contains_key("address"));
    }
}
