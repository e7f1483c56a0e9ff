//! Request DTOs for the cache admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{MAX_KEY_LENGTH, MAX_TTL_SECONDS};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        if self.ttl.is_some_and(|ttl| ttl > MAX_TTL_SECONDS) {
            return Some(format!("TTL exceeds maximum of {} seconds", MAX_TTL_SECONDS));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": [1, 2, 3]}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, json!([1, 2, 3]));
        assert!(req.ttl.is_none());
    }

    #[test]
    fn test_set_request_rejects_negative_ttl() {
        let json = r#"{"key": "test", "value": "hello", "ttl": -1}"#;
        assert!(serde_json::from_str::<SetRequest>(json).is_err());
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!("test"),
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_ttl_too_large() {
        let req = SetRequest {
            key: "key".to_string(),
            value: json!(null),
            ttl: Some(MAX_TTL_SECONDS + 1),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SetRequest {
            key: "valid_key".to_string(),
            value: json!({"name": "jacket"}),
            ttl: Some(0),
        };
        assert!(req.validate().is_none());
    }
}
