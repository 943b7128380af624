//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value; stored opaquely
/// - `ttl`: Optional TTL in milliseconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_key(&self.key) {
            return Some(error);
        }
        if self.ttl == Some(0) {
            return Some("TTL must be greater than zero".to_string());
        }
        match serde_json::to_vec(&self.value) {
            Ok(bytes) if bytes.len() > MAX_VALUE_SIZE => Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )),
            Ok(_) => None,
            Err(e) => Some(format!("Value is not serializable: {}", e)),
        }
    }
}

/// Request body for the batch read (POST /mget)
#[derive(Debug, Clone, Deserialize)]
pub struct MgetRequest {
    pub keys: Vec<String>,
}

/// Checks a key against the length rules.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let raw = r#"{"key": "test", "value": {"name": "hello"}}"#;
        let req: SetRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, json!({"name": "hello"}));
        assert!(req.ttl.is_none());
    }

    #[test]
    fn test_set_request_with_ttl() {
        let raw = r#"{"key": "test", "value": "hello", "ttl": 60000}"#;
        let req: SetRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.ttl, Some(60_000));
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
    fn test_validate_long_key() {
        let req = SetRequest {
            key: "x".repeat(MAX_KEY_LENGTH + 1),
            value: json!("test"),
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let req = SetRequest {
            key: "k".to_string(),
            value: json!(1),
            ttl: Some(0),
        };
        assert_eq!(req.validate().as_deref(), Some("TTL must be greater than zero"));
    }

    #[test]
    fn test_validate_value_too_large() {
        let req = SetRequest {
            key: "k".to_string(),
            value: json!("x".repeat(MAX_VALUE_SIZE)),
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SetRequest {
            key: "valid_key".to_string(),
            value: json!([1, 2, 3]),
            ttl: Some(60_000),
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_mget_request_deserialize() {
        let req: MgetRequest = serde_json::from_str(r#"{"keys": ["a", "b"]}"#).unwrap();
        assert_eq!(req.keys, vec!["a", "b"]);
    }
}
