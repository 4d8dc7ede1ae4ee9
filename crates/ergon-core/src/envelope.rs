//! # Success Envelope
//!
//! The one boundary shape with byte-level relevance: every payload
//! crossing between this package's consumers travels as
//! `{ success, data, error?, message? }`. No transport is implied; the
//! envelope is the agreed shape, nothing more.

use serde::{Deserialize, Serialize};

/// Generic payload envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The payload; present on failure too, per contract.
    pub data: T,
    /// Machine-oriented error string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-oriented message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
            message: None,
        }
    }

    /// Successful envelope with a human message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            message: Some(message.into()),
        }
    }

    /// Failed envelope; the contract still carries a payload.
    pub fn failure(data: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Map the payload, keeping envelope fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: f(self.data),
            error: self.error,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_ok_shape() {
        let env = ApiResponse::ok(json!({ "count": 3 }));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({ "success": true, "data": { "count": 3 } }));
    }

    #[test]
    fn test_failure_keeps_data() {
        let env = ApiResponse::failure(Value::Null, "not found");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "data": null, "error": "not found" })
        );
    }

    #[test]
    fn test_deserialize_typed_payload() {
        let env: ApiResponse<Vec<u32>> =
            serde_json::from_value(json!({ "success": true, "data": [1, 2, 3], "message": "ok" }))
                .unwrap();
        assert_eq!(env.data, vec![1, 2, 3]);
        assert_eq!(env.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_map_preserves_envelope() {
        let env = ApiResponse::ok_with_message(2u32, "dos").map(|n| n * 10);
        assert_eq!(env.data, 20);
        assert_eq!(env.message.as_deref(), Some("dos"));
        assert!(env.success);
    }
}
