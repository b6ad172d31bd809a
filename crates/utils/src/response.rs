//! JSON envelope shared by every API endpoint.

use serde::{Deserialize, Serialize};

/// Response envelope: `{"success": true, ...payload}` on success,
/// `{"success": false, "error": "..."}` on failure. The payload is flattened
/// so its fields appear at the top level of the response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Payload {
        count: u32,
    }

    #[test]
    fn success_flattens_payload() {
        let json = serde_json::to_value(ApiResponse::success(Payload { count: 3 })).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 3);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_carries_message_only() {
        let json = serde_json::to_value(ApiResponse::<Payload>::error("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("count").is_none());
    }
}
