use serde::Serialize;

/// Uniform envelope for every JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }

    pub fn error_with_data(data: T) -> Self {
        Self {
            success: false,
            data: Some(data),
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_message() {
        let json = serde_json::to_value(ApiResponse::success(5)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 5}));
    }

    #[test]
    fn error_envelope_carries_message() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "nope"}));
    }
}
