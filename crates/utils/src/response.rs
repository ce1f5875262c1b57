use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Uniform JSON envelope for every API endpoint: `{success, data, message}`.
/// Upstream failures are reported through this envelope, never as bare 500 bodies.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
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

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let res = ApiResponse::success(42);
        assert!(res.success);
        assert_eq!(res.data, Some(42));
        assert!(res.message.is_none());
    }

    #[test]
    fn test_error_envelope() {
        let res: ApiResponse<()> = ApiResponse::error("gateway unavailable");
        assert!(!res.success);
        assert!(res.data.is_none());
        assert_eq!(res.message.as_deref(), Some("gateway unavailable"));
    }
}
