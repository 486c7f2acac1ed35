//! Response envelope of the remote functions.

use serde::{Deserialize, Serialize};

/// Every function answers either with its payload or with `{ "error": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionResponse<T> {
    Failure { error: String },
    Success(T),
}

impl<T> FunctionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::Success(data)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::SuccessResponse;

    #[test]
    fn test_error_body_is_failure() {
        let response: FunctionResponse<SuccessResponse> =
            serde_json::from_str(r#"{"error":"Only admins can delete posts"}"#).unwrap();
        assert_eq!(response.into_result().unwrap_err(), "Only admins can delete posts");
    }

    #[test]
    fn test_payload_is_success() {
        let response: FunctionResponse<SuccessResponse> =
            serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(response.into_result().unwrap().success);
    }

    #[test]
    fn test_serializes_without_wrapper() {
        let json = serde_json::to_string(&FunctionResponse::<SuccessResponse>::error("nope")).unwrap();
        assert_eq!(json, r#"{"error":"nope"}"#);
    }
}
