use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("idea not found")]
    IdeaNotFound,

    #[error("no verification code found")]
    CodeNotFound,

    #[error("verification code mismatch")]
    CodeMismatch,

    #[error("verification code expired")]
    CodeExpired,

    #[error("mail delivery failed: {0}")]
    Delivery(String),

    #[error("persistence error: {0}")]
    Persistence(anyhow::Error),

    #[error("attachment storage error: {0}")]
    Storage(anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::CodeNotFound
            | AppError::CodeMismatch
            | AppError::CodeExpired => StatusCode::BAD_REQUEST,
            AppError::IdeaNotFound => StatusCode::NOT_FOUND,
            AppError::Delivery(_)
            | AppError::Persistence(_)
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unparsable or mistyped JSON bodies are client input errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, code, msg) = match &self {
            AppError::Validation(m) => ("invalid_request_error", "validation_failed", m.clone()),
            AppError::IdeaNotFound => (
                "not_found_error",
                "idea_not_found",
                "Idea not found".to_string(),
            ),
            AppError::CodeNotFound => (
                "verification_error",
                "code_not_found",
                "No verification code found for this email".to_string(),
            ),
            AppError::CodeMismatch => (
                "verification_error",
                "code_mismatch",
                "Invalid verification code".to_string(),
            ),
            AppError::CodeExpired => (
                "verification_error",
                "code_expired",
                "Verification code expired".to_string(),
            ),
            AppError::Delivery(e) => {
                tracing::error!("Mail delivery error: {}", e);
                (
                    "delivery_error",
                    "delivery_failed",
                    "Failed to send verification code".to_string(),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {:#}", e);
                (
                    "internal_error",
                    "persistence_failed",
                    "internal server error".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Attachment storage error: {:#}", e);
                (
                    "internal_error",
                    "storage_failed",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_failures_are_bad_requests() {
        assert_eq!(AppError::CodeNotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CodeMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CodeExpired.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_rejection_is_validation() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::Request;

        let req = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"code": true}"#))
            .unwrap();
        let rejection = axum::Json::<std::collections::HashMap<String, String>>::from_request(req, &())
            .await
            .err()
            .unwrap();

        let err = AppError::from(rejection);
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_idea_is_not_found() {
        assert_eq!(AppError::IdeaNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_cause() {
        let resp = AppError::Persistence(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], "internal server error");
        assert_eq!(body["error"]["code"], "persistence_failed");
    }
}
