//! Error types and Axum response conversions.

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Internal(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Unauthorized(reason) => {
                // The rejection reason stays in the server log; echoing it
                // would tell an attacker which check they failed.
                tracing::warn!(reason = %reason, "Unauthorized access attempt");
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// Convenience conversions from common error types
impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Internal(format!("Redis error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

impl From<crate::storage::images::ImageStoreError> for AppError {
    fn from(err: crate::storage::images::ImageStoreError) -> Self {
        use crate::storage::images::ImageStoreError;
        match err {
            ImageStoreError::InvalidName(name) => {
                AppError::BadRequest(format!("Invalid image filename: {}", name))
            }
            ImageStoreError::Io(e) => AppError::Internal(format!("Image IO error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Extract status code and JSON body from an AppError response.
    async fn error_response(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        // Internal error must NOT leak detailed message to client
        let (status, body) = error_response(AppError::Internal(
            "Redis connection refused at 10.0.0.5:6379".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body["error"].as_str().unwrap().contains("Redis"));
        assert!(!body["error"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_unauthorized_hides_reason() {
        // The client must not learn which authentication check failed
        let (status, body) = error_response(AppError::from(AuthError::BadSignature)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, body) = error_response(AppError::from(AuthError::StaleChallenge)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, body) = error_response(AppError::from(AuthError::ChallengeMismatch)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_bad_request() {
        let (status, body) =
            error_response(AppError::BadRequest("Invalid format".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid format");
    }

    #[tokio::test]
    async fn test_forbidden() {
        let (status, body) =
            error_response(AppError::Forbidden("Rotation cooldown".to_string())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Rotation cooldown");
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) = error_response(AppError::NotFound("Post not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Post not found");
    }

    #[tokio::test]
    async fn test_unprocessable() {
        let (status, body) =
            error_response(AppError::Unprocessable("No post with that id".to_string())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "No post with that id");
    }

    #[test]
    fn test_from_redis_error() {
        let redis_err = redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "test context",
            "connection refused".to_string(),
        ));
        let app_err = AppError::from(redis_err);
        match app_err {
            AppError::Internal(msg) => assert!(msg.contains("Redis error")),
            _ => panic!("Expected Internal variant"),
        }
    }
}
