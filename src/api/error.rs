//! API error types with `{msg, code}` JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::crypto::CryptoError;
use crate::db::DatabaseError;

/// Error response body. `msg` is what clients display.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub msg: String,
    pub code: &'static str,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
        };

        (status, Json(ErrorBody { msg, code })).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => match entity_type.as_str() {
                "customer" => ApiError::NotFound("Customer not found".into()),
                _ => ApiError::NotFound(format!("No {entity_type} at index {id}")),
            },
            DatabaseError::ConstraintViolation(field) if field == "email" => {
                ApiError::Conflict("Email already registered".into())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 16).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_is_401() {
        let (status, json) = body_json(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "AUTH_REQUIRED");
        assert_eq!(json["msg"], "Authentication required");
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let (status, json) = body_json(ApiError::Conflict("Email already registered".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["msg"], "Email already registered");
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let (status, json) = body_json(ApiError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["msg"], "An internal error occurred");
    }

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let err = ApiError::from(DatabaseError::ConstraintViolation("email".into()));
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = ApiError::from(DatabaseError::ConstraintViolation("med_id".into()));
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn missing_entities_map_to_not_found() {
        let err = ApiError::from(DatabaseError::NotFound {
            entity_type: "medication".into(),
            id: "3".into(),
        });
        assert_eq!(err.to_string(), "Not found: No medication at index 3");
    }
}
