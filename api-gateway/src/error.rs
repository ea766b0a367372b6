//! Error handling for the API gateway

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::Error;

use crate::api::response::ErrorResponse;
use crate::request_id;

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Common(#[from] Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_argument",
            ApiError::Common(e) => match e {
                Error::InvalidArgument(_) => "invalid_argument",
                Error::NotFound(_) => "not_found",
                Error::CooldownActive { .. } => "cooldown_active",
                Error::AlreadyClaimed(_) => "already_claimed",
                Error::Database(_) | Error::Migration(_) => "store_unavailable",
                Error::Configuration(_) | Error::Internal(_) | Error::Serialization(_) => {
                    "internal_error"
                }
            },
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Common(e) if e.is_store_unavailable() => {
                "Service temporarily unavailable".to_string()
            }
            ApiError::Common(e) if !e.is_client_error() => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn retry_after_seconds(&self) -> Option<i64> {
        match self {
            // Round up so a client waiting this long is never early
            ApiError::Common(Error::CooldownActive { remaining }) => {
                let millis = remaining.num_milliseconds().max(0);
                Some((millis + 999) / 1000)
            }
            _ => None,
        }
    }

    fn is_client_error(&self) -> bool {
        match self {
            ApiError::BadRequest(_) => true,
            ApiError::Common(e) => e.is_client_error(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Same id as the x-request-id response header
        let request_id = request_id::current();

        if self.is_client_error() {
            tracing::warn!("API Error [{}]: {}", request_id, &self);
        } else {
            tracing::error!("API Error [{}]: {:?}", request_id, &self);
        }

        let error_response = ErrorResponse {
            ok: false,
            error: self.public_message(),
            code: self.code().to_string(),
            retry_after_seconds: self.retry_after_seconds(),
            request_id: Some(request_id),
        };

        // Failures keep the 200 status, clients branch on `ok`
        (StatusCode::OK, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_is_ok_false_with_200() {
        let (status, body) = body_of(Error::NotFound("u1".to_string()).into()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "not_found");
        assert_eq!(body["error"], "User not found: u1");
        assert!(body["requestId"].is_string());
        assert!(body.get("retryAfterSeconds").is_none());
    }

    #[tokio::test]
    async fn test_cooldown_carries_retry_after() {
        let error: ApiError = Error::CooldownActive {
            remaining: chrono::Duration::milliseconds(90_500),
        }
        .into();
        let (_, body) = body_of(error).await;
        assert_eq!(body["code"], "cooldown_active");
        assert_eq!(body["retryAfterSeconds"], 91);
    }

    #[tokio::test]
    async fn test_store_errors_are_not_leaked() {
        let (status, body) = body_of(Error::Database(sqlx::Error::PoolTimedOut).into()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "store_unavailable");
        assert_eq!(body["error"], "Service temporarily unavailable");

        let (_, body) = body_of(Error::Internal("boom".to_string()).into()).await;
        assert_eq!(body["code"], "internal_error");
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_bad_request_code() {
        let error = ApiError::BadRequest("Expected request with `Content-Type: application/json`".into());
        assert_eq!(error.code(), "invalid_argument");
        assert!(error.public_message().starts_with("Invalid request"));
    }
}
