//! Response envelopes
//!
//! Every endpoint answers with a JSON object carrying an `ok` flag. Successful
//! calls add their payload next to it, failures add an `error` message (see
//! [`crate::error::ApiError`]).

use axum::response::{IntoResponse, Response};
use axum::Json;
use common::model::user::{Points, UserAccount};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{ ok: true, user }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Always true
    pub ok: bool,
    /// The account after the operation
    pub user: UserAccount,
}

/// `{ ok: true, reward, user }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpinResponse {
    /// Always true
    pub ok: bool,
    /// Points won on the wheel
    #[schema(value_type = i64)]
    pub reward: Points,
    /// The account after the reward was credited
    pub user: UserAccount,
}

/// `{ ok: true, msg }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Always true
    pub ok: bool,
    /// Human-readable message
    pub msg: String,
}

/// `{ ok: false, error, code }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always false
    pub ok: bool,
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
    /// Seconds until a cooldown ends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<i64>,
    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl UserResponse {
    /// Wrap an account in a success envelope
    pub fn new(user: UserAccount) -> Self {
        Self { ok: true, user }
    }
}

impl SpinResponse {
    /// Wrap a spin outcome in a success envelope
    pub fn new(reward: Points, user: UserAccount) -> Self {
        Self { ok: true, reward, user }
    }
}

impl MessageResponse {
    /// Wrap a message in a success envelope
    pub fn new(msg: impl Into<String>) -> Self {
        Self { ok: true, msg: msg.into() }
    }
}

impl IntoResponse for UserResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for SpinResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
