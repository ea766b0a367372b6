//! Reward API handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::request::IdentityRequest;
use crate::api::response::{SpinResponse, UserResponse};
use crate::error::ApiError;
use crate::AppState;

/// Add the tap amount to the balance
#[utoipa::path(
    post,
    path = "/api/tap",
    request_body = IdentityRequest,
    responses(
        (status = 200, description = "Balance incremented, or `ok: false` on failure", body = UserResponse)
    ),
    tag = "rewards"
)]
pub async fn tap(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IdentityRequest>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(request) = payload?;
    let user = state.account_service.tap(request.identity()).await?;
    Ok(UserResponse::new(user))
}

/// Spin the reward wheel
#[utoipa::path(
    post,
    path = "/api/wheel/spin",
    request_body = IdentityRequest,
    responses(
        (status = 200, description = "Reward won, or `ok: false` with `retryAfterSeconds` while cooling down", body = SpinResponse)
    ),
    tag = "rewards"
)]
pub async fn spin(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IdentityRequest>, JsonRejection>,
) -> Result<SpinResponse, ApiError> {
    let Json(request) = payload?;
    let result = state.account_service.spin(request.identity()).await?;
    Ok(SpinResponse::new(result.reward, result.user))
}

/// Claim the one-time subscription bonus
#[utoipa::path(
    post,
    path = "/api/tasks/subscribe",
    request_body = IdentityRequest,
    responses(
        (status = 200, description = "Bonus granted, or `ok: false` when already claimed", body = UserResponse)
    ),
    tag = "rewards"
)]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IdentityRequest>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(request) = payload?;
    let user = state.account_service.subscribe(request.identity()).await?;
    Ok(UserResponse::new(user))
}

/// Claim the daily bonus
#[utoipa::path(
    post,
    path = "/api/daily/claim",
    request_body = IdentityRequest,
    responses(
        (status = 200, description = "Bonus granted, or `ok: false` when already claimed today", body = UserResponse)
    ),
    tag = "rewards"
)]
pub async fn claim_daily(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IdentityRequest>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(request) = payload?;
    let user = state.account_service.claim_daily(request.identity()).await?;
    Ok(UserResponse::new(user))
}
