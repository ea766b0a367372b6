//! User API handlers
//!
//! Handles endpoints related to the account itself:
//! - Create or refresh an account
//! - Get an account
//! - Register a payout wallet

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use common::model::user::ProfileUpdate;

use crate::api::request::{InitUserRequest, SetWalletRequest};
use crate::api::response::UserResponse;
use crate::error::ApiError;
use crate::AppState;

/// Create the account or refresh its profile
#[utoipa::path(
    post,
    path = "/api/users/init",
    request_body = InitUserRequest,
    responses(
        (status = 200, description = "Account created or refreshed, or `ok: false` on failure", body = UserResponse)
    ),
    tag = "users"
)]
pub async fn init_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InitUserRequest>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(request) = payload?;
    let profile = ProfileUpdate::new(request.display_name.clone(), request.handle.clone(), request.avatar_url.clone());

    let user = state.account_service.init_user(request.identity(), profile).await?;
    Ok(UserResponse::new(user))
}

/// Get an account by identity
#[utoipa::path(
    get,
    path = "/api/users/{identity}",
    params(
        ("identity" = String, Path, description = "External platform identity")
    ),
    responses(
        (status = 200, description = "Account details, or `ok: false` when unknown", body = UserResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    identity: Result<Path<String>, PathRejection>,
) -> Result<UserResponse, ApiError> {
    let Path(identity) = identity?;
    let user = state.account_service.get_user(&identity).await?;
    Ok(UserResponse::new(user))
}

/// Register or replace the payout wallet
#[utoipa::path(
    post,
    path = "/api/users/wallet",
    request_body = SetWalletRequest,
    responses(
        (status = 200, description = "Wallet stored, or `ok: false` on failure", body = UserResponse)
    ),
    tag = "users"
)]
pub async fn set_wallet(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetWalletRequest>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(request) = payload?;

    let user = state
        .account_service
        .set_wallet(request.identity(), request.wallet_address())
        .await?;
    Ok(UserResponse::new(user))
}
