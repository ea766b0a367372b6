//! HTTP gateway for the Trion backend

pub mod api;
pub mod config;
pub mod error;
pub mod request_id;

use std::sync::Arc;
use std::time::Instant;

use account_service::AccountService;
use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;

use crate::api::{health, rewards, users};
use crate::api::response::ErrorResponse;

/// App state shared across handlers
pub struct AppState {
    /// Account service
    pub account_service: Arc<AccountService>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wrap an account service
    pub fn new(account_service: Arc<AccountService>) -> Self {
        Self {
            account_service,
            started_at: Instant::now(),
        }
    }
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health routes
        api::health::root,
        api::health::health_check,
        // User routes
        api::users::init_user,
        api::users::get_user,
        api::users::set_wallet,
        // Reward routes
        api::rewards::tap,
        api::rewards::spin,
        api::rewards::subscribe,
        api::rewards::claim_daily,
    ),
    components(
        schemas(
            // Requests
            api::request::InitUserRequest,
            api::request::IdentityRequest,
            api::request::SetWalletRequest,
            common::model::user::UserAccount,

            // Response models
            api::response::UserResponse,
            api::response::SpinResponse,
            api::response::MessageResponse,
            api::response::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness endpoints"),
        (name = "users", description = "Account endpoints"),
        (name = "rewards", description = "Tap, wheel, task and daily reward endpoints")
    ),
    info(
        title = "Trion API",
        version = "1.0.0",
        description = "Tap-to-earn backend: accounts, balances and reward claims"
    )
)]
pub struct ApiDoc;

/// Build the HTTP application
pub fn router(state: Arc<AppState>) -> Router {
    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Set up API routes
    let api_routes = Router::new()
        // User routes
        .route("/users/init", post(users::init_user))
        .route("/users/wallet", post(users::set_wallet))
        .route("/users/:identity", get(users::get_user))

        // Reward routes
        .route("/tap", post(rewards::tap))
        .route("/wheel/spin", post(rewards::spin))
        .route("/tasks/subscribe", post(rewards::subscribe))
        .route("/daily/claim", post(rewards::claim_daily));

    // Combine all routes
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(health::openapi_json))
        .nest("/api", api_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(request_id::scope_request_id)),
        )
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    fallback_response(StatusCode::NOT_FOUND, "Route not found", "not_found")
}

async fn method_not_allowed() -> impl IntoResponse {
    fallback_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", "method_not_allowed")
}

fn fallback_response(status: StatusCode, error: &str, code: &str) -> impl IntoResponse {
    let body = ErrorResponse {
        ok: false,
        error: error.to_string(),
        code: code.to_string(),
        retry_after_seconds: None,
        request_id: Some(request_id::current()),
    };
    (status, Json(body))
}
