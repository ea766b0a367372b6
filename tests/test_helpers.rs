// File: tests/test_helpers.rs

use std::sync::Arc;

use account_service::{AccountService, InMemoryUserRepository, RewardRules};
use api_gateway::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use common::clock::ManualClock;
use serde_json::Value;
use tower::ServiceExt;

// In-process app backed by memory, with a controllable clock
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
}

#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let clock = Arc::new(ManualClock::new(now));
        let repo = Arc::new(InMemoryUserRepository::with_clock(clock.clone()));
        let service = AccountService::from_parts(repo, clock.clone(), RewardRules::default())
            .expect("default rules are valid");

        let state = Arc::new(AppState::new(Arc::new(service)));
        Self { router: router(state), clock }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.post_raw(uri, "application/json", body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, content_type: &str, body: String) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, request_id, body }
    }
}
