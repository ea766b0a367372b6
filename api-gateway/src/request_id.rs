//! Request id shared by the tracing layers and the error bodies

use axum::{extract::Request, middleware::Next, response::Response};
use tower_http::request_id::RequestId;
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Serve the request with its `x-request-id` in scope
///
/// Must run inside `SetRequestIdLayer`, which stores the id as a request extension.
pub async fn scope_request_id(request: Request, next: Next) -> Response {
    let id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    REQUEST_ID.scope(id, next.run(request)).await
}

/// Id of the request being served, or a fresh one outside a request
pub fn current() -> String {
    REQUEST_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_reads_scoped_id() {
        let id = REQUEST_ID.scope("req-1".to_string(), async { current() }).await;
        assert_eq!(id, "req-1");

        // Outside a request every call gets its own id
        assert_ne!(current(), current());
    }
}
