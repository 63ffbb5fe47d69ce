//! Axum router construction.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    // Per-route fallbacks catch wrong-method requests so even a 405 carries
    // the standard error body.
    Router::new()
        .route(
            "/payments",
            post(handlers::create_payment).fallback(handlers::method_not_allowed),
        )
        .route(
            "/payments-summary",
            get(handlers::get_summary).fallback(handlers::method_not_allowed),
        )
        .route(
            "/metrics",
            get(handlers::get_metrics).fallback(handlers::method_not_allowed),
        )
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let (state, rx) = AppState::for_tests(8);
        // The receiver is not consumed in routing tests; leak it so enqueues
        // keep succeeding.
        std::mem::forget(rx);
        build(state)
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = test_router();
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_route_exists() {
        let app = test_router();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn summary_route_accepts_get_only() {
        let app = test_router();
        let req = Request::builder()
            .method("POST")
            .uri("/payments-summary")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 405);
    }
}
