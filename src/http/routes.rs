//! HTTP Routes
//!
//! Configures the axum router for a cache node.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    bad_path_handler, health_handler, peer_get_handler, stats_handler, AppState,
};
use super::pool::HttpPool;

/// Creates the node router.
///
/// # Endpoints
/// - `GET {base_path}:group/:key` - inter-node protocol: raw value bytes
/// - `GET /stats/:group` - group statistics
/// - `GET /health` - health check endpoint
///
/// Requests under the base path that do not match the `<group>/<key>`
/// shape are rejected with 400; anything outside the base path and the
/// operational endpoints is not served at all.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(pool: Arc<HttpPool>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let base_path = pool.base_path().to_string();
    let state = AppState { pool };

    Router::new()
        .route(&format!("{base_path}:group/:key"), get(peer_get_handler))
        .route(&format!("{base_path}:group"), get(bad_path_handler))
        .route(&base_path, get(bad_path_handler))
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use super::*;
    use crate::group::{new_group, GetterFn};

    fn create_test_app() -> Router {
        let pool = Arc::new(HttpPool::new("http://127.0.0.1:0").unwrap());
        create_router(pool)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_peer_endpoint_serves_group() {
        let _group = new_group(
            "routes_serves_group",
            1024,
            Arc::new(GetterFn(|key: &str| Ok(key.as_bytes().to_vec()))),
        );
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_hcache/routes_serves_group/Tom")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_unknown_group_is_404() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_hcache/routes_missing_group/k")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_peer_path_is_400() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_hcache/missing-key-segment")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_path_outside_base_is_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/somewhere/else")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
