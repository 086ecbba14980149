//! Integration tests for the HTTP surface of the server.
//!
//! Tests the health endpoint, routing, and CORS without opening sockets.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pyramid_server::{
    api::{AppState, create_router},
    config::ServerConfig,
};
use serde_json::Value;
use std::time::Duration;
use tokio::{sync::mpsc, time::timeout};
use tower::ServiceExt; // For `oneshot` method
use uuid::Uuid;

fn create_test_server() -> (axum::Router, AppState) {
    let state = AppState::new(ServerConfig::default());
    (create_router(state.clone()), state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// Health Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["sessions"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_counts_live_sessions() {
    let (app, state) = create_test_server();

    let (tx, _rx) = mpsc::channel(16);
    state
        .sessions
        .create_session(Uuid::new_v4(), "Host".to_string(), tx)
        .await
        .unwrap();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let body = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(body["sessions"], 1);
}

#[tokio::test]
async fn test_request_completes_within_timeout() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let result = timeout(Duration::from_secs(5), app.oneshot(request)).await;

    assert!(result.is_ok(), "Request should complete within timeout");
    assert_eq!(result.unwrap().unwrap().status(), StatusCode::OK);
}

// ============================================================================
// Routing Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/tables")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_websocket_route_requires_upgrade() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/ws")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    // Without upgrade headers Axum refuses the request outright
    assert!(
        response.status() == StatusCode::UPGRADE_REQUIRED
            || response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::METHOD_NOT_ALLOWED,
        "plain GET /ws should not succeed, got: {}",
        response.status()
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
