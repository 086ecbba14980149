//! HTTP/WebSocket API for the game server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower**: CORS middleware
//! - **Actor Model**: Each session is owned by a dedicated actor task
//!
//! # Modules
//!
//! - [`websocket`]: The game protocol, one JSON message per text frame
//! - [`rate_limiter`]: Per-connection message limits
//!
//! # Endpoints
//!
//! ```text
//! GET /ws      - WebSocket game protocol
//! GET /health  - Server health status
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use pyramid_server::{api::{AppState, create_router}, config::ServerConfig};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(ServerConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively so browser clients served from another
//! origin can connect.

pub mod rate_limiter;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use pyramid::SessionManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; both fields are shared handles.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(config.session.clone())),
            config: Arc::new(config),
        }
    }
}

/// Create the API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with the session registry
///
/// # Returns
///
/// Configured Axum router ready to serve requests
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"0.1.0","sessions":2,"timestamp":"2026-10-17T10:30:00+00:00"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let session_count = state.sessions.session_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": session_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
