//! Prometheus metrics for monitoring the game server.
//!
//! Metrics are exposed in Prometheus text format on a separate listener
//! when `METRICS_BIND` (or `--metrics-bind`) is set. Without an installed
//! recorder every call here is a no-op.
//!
//! # Metrics
//!
//! - `websocket_connections_active`: Open WebSocket connections
//! - `websocket_messages_total{kind}`: Decoded client messages by type
//! - `websocket_messages_rejected_total{reason}`: Throttled, malformed, or refused messages
//! - `sessions_created_total`: Sessions hosted since startup
//! - `sessions_active`: Sessions currently registered

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record a WebSocket connection opening.
pub fn websocket_connected() {
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

/// Record a WebSocket connection closing.
pub fn websocket_disconnected() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Record a decoded client message.
pub fn websocket_message(kind: &'static str) {
    metrics::counter!("websocket_messages_total", "kind" => kind).increment(1);
}

/// Record a client message that was not applied.
pub fn websocket_rejected(reason: &'static str) {
    metrics::counter!("websocket_messages_rejected_total", "reason" => reason).increment(1);
}

/// Record a hosted session.
pub fn session_created() {
    metrics::counter!("sessions_created_total").increment(1);
}

/// Set the number of registered sessions.
pub fn sessions_active(count: usize) {
    metrics::gauge!("sessions_active").set(count as f64);
}
