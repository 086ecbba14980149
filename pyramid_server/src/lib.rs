//! WebSocket server for Pyramid game sessions.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so the router can be driven from integration tests.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
