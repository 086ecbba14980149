//! Wire protocol.
//!
//! JSON text frames exchanged over the WebSocket endpoint. Decoding
//! normalizes session codes and display names before anything reaches the
//! session layer.

/// Errors for frames rejected before they reach a session.
pub mod errors;

/// Client and server message types.
pub mod messages;

pub use errors::ProtocolError;
pub use messages::{ClientMessage, ServerMessage};
