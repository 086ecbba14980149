//! Errors raised while decoding client frames.

use thiserror::Error;

/// A client frame that never reaches session logic.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not JSON, unknown message type, or a field of the wrong shape.
    #[error("Invalid message format: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Player name can't be empty")]
    EmptyName,

    #[error("Invalid game code {0:?}")]
    InvalidCode(String),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
