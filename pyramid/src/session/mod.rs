//! Session actors and the session registry.
//!
//! This module implements:
//! - SessionActor: Async actor owning a single game session
//! - SessionManager: Registry that spawns actors and routes requests by code
//! - Message-based communication with tokio channels
//! - Timers for the memorize countdown and recall pacing
//!
//! ## Architecture
//!
//! Each session runs in its own Tokio task with an mpsc inbox, so requests
//! against one session are applied one at a time. Timers are spawned tasks
//! that post a tagged transition back to the inbox; the session drops any
//! transition scheduled before its latest phase change.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use config::SessionConfig;
pub use manager::{SessionManager, generate_code};
pub use messages::{Outbox, SessionCommand, SessionMessage};
