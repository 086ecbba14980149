//! Pyramid game engine.
//!
//! This module provides the synchronous game logic:
//! - Cards, deck construction and shuffling
//! - Dealing hands and building the pyramid
//! - The per-session phase machine driven by the host
//! - The challenge sub-protocol and recall verification
//! - Roster changes (join, leave, host migration) and chat
//!
//! Nothing here does I/O or sleeps. Operations return [`session::Effects`]
//! describing the messages to deliver and the delayed transitions to
//! schedule; the session actor carries them out.

pub mod constants;
pub mod dealer;
pub mod deck;
pub mod entities;
pub mod errors;
pub mod recall;
pub mod session;

mod challenge;
mod roster;
mod state_machine;

pub use errors::GameError;
pub use session::{Deferred, DeferredKind, Effects, GameSettings, GameStateView, Recipient, Session};
