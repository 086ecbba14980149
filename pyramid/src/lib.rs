//! # Pyramid
//!
//! Session engine for Pyramid, a multiplayer memory and bluffing drinking
//! card game.
//!
//! Each player is dealt four cards, memorizes them, and then puts them face
//! down. The host reveals a pyramid of cards one at a time; whenever a card
//! shows, anyone may claim to hold its rank and hand a drink to another
//! player, who can accept or call the bluff. At the end every player recites
//! their hand from memory.
//!
//! ## Game Flow
//!
//! - **Lobby**: Players join with a six-character session code
//! - **Setup**: The deck is shuffled
//! - **Dealt**: Four cards per player, pyramid laid out face down
//! - **Memorize**: Players study their hands until the timer runs out
//! - **Pyramid**: The host flips cards; challenges happen here
//! - **Recall**: Players recite their hands in seating order
//! - **Finished**: Drink totals are final; the host may restart
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, dealing, the phase machine, challenges, recall
//! - [`net`]: JSON message protocol
//! - [`session`]: Per-session actors, timers, and the session registry
//!
//! ## Example
//!
//! ```
//! use pyramid::{GameSettings, Session, entities::SessionCode};
//! use uuid::Uuid;
//!
//! let host = Uuid::new_v4();
//! let session = Session::new(SessionCode::new("ab12cd"), host, "Sam", GameSettings::default());
//! assert_eq!(session.code().as_str(), "AB12CD");
//! ```

/// Core game logic, entities, and phase machine.
pub mod game;
pub use game::{
    GameError, GameSettings, GameStateView, Session,
    constants::{self, MAX_PLAYERS, MIN_PLAYERS},
    entities,
};

/// JSON message protocol.
pub mod net;
pub use net::{ClientMessage, ProtocolError, ServerMessage, messages};

/// Session actors and the session registry.
pub mod session;
pub use session::{SessionConfig, SessionHandle, SessionManager};
