//! Fixed game parameters.

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Cards dealt to each player before the pyramid is built.
pub const HAND_SIZE: usize = 4;

/// Fewest players needed before the host can start.
pub const MIN_PLAYERS: usize = 3;

/// Session capacity.
pub const MAX_PLAYERS: usize = 7;

/// Pyramid height used while the player count stays below
/// [`PYRAMID_SHRINK_THRESHOLD`].
pub const DEFAULT_PYRAMID_ROWS: usize = 6;

/// Player count at which the pyramid starts shrinking so the deck can still
/// cover every hand.
pub const PYRAMID_SHRINK_THRESHOLD: usize = 8;

/// Drinks handed out for a wrong recital.
pub const RECALL_PENALTY: u32 = 5;

/// Drinks for a target who accepts an accusation.
pub const ACCEPT_PENALTY: u32 = 1;

/// Drinks for a target whose accuser proves the card.
pub const PROVEN_PENALTY: u32 = 2;

/// Drinks for an accuser caught bluffing.
pub const BLUFF_PENALTY: u32 = 1;

/// Length of generated session codes.
pub const SESSION_CODE_LENGTH: usize = 6;

/// Display names are truncated to this many characters.
pub const MAX_NAME_LENGTH: usize = 20;

/// Chat messages are truncated to this many characters.
pub const MAX_CHAT_LENGTH: usize = 280;
