use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::constants;

/// Opaque per-connection identity assigned by the transport.
pub type PlayerId = Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spade,
    #[serde(rename = "♥")]
    Heart,
    #[serde(rename = "♦")]
    Diamond,
    #[serde(rename = "♣")]
    Club,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Self::Spade, Self::Heart, Self::Diamond, Self::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Spade => "♠",
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Club => "♣",
        };
        write!(f, "{repr}")
    }
}

/// Card rank. The serialized form is the same short token players type
/// during recall ("A", "2".."10", "J", "Q", "K").
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Self::Ace,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
    ];

    /// Canonical token, e.g. `"10"` or `"Q"`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Ace => "A",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rank {0:?}")]
pub struct ParseRankError(pub String);

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|rank| rank.token() == token)
            .ok_or(ParseRankError(s.to_string()))
    }
}

/// A playing card. Serialized as `{"value": "Q", "suit": "♥"}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    #[serde(rename = "value")]
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// A face-down card in the pyramid. `row` and `position` only matter for
/// layout; reveal order is the slot order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PyramidSlot {
    #[serde(flatten)]
    pub card: Card,
    pub revealed: bool,
    pub row: usize,
    pub position: usize,
}

impl PyramidSlot {
    pub fn new(card: Card, row: usize, position: usize) -> Self {
        Self {
            card,
            revealed: false,
            row,
            position,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub connected: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_host,
            connected: true,
        }
    }
}

/// Human-typeable session code. Input is trimmed and upper-cased so
/// "ab12cd " and "AB12CD" name the same session.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SessionCode(String);

impl SessionCode {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code has the shape of a generated code.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == constants::SESSION_CODE_LENGTH
            && self.0.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for SessionCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for SessionCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Game phases in forward order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Setup,
    Dealt,
    Memorize,
    Pyramid,
    Recall,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Lobby => "lobby",
            Self::Setup => "setup",
            Self::Dealt => "dealt",
            Self::Memorize => "memorize",
            Self::Pyramid => "pyramid",
            Self::Recall => "recall",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// Host-only actions that advance the game.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GameAction {
    AutoStart,
    StartMemorize,
    FlipPyramidCard,
    StartRecall,
    RestartGame,
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::AutoStart => "autoStart",
            Self::StartMemorize => "startMemorize",
            Self::FlipPyramidCard => "flipPyramidCard",
            Self::StartRecall => "startRecall",
            Self::RestartGame => "restartGame",
        };
        write!(f, "{repr}")
    }
}

/// The accused player's answer to an accusation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeReply {
    /// Take the drink.
    Accept,
    /// Call the bluff and make the accuser prove the card.
    Challenge,
}

/// The pending accuser/target pair. This is the only place the pair lives.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChallenge {
    pub accuser_id: PlayerId,
    pub target_id: PlayerId,
    /// Set once the target calls the bluff; the rank the accuser was
    /// prompted to prove.
    pub contested_rank: Option<Rank>,
}
