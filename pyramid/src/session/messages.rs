//! Session actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::{
    GameStateView,
    entities::{ChallengeReply, GameAction, PlayerId, Rank},
    errors::Result,
    session::Deferred,
};
use crate::net::messages::ServerMessage;

/// Outbound queue for one connected player.
pub type Outbox = mpsc::Sender<ServerMessage>;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Seat a player and subscribe its outbox
    Join {
        player_id: PlayerId,
        name: String,
        outbox: Outbox,
        response: oneshot::Sender<Result<()>>,
    },

    /// A request from a seated player
    Command {
        requester: PlayerId,
        command: SessionCommand,
        response: oneshot::Sender<Result<()>>,
    },

    /// The player's connection closed. Replies whether the session is now empty.
    Disconnect {
        player_id: PlayerId,
        response: oneshot::Sender<bool>,
    },

    /// Get current session state
    GetState {
        response: oneshot::Sender<GameStateView>,
    },

    /// Internal: a timer fired
    Deferred(Deferred),

    /// Stop the actor
    Close,
}

/// Requests a seated player can make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    StartGame,
    Action(GameAction),
    Challenge {
        challenger_id: PlayerId,
        target_id: PlayerId,
    },
    Respond(ChallengeReply),
    Prove {
        rank: Rank,
        proved: bool,
    },
    VerifyRecall {
        player_id: PlayerId,
        recalled: String,
    },
    Chat {
        message: String,
    },
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartGame => "startGame",
            Self::Action(_) => "gameAction",
            Self::Challenge { .. } => "challenge",
            Self::Respond(_) => "challengeResponse",
            Self::Prove { .. } => "proveCard",
            Self::VerifyRecall { .. } => "verifyCardRecall",
            Self::Chat { .. } => "chatMessage",
        }
    }
}
