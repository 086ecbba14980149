//! Request errors reported back to the player that sent the request.

use thiserror::Error;

use super::entities::{GameAction, Phase};

/// Errors that reject a request without changing session state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Game not found")]
    SessionNotFound,
    #[error("Game is full")]
    SessionFull,
    #[error("Game already started")]
    AlreadyStarted,
    #[error("Already in this game")]
    AlreadyJoined,
    #[error("Could not allocate a game code")]
    CodeSpaceExhausted,
    #[error("Only the host can do that")]
    NotHost,
    #[error("Need at least {min} players")]
    NotEnoughPlayers { min: usize },
    #[error("Not a member of this game")]
    NotInSession,
    #[error("Can't {action} during the {phase} phase")]
    WrongPhase { action: GameAction, phase: Phase },
    #[error("Can't start the game during the {0} phase")]
    CannotStart(Phase),
    #[error("Wait for a card to be revealed")]
    NoCardRevealed,
    #[error("A challenge is already in progress")]
    ChallengeAlreadyActive,
    #[error("There is no challenge to answer")]
    NoActiveChallenge,
    #[error("That challenge isn't yours to answer")]
    NotChallengeTarget,
    #[error("Only the accuser can prove the card")]
    NotChallengeAccuser,
    #[error("The challenge has already been contested")]
    ChallengeAlreadyContested,
    #[error("The challenge hasn't been contested")]
    ChallengeNotContested,
    #[error("You can only challenge as yourself")]
    ChallengerMismatch,
    #[error("You can't challenge yourself")]
    SelfChallenge,
    #[error("Player is not in this game")]
    UnknownPlayer,
    #[error("Recall is only possible during the recall phase")]
    NotRecallPhase,
    #[error("It's not your turn to recall")]
    NotYourRecallTurn,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Game is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, GameError>;
