//! Client and server message types.
//!
//! Every frame is a JSON object tagged by `"type"` with camelCase fields,
//! e.g. `{"type": "joinGame", "gameCode": "AB12CD", "playerName": "Sam"}`.

use serde::{Deserialize, Serialize};

use super::errors::{ProtocolError, Result};
use crate::game::{
    constants::{MAX_CHAT_LENGTH, MAX_NAME_LENGTH},
    entities::{Card, ChallengeReply, GameAction, Player, PlayerId, Rank, SessionCode},
    session::GameStateView,
};

/// Longest accepted free-text recital.
pub const MAX_RECALL_LENGTH: usize = 200;

/// A message from a client to the server.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    HostGame {
        player_name: String,
    },
    JoinGame {
        game_code: SessionCode,
        player_name: String,
    },
    StartGame {
        game_code: SessionCode,
    },
    GameAction {
        game_code: SessionCode,
        action: GameAction,
    },
    Challenge {
        game_code: SessionCode,
        challenger_id: PlayerId,
        target_id: PlayerId,
    },
    ChallengeResponse {
        game_code: SessionCode,
        response: ChallengeReply,
    },
    ProveCard {
        game_code: SessionCode,
        card_value: Rank,
        proved: bool,
    },
    VerifyCardRecall {
        game_code: SessionCode,
        player_id: PlayerId,
        recalled_cards: String,
    },
    ChatMessage {
        game_code: SessionCode,
        message: String,
    },
}

impl ClientMessage {
    /// Parses and validates a text frame. Display names come back trimmed
    /// and truncated to [`MAX_NAME_LENGTH`] characters.
    pub fn decode(text: &str) -> Result<Self> {
        let message: Self = serde_json::from_str(text)?;
        message.normalize()
    }

    fn normalize(self) -> Result<Self> {
        if let Some(code) = self.game_code()
            && !code.is_well_formed()
        {
            return Err(ProtocolError::InvalidCode(code.to_string()));
        }

        match self {
            Self::HostGame { player_name } => Ok(Self::HostGame {
                player_name: normalize_name(&player_name)?,
            }),
            Self::JoinGame {
                game_code,
                player_name,
            } => Ok(Self::JoinGame {
                game_code,
                player_name: normalize_name(&player_name)?,
            }),
            Self::VerifyCardRecall { recalled_cards, .. }
                if recalled_cards.chars().count() > MAX_RECALL_LENGTH =>
            {
                Err(ProtocolError::TooLong {
                    field: "recalledCards",
                    max: MAX_RECALL_LENGTH,
                })
            }
            Self::ChatMessage { game_code, message } => Ok(Self::ChatMessage {
                game_code,
                message: message.trim().chars().take(MAX_CHAT_LENGTH).collect(),
            }),
            other => Ok(other),
        }
    }

    /// The session a message is addressed to; `None` for `hostGame`.
    pub fn game_code(&self) -> Option<&SessionCode> {
        match self {
            Self::HostGame { .. } => None,
            Self::JoinGame { game_code, .. }
            | Self::StartGame { game_code }
            | Self::GameAction { game_code, .. }
            | Self::Challenge { game_code, .. }
            | Self::ChallengeResponse { game_code, .. }
            | Self::ProveCard { game_code, .. }
            | Self::VerifyCardRecall { game_code, .. }
            | Self::ChatMessage { game_code, .. } => Some(game_code),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HostGame { .. } => "hostGame",
            Self::JoinGame { .. } => "joinGame",
            Self::StartGame { .. } => "startGame",
            Self::GameAction { .. } => "gameAction",
            Self::Challenge { .. } => "challenge",
            Self::ChallengeResponse { .. } => "challengeResponse",
            Self::ProveCard { .. } => "proveCard",
            Self::VerifyCardRecall { .. } => "verifyCardRecall",
            Self::ChatMessage { .. } => "chatMessage",
        }
    }
}

fn normalize_name(name: &str) -> Result<String> {
    let name: String = name.trim().chars().take(MAX_NAME_LENGTH).collect();
    if name.is_empty() {
        return Err(ProtocolError::EmptyName);
    }
    Ok(name)
}

/// Cards an accuser turned over to prove a challenge.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeReveal {
    pub player_id: PlayerId,
    pub card_value: Rank,
    pub cards: Vec<Card>,
}

/// A message from the server to one or more clients.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    GameCreated {
        game_code: SessionCode,
        player_id: PlayerId,
        players: Vec<Player>,
    },
    GameJoined {
        game_code: SessionCode,
        player_id: PlayerId,
        players: Vec<Player>,
    },
    PlayerJoined {
        players: Vec<Player>,
    },
    PlayerLeft {
        players: Vec<Player>,
    },
    GameStarted {
        game_state: GameStateView,
    },
    GameStateUpdate {
        game_state: GameStateView,
    },
    ChallengeReceived {
        challenger_id: PlayerId,
        target_id: PlayerId,
    },
    ProveYourCard {
        card_value: Rank,
    },
    ChallengeResult {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reveal: Option<ChallengeReveal>,
    },
    CardRecallResult {
        player_name: String,
        correct: bool,
        next_player_index: usize,
    },
    BeginRecallTurn {
        player_index: usize,
    },
    NewChatMessage {
        player_id: PlayerId,
        player_name: String,
        message: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl ToString) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_decode_host_game_trims_name() {
        let msg = ClientMessage::decode(r#"{"type":"hostGame","playerName":"  Ana  "}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::HostGame {
                player_name: "Ana".to_string()
            }
        );
    }

    #[test]
    fn test_decode_truncates_long_names() {
        let long = "x".repeat(50);
        let text = json!({"type": "hostGame", "playerName": long}).to_string();
        match ClientMessage::decode(&text).unwrap() {
            ClientMessage::HostGame { player_name } => {
                assert_eq!(player_name.chars().count(), MAX_NAME_LENGTH)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_blank_name() {
        let err = ClientMessage::decode(r#"{"type":"joinGame","gameCode":"ABC123","playerName":"   "}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::EmptyName));
    }

    #[test]
    fn test_decode_normalizes_code() {
        let msg = ClientMessage::decode(r#"{"type":"startGame","gameCode":"abc123"}"#).unwrap();
        assert_eq!(msg.game_code().unwrap().as_str(), "ABC123");
    }

    #[test]
    fn test_decode_rejects_bad_code() {
        let err = ClientMessage::decode(r#"{"type":"startGame","gameCode":"no"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidCode(_)));
    }

    #[test]
    fn test_decode_rejects_unknown_action() {
        let err = ClientMessage::decode(
            r#"{"type":"gameAction","gameCode":"ABC123","action":"dealEverything"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(ClientMessage::decode(r#"{"type":"cheat"}"#).is_err());
        assert!(ClientMessage::decode("not json").is_err());
    }

    #[test]
    fn test_decode_every_documented_message() {
        let id = Uuid::new_v4();
        let frames = [
            json!({"type": "hostGame", "playerName": "a"}),
            json!({"type": "joinGame", "gameCode": "ABC123", "playerName": "b"}),
            json!({"type": "startGame", "gameCode": "ABC123"}),
            json!({"type": "gameAction", "gameCode": "ABC123", "action": "autoStart"}),
            json!({"type": "gameAction", "gameCode": "ABC123", "action": "startMemorize"}),
            json!({"type": "gameAction", "gameCode": "ABC123", "action": "flipPyramidCard"}),
            json!({"type": "gameAction", "gameCode": "ABC123", "action": "startRecall"}),
            json!({"type": "gameAction", "gameCode": "ABC123", "action": "restartGame"}),
            json!({"type": "challenge", "gameCode": "ABC123", "challengerId": id, "targetId": id}),
            json!({"type": "challengeResponse", "gameCode": "ABC123", "response": "accept"}),
            json!({"type": "challengeResponse", "gameCode": "ABC123", "response": "challenge"}),
            json!({"type": "proveCard", "gameCode": "ABC123", "cardValue": "10", "proved": true}),
            json!({"type": "verifyCardRecall", "gameCode": "ABC123", "playerId": id, "recalledCards": "A 2 3 4"}),
            json!({"type": "chatMessage", "gameCode": "ABC123", "message": "hi"}),
        ];
        for frame in frames {
            let text = frame.to_string();
            assert!(ClientMessage::decode(&text).is_ok(), "failed to decode {text}");
        }
    }

    #[test]
    fn test_decode_rejects_invalid_rank() {
        let text = r#"{"type":"proveCard","gameCode":"ABC123","cardValue":"11","proved":true}"#;
        assert!(ClientMessage::decode(text).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_recital() {
        let text = json!({
            "type": "verifyCardRecall",
            "gameCode": "ABC123",
            "playerId": Uuid::new_v4(),
            "recalledCards": "A ".repeat(200),
        })
        .to_string();
        assert!(matches!(
            ClientMessage::decode(&text).unwrap_err(),
            ProtocolError::TooLong { .. }
        ));
    }

    #[test]
    fn test_server_message_tags() {
        let msg = ServerMessage::BeginRecallTurn { player_index: 2 };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "beginRecallTurn", "playerIndex": 2})
        );

        let msg = ServerMessage::error("Game not found");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "error", "message": "Game not found"})
        );
    }

    #[test]
    fn test_challenge_result_omits_missing_reveal() {
        let msg = ServerMessage::ChallengeResult {
            message: "x".to_string(),
            reveal: None,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value.get("reveal").is_none());
    }
}
