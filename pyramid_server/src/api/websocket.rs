//! WebSocket handler for the game protocol.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`; the connection gets a fresh player ID
//! 2. Server spawns a send task draining the connection's outbox
//! 3. Each text frame is rate limited, decoded, and routed to a session
//! 4. On disconnect the player leaves its session and the send task stops
//!
//! A connection is in at most one session. Requests that fail come back to
//! the sender alone as `{"type": "error", "message": ...}`; everything else
//! arrives through the session's broadcasts.
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3000/ws');
//! ws.send(JSON.stringify({ type: "hostGame", playerName: "Sam" }));
//! // <- {"type":"gameCreated","gameCode":"K3Q9ZD","playerId":"...","players":[...]}
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use pyramid::{
    ClientMessage, GameError, ServerMessage,
    entities::{PlayerId, SessionCode},
    session::{Outbox, SessionCommand},
};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{AppState, rate_limiter::MessageLimiter};
use crate::metrics;

/// Upgrade an HTTP connection to the game protocol.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// # Arguments
///
/// - `socket`: The WebSocket connection
/// - `state`: Shared application state
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let player_id = Uuid::new_v4();

    info!("WebSocket connected: player={}", player_id);
    metrics::websocket_connected();

    let mut limiter = MessageLimiter::new(&state.config.rate_limit);

    // Session broadcasts and direct error replies share one queue so they
    // reach the socket in order
    let (outbox, mut outbox_rx) = mpsc::channel::<ServerMessage>(state.config.outbox_capacity);

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            let json = match message.encode() {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut joined: Option<SessionCode> = None;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(throttle) = limiter.check() {
                    warn!(
                        "{} rate limit exceeded for player {}. Blocking message.",
                        throttle.label(),
                        player_id
                    );
                    metrics::websocket_rejected(throttle.label());
                    if outbox.send(ServerMessage::error(throttle.message())).await.is_err() {
                        break;
                    }
                    continue;
                }

                let client_msg = match ClientMessage::decode(text.as_str()) {
                    Ok(client_msg) => client_msg,
                    Err(e) => {
                        warn!("Failed to parse message from player {}: {}", player_id, e);
                        metrics::websocket_rejected("malformed");
                        if outbox.send(ServerMessage::error(e)).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                debug!("Received {} from player {}", client_msg.kind(), player_id);
                metrics::websocket_message(client_msg.kind());

                if let Err(e) =
                    handle_client_message(client_msg, player_id, &mut joined, &outbox, &state).await
                {
                    metrics::websocket_rejected("refused");
                    if outbox.send(ServerMessage::error(e)).await.is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: player={}", player_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup - leave the session on disconnect
    if let Some(code) = joined {
        state.sessions.disconnect(&code, player_id).await;
        metrics::sessions_active(state.sessions.session_count().await);
    }

    send_task.abort();
    metrics::websocket_disconnected();

    info!("WebSocket disconnected: player={}", player_id);
}

/// Apply one client message on behalf of `player_id`.
///
/// # Arguments
///
/// - `msg`: Decoded client message
/// - `player_id`: Connection's player ID
/// - `joined`: Session this connection belongs to, if any
/// - `outbox`: Connection's outbound queue, handed to the session on host/join
/// - `state`: Application state with the session registry
///
/// # Returns
///
/// - `Ok(())`: Applied; results arrive through session broadcasts
/// - `Err(GameError)`: Refused; to be reported to this connection only
async fn handle_client_message(
    msg: ClientMessage,
    player_id: PlayerId,
    joined: &mut Option<SessionCode>,
    outbox: &Outbox,
    state: &AppState,
) -> Result<(), GameError> {
    match msg {
        ClientMessage::HostGame { player_name } => {
            if joined.is_some() {
                return Err(GameError::AlreadyJoined);
            }
            let handle = state
                .sessions
                .create_session(player_id, player_name, outbox.clone())
                .await?;
            info!("Player {} is hosting session {}", player_id, handle.code());
            *joined = Some(handle.code().clone());
            metrics::session_created();
            metrics::sessions_active(state.sessions.session_count().await);
            Ok(())
        }

        ClientMessage::JoinGame {
            game_code,
            player_name,
        } => {
            if joined.is_some() {
                return Err(GameError::AlreadyJoined);
            }
            state
                .sessions
                .join_session(&game_code, player_id, player_name, outbox.clone())
                .await?;
            *joined = Some(game_code);
            Ok(())
        }

        other => match session_command(other) {
            Some((code, command)) => state.sessions.submit(&code, player_id, command).await,
            None => Ok(()),
        },
    }
}

/// Map a request against an existing session to its session command.
/// Host and join requests have no command form.
fn session_command(msg: ClientMessage) -> Option<(SessionCode, SessionCommand)> {
    let routed = match msg {
        ClientMessage::HostGame { .. } | ClientMessage::JoinGame { .. } => return None,
        ClientMessage::StartGame { game_code } => (game_code, SessionCommand::StartGame),
        ClientMessage::GameAction { game_code, action } => {
            (game_code, SessionCommand::Action(action))
        }
        ClientMessage::Challenge {
            game_code,
            challenger_id,
            target_id,
        } => (
            game_code,
            SessionCommand::Challenge {
                challenger_id,
                target_id,
            },
        ),
        ClientMessage::ChallengeResponse {
            game_code,
            response,
        } => (game_code, SessionCommand::Respond(response)),
        ClientMessage::ProveCard {
            game_code,
            card_value,
            proved,
        } => (
            game_code,
            SessionCommand::Prove {
                rank: card_value,
                proved,
            },
        ),
        ClientMessage::VerifyCardRecall {
            game_code,
            player_id,
            recalled_cards,
        } => (
            game_code,
            SessionCommand::VerifyRecall {
                player_id,
                recalled: recalled_cards,
            },
        ),
        ClientMessage::ChatMessage { game_code, message } => {
            (game_code, SessionCommand::Chat { message })
        }
    };
    Some(routed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyramid::entities::{ChallengeReply, GameAction};

    fn code() -> SessionCode {
        SessionCode::new("ABC123")
    }

    #[test]
    fn test_host_and_join_have_no_command() {
        assert!(session_command(ClientMessage::HostGame {
            player_name: "Sam".to_string()
        })
        .is_none());
        assert!(session_command(ClientMessage::JoinGame {
            game_code: code(),
            player_name: "Sam".to_string()
        })
        .is_none());
    }

    #[test]
    fn test_game_requests_route_to_their_session() {
        let (routed, command) = session_command(ClientMessage::GameAction {
            game_code: code(),
            action: GameAction::FlipPyramidCard,
        })
        .unwrap();
        assert_eq!(routed, code());
        assert!(matches!(
            command,
            SessionCommand::Action(GameAction::FlipPyramidCard)
        ));

        let (_, command) = session_command(ClientMessage::ChallengeResponse {
            game_code: code(),
            response: ChallengeReply::Accept,
        })
        .unwrap();
        assert!(matches!(
            command,
            SessionCommand::Respond(ChallengeReply::Accept)
        ));
    }

    #[test]
    fn test_recital_passed_through_verbatim() {
        let player = Uuid::new_v4();
        let (_, command) = session_command(ClientMessage::VerifyCardRecall {
            game_code: code(),
            player_id: player,
            recalled_cards: "ace 5 king".to_string(),
        })
        .unwrap();
        match command {
            SessionCommand::VerifyRecall {
                player_id,
                recalled,
            } => {
                assert_eq!(player_id, player);
                assert_eq!(recalled, "ace 5 king");
            }
            other => panic!("unexpected {}", other.name()),
        }
    }
}
