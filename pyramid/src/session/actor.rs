//! Session actor implementation with async message handling.

use super::{
    config::SessionConfig,
    messages::{Outbox, SessionCommand, SessionMessage},
};
use crate::{
    game::{
        Deferred, DeferredKind, Effects, GameStateView, Recipient, Session,
        entities::{PlayerId, SessionCode},
        errors::{GameError, Result},
    },
    net::messages::ServerMessage,
};
use rand::rngs::StdRng;
use std::collections::HashMap;
use tokio::{
    sync::{mpsc, oneshot},
    time::Duration,
};

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    code: SessionCode,
}

impl SessionHandle {
    /// Create a new session handle
    pub fn new(sender: mpsc::Sender<SessionMessage>, code: SessionCode) -> Self {
        Self { sender, code }
    }

    /// Get session code
    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> Result<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::SessionClosed)
    }

    /// Seat a player and route its messages to `outbox`
    pub async fn join(&self, player_id: PlayerId, name: String, outbox: Outbox) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::Join {
            player_id,
            name,
            outbox,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| GameError::SessionClosed)?
    }

    /// Run a player request
    pub async fn command(&self, requester: PlayerId, command: SessionCommand) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::Command {
            requester,
            command,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| GameError::SessionClosed)?
    }

    /// Report a closed connection
    ///
    /// # Returns
    ///
    /// * `bool` - Whether the session is now empty (or already gone)
    pub async fn disconnect(&self, player_id: PlayerId) -> bool {
        let (tx, rx) = oneshot::channel();
        if self
            .send(SessionMessage::Disconnect {
                player_id,
                response: tx,
            })
            .await
            .is_err()
        {
            return true;
        }
        rx.await.unwrap_or(true)
    }

    /// Get the current snapshot
    pub async fn state(&self) -> Option<GameStateView> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::GetState { response: tx })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Stop the actor
    pub async fn close(&self) {
        let _ = self.send(SessionMessage::Close).await;
    }
}

/// Session actor owning a single game session
pub struct SessionActor {
    /// Game state
    session: Session,

    /// Timer configuration
    config: SessionConfig,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Weak sender handed to timers so pending timers don't keep the actor alive
    timer_sender: mpsc::WeakSender<SessionMessage>,

    /// Outboxes of seated players
    subscribers: HashMap<PlayerId, Outbox>,

    rng: StdRng,

    /// Is session closed
    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor with the host already seated
    ///
    /// # Arguments
    ///
    /// * `code` - Session code
    /// * `host_id` - Connection ID of the host
    /// * `host_name` - Host display name
    /// * `host_outbox` - Where the host's messages go
    /// * `config` - Session configuration
    /// * `rng` - Source of shuffles
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(
        code: SessionCode,
        host_id: PlayerId,
        host_name: String,
        host_outbox: Outbox,
        config: SessionConfig,
        rng: StdRng,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);
        let session = Session::new(code.clone(), host_id, host_name, config.game.clone());

        let actor = Self {
            session,
            config,
            inbox,
            timer_sender: sender.downgrade(),
            subscribers: HashMap::from([(host_id, host_outbox)]),
            rng,
            is_closed: false,
        };

        (actor, SessionHandle::new(sender, code))
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!("Session {} starting", self.session.code());

        let host_id = self.session.host_id();
        self.send_to(
            host_id,
            ServerMessage::GameCreated {
                game_code: self.session.code().clone(),
                player_id: host_id,
                players: self.session.players().to_vec(),
            },
        );

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Session {} closed", self.session.code());
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Join {
                player_id,
                name,
                outbox,
                response,
            } => {
                let result = self.session.join(player_id, name).map(|effects| {
                    self.subscribers.insert(player_id, outbox);
                    self.deliver(effects);
                });
                let _ = response.send(result);
            }

            SessionMessage::Command {
                requester,
                command,
                response,
            } => {
                let name = command.name();
                let result = self.handle_command(requester, command).map(|effects| {
                    self.deliver(effects);
                });
                if let Err(ref e) = result {
                    log::debug!(
                        "Session {}: rejected {} from {}: {}",
                        self.session.code(),
                        name,
                        requester,
                        e
                    );
                }
                let _ = response.send(result);
            }

            SessionMessage::Disconnect {
                player_id,
                response,
            } => {
                self.subscribers.remove(&player_id);
                if let Ok(effects) = self.session.remove_player(player_id) {
                    self.deliver(effects);
                }
                let empty = self.session.is_empty();
                if empty {
                    self.is_closed = true;
                }
                let _ = response.send(empty);
            }

            SessionMessage::GetState { response } => {
                let _ = response.send(self.session.view());
            }

            SessionMessage::Deferred(deferred) => {
                let effects = self.session.on_deferred(deferred);
                self.deliver(effects);
            }

            SessionMessage::Close => {
                self.is_closed = true;
            }
        }
    }

    fn handle_command(&mut self, requester: PlayerId, command: SessionCommand) -> Result<Effects> {
        match command {
            SessionCommand::StartGame => self.session.start_game(requester, &mut self.rng),
            SessionCommand::Action(action) => {
                self.session.apply_action(requester, action, &mut self.rng)
            }
            SessionCommand::Challenge {
                challenger_id,
                target_id,
            } => self.session.challenge(requester, challenger_id, target_id),
            SessionCommand::Respond(reply) => self.session.respond_to_challenge(requester, reply),
            SessionCommand::Prove { rank, proved } => {
                self.session.prove_card(requester, rank, proved)
            }
            SessionCommand::VerifyRecall {
                player_id,
                recalled,
            } => self.session.verify_recall(requester, player_id, &recalled),
            SessionCommand::Chat { message } => self.session.chat(requester, &message),
        }
    }

    /// Send messages and start timers
    fn deliver(&mut self, effects: Effects) {
        for out in effects.outbound {
            match out.recipient {
                Recipient::One(player_id) => self.send_to(player_id, out.message),
                Recipient::All => self.broadcast(out.message),
            }
        }
        for deferred in effects.deferred {
            self.schedule(deferred);
        }
    }

    fn delay_for(&self, kind: DeferredKind) -> Duration {
        match kind {
            DeferredKind::EndMemorize => self.config.memorize_duration,
            DeferredKind::BeginRecall => self.config.recall_start_delay,
            DeferredKind::AnnounceRecallTurn { .. } => self.config.recall_turn_delay,
            DeferredKind::FinishGame => self.config.finish_delay,
        }
    }

    /// Post `deferred` back to this actor's inbox after its delay
    fn schedule(&self, deferred: Deferred) {
        let delay = self.delay_for(deferred.kind);
        let sender = self.timer_sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(SessionMessage::Deferred(deferred)).await;
            }
        });
    }

    fn send_to(&mut self, player_id: PlayerId, message: ServerMessage) {
        let Some(outbox) = self.subscribers.get(&player_id) else {
            return;
        };
        match outbox.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Player {} outbox full, dropping message", player_id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Player {} disconnected, removing outbox", player_id);
                self.subscribers.remove(&player_id);
            }
        }
    }

    /// Send a message to every seated player
    fn broadcast(&mut self, message: ServerMessage) {
        self.subscribers.retain(|player_id, outbox| {
            match outbox.try_send(message.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Player {} outbox full, dropping message", player_id);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Player {} disconnected, removing outbox", player_id);
                    false
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{GameAction, Phase};
    use rand::SeedableRng;
    use uuid::Uuid;

    fn spawn(config: SessionConfig) -> (SessionHandle, PlayerId, mpsc::Receiver<ServerMessage>) {
        let host = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(64);
        let (actor, handle) = SessionActor::new(
            SessionCode::new("ACT123"),
            host,
            "Host".to_string(),
            tx,
            config,
            StdRng::seed_from_u64(1),
        );
        tokio::spawn(actor.run());
        (handle, host, rx)
    }

    #[tokio::test]
    async fn test_host_receives_game_created() {
        let (_handle, host, mut rx) = spawn(SessionConfig::default());
        match rx.recv().await.unwrap() {
            ServerMessage::GameCreated {
                player_id, players, ..
            } => {
                assert_eq!(player_id, host);
                assert_eq!(players.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_command_reports_error() {
        let (handle, host, _rx) = spawn(SessionConfig::default());
        let err = handle
            .command(host, SessionCommand::StartGame)
            .await
            .unwrap_err();
        assert_eq!(err, GameError::NotEnoughPlayers { min: 3 });
    }

    #[tokio::test]
    async fn test_last_disconnect_stops_actor() {
        let (handle, host, _rx) = spawn(SessionConfig::default());
        assert!(handle.disconnect(host).await);
        assert!(handle.state().await.is_none());
        assert_eq!(
            handle
                .command(host, SessionCommand::Action(GameAction::AutoStart))
                .await
                .unwrap_err(),
            GameError::SessionClosed
        );
    }

    #[tokio::test]
    async fn test_send_to_stopped_session_is_typed() {
        let (handle, _host, _rx) = spawn(SessionConfig::default());
        handle.close().await;
        while !handle.is_closed() {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            handle.send(SessionMessage::Close).await.unwrap_err(),
            GameError::SessionClosed
        );
    }

    #[tokio::test]
    async fn test_state_reflects_joins() {
        let (handle, _host, _rx) = spawn(SessionConfig::default());
        let (tx, _guest_rx) = mpsc::channel(16);
        handle
            .join(Uuid::new_v4(), "Guest".to_string(), tx)
            .await
            .unwrap();
        let state = handle.state().await.unwrap();
        assert_eq!(state.phase, Phase::Lobby);
        assert_eq!(state.players.len(), 2);
    }
}
