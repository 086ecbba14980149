//! Joining, leaving, and table chat.

use super::{
    entities::{Phase, Player, PlayerId},
    errors::{GameError, Result},
    session::{DeferredKind, Effects, Session},
};
use crate::net::messages::ServerMessage;

impl Session {
    /// Seats a new player. Joining is only possible from the lobby.
    pub fn join(&mut self, player_id: PlayerId, name: impl Into<String>) -> Result<Effects> {
        if self.contains(player_id) {
            return Err(GameError::AlreadyJoined);
        }
        if self.players.len() >= self.settings.max_players {
            return Err(GameError::SessionFull);
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::AlreadyStarted);
        }

        let player = Player::new(player_id, name, false);
        log::info!("{} joined session {}", player.name, self.code);
        self.players.push(player);
        self.drink_counts.insert(player_id, 0);

        let mut effects = Effects::default();
        effects.send_to(
            player_id,
            ServerMessage::GameJoined {
                game_code: self.code.clone(),
                player_id,
                players: self.players.clone(),
            },
        );
        effects.broadcast(ServerMessage::PlayerJoined {
            players: self.players.clone(),
        });
        Ok(effects)
    }

    /// Removes a departed player.
    ///
    /// The host role passes to the first remaining player. A challenge
    /// involving the player is cancelled. During recall the turn order is
    /// adjusted so nobody is skipped, and the next reciter is announced
    /// again after the usual delay. If nobody is left to recite, the game is
    /// scheduled to finish.
    ///
    /// The player's hand and drink count stay with the session so the
    /// 52 cards remain accounted for. When the last player leaves no
    /// messages are produced; check [`Session::is_empty`].
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<Effects> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::NotInSession)?;
        let departed = self.players.remove(index);
        log::info!("{} left session {}", departed.name, self.code);

        let mut effects = Effects::default();
        if self.players.is_empty() {
            self.active_challenge = None;
            return Ok(effects);
        }

        if departed.is_host {
            let heir = &mut self.players[0];
            heir.is_host = true;
            self.host_id = heir.id;
            log::info!("{} is now hosting session {}", heir.name, self.code);
        }

        if self
            .active_challenge
            .is_some_and(|c| c.accuser_id == player_id || c.target_id == player_id)
        {
            self.active_challenge = None;
            effects.broadcast(ServerMessage::ChallengeResult {
                message: format!("{} left; the challenge is off.", departed.name),
                reveal: None,
            });
        }

        // A departure at or before the current turn shifts who is due next,
        // so pending announcements are reissued for the new index.
        if self.phase == Phase::Recall && index <= self.recall_turn_index {
            if index < self.recall_turn_index {
                self.recall_turn_index -= 1;
            }
            self.bump_epoch();
            if self.recall_turn_index < self.players.len() {
                effects.defer(
                    DeferredKind::AnnounceRecallTurn {
                        turn: self.recall_turn_index,
                    },
                    self.epoch,
                );
            } else {
                effects.defer(DeferredKind::FinishGame, self.epoch);
            }
        }

        effects.broadcast(ServerMessage::PlayerLeft {
            players: self.players.clone(),
        });
        effects.broadcast(self.state_update());
        Ok(effects)
    }

    /// Relays a chat line to everyone at the table.
    pub fn chat(&self, requester: PlayerId, message: &str) -> Result<Effects> {
        let player = self.require_member(requester)?;
        let message = message.trim();
        if message.is_empty() {
            return Err(GameError::EmptyMessage);
        }

        let mut effects = Effects::default();
        effects.broadcast(ServerMessage::NewChatMessage {
            player_id: requester,
            player_name: player.name.clone(),
            message: message.to_string(),
        });
        Ok(effects)
    }
}
