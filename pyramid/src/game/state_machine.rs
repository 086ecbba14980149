//! Host-driven phase transitions and the deferred transitions they schedule.
//!
//! ```text
//! lobby -> setup -> dealt -> memorize -> pyramid -> recall -> finished
//!            ^                                                   |
//!            +-------------------- restartGame -----------------+
//! ```

use rand::Rng;

use super::{
    dealer::{build_pyramid, deal},
    deck::shuffled_deck,
    entities::{GameAction, Phase, PlayerId},
    errors::{GameError, Result},
    session::{Deferred, DeferredKind, Effects, Session},
};
use crate::net::messages::ServerMessage;

impl Session {
    /// Leaves the lobby. Only the host can start, and only with enough
    /// players seated. The deck is shuffled here and again on restart.
    pub fn start_game<R: Rng>(&mut self, requester: PlayerId, rng: &mut R) -> Result<Effects> {
        self.require_host(requester)?;
        if self.phase != Phase::Lobby {
            return Err(GameError::CannotStart(self.phase));
        }
        if self.players.len() < self.settings.min_players {
            return Err(GameError::NotEnoughPlayers {
                min: self.settings.min_players,
            });
        }

        self.deck = shuffled_deck(rng);
        self.enter(Phase::Setup);
        log::info!(
            "Session {} started with {} players",
            self.code,
            self.players.len()
        );

        let mut effects = Effects::default();
        effects.broadcast(ServerMessage::GameStarted {
            game_state: self.view(),
        });
        Ok(effects)
    }

    /// Runs a host action. Each action is legal in exactly one phase.
    pub fn apply_action<R: Rng>(
        &mut self,
        requester: PlayerId,
        action: GameAction,
        rng: &mut R,
    ) -> Result<Effects> {
        self.require_host(requester)?;
        let mut effects = Effects::default();
        match action {
            GameAction::AutoStart => self.auto_start()?,
            GameAction::StartMemorize => self.start_memorize(&mut effects)?,
            GameAction::FlipPyramidCard => self.flip_pyramid_card(&mut effects)?,
            GameAction::StartRecall => self.start_recall(&mut effects)?,
            GameAction::RestartGame => self.restart_game(rng)?,
        }
        effects.broadcast(self.state_update());
        Ok(effects)
    }

    fn expect_phase(&self, action: GameAction, phase: Phase) -> Result<()> {
        if self.phase != phase {
            return Err(GameError::WrongPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn auto_start(&mut self) -> Result<()> {
        self.expect_phase(GameAction::AutoStart, Phase::Setup)?;
        let seating = self.player_ids();
        self.hands = deal(&mut self.deck, &seating);
        self.pyramid = build_pyramid(&mut self.deck, seating.len());
        self.flip_index = 0;
        self.current_card = None;
        self.enter(Phase::Dealt);
        Ok(())
    }

    fn start_memorize(&mut self, effects: &mut Effects) -> Result<()> {
        self.expect_phase(GameAction::StartMemorize, Phase::Dealt)?;
        self.enter(Phase::Memorize);
        effects.defer(DeferredKind::EndMemorize, self.epoch);
        Ok(())
    }

    fn flip_pyramid_card(&mut self, effects: &mut Effects) -> Result<()> {
        self.expect_phase(GameAction::FlipPyramidCard, Phase::Pyramid)?;
        if let Some(slot) = self.pyramid.get_mut(self.flip_index) {
            slot.revealed = true;
            self.current_card = Some(slot.card);
            self.flip_index += 1;
        }
        if self.flip_index >= self.pyramid.len() {
            self.recall_turn_index = 0;
            self.enter(Phase::Recall);
            effects.defer(DeferredKind::BeginRecall, self.epoch);
        }
        Ok(())
    }

    /// Resets the recital order. Pending turn announcements and a pending
    /// finish from the previous round are dropped.
    fn start_recall(&mut self, effects: &mut Effects) -> Result<()> {
        self.expect_phase(GameAction::StartRecall, Phase::Recall)?;
        self.recall_turn_index = 0;
        self.bump_epoch();
        effects.broadcast(ServerMessage::BeginRecallTurn { player_index: 0 });
        Ok(())
    }

    fn restart_game<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        self.expect_phase(GameAction::RestartGame, Phase::Finished)?;
        self.deck = shuffled_deck(rng);
        self.hands.clear();
        self.pyramid.clear();
        self.flip_index = 0;
        self.current_card = None;
        self.active_challenge = None;
        self.recall_turn_index = 0;
        self.drink_counts = self.players.iter().map(|p| (p.id, 0)).collect();
        self.enter(Phase::Setup);
        log::info!("Session {} restarted", self.code);
        Ok(())
    }

    /// Applies a deferred transition. Anything scheduled in an earlier epoch,
    /// or no longer matching the session's phase, is dropped.
    pub fn on_deferred(&mut self, deferred: Deferred) -> Effects {
        let mut effects = Effects::default();
        if deferred.epoch != self.epoch {
            log::debug!(
                "Session {}: dropping stale {:?} (epoch {} != {})",
                self.code,
                deferred.kind,
                deferred.epoch,
                self.epoch
            );
            return effects;
        }

        match deferred.kind {
            DeferredKind::EndMemorize if self.phase == Phase::Memorize => {
                self.enter(Phase::Pyramid);
                effects.broadcast(self.state_update());
            }
            DeferredKind::BeginRecall
                if self.phase == Phase::Recall && self.recall_turn_index == 0 =>
            {
                effects.broadcast(ServerMessage::BeginRecallTurn { player_index: 0 });
            }
            DeferredKind::AnnounceRecallTurn { turn }
                if self.phase == Phase::Recall
                    && self.recall_turn_index == turn
                    && turn < self.players.len() =>
            {
                effects.broadcast(ServerMessage::BeginRecallTurn { player_index: turn });
            }
            DeferredKind::FinishGame if self.phase == Phase::Recall => {
                self.enter(Phase::Finished);
                log::info!("Session {} finished", self.code);
                effects.broadcast(self.state_update());
            }
            kind => {
                log::debug!("Session {}: ignoring {:?} in {}", self.code, kind, self.phase);
            }
        }
        effects
    }
}
