//! Per-session game state.
//!
//! A [`Session`] is owned by exactly one session actor. Every operation that
//! mutates it returns [`Effects`]: the messages to deliver and the deferred
//! transitions to schedule. The operations themselves live next to the
//! component they belong to (`state_machine`, `challenge`, `recall`,
//! `roster`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    constants::{MAX_PLAYERS, MIN_PLAYERS, RECALL_PENALTY},
    entities::{
        ActiveChallenge, Card, Phase, Player, PlayerId, PyramidSlot, SessionCode,
    },
    errors::{GameError, Result},
};
use crate::net::messages::ServerMessage;

/// Tunable rules for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSettings {
    pub min_players: usize,
    pub max_players: usize,
    pub recall_penalty: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            recall_penalty: RECALL_PENALTY,
        }
    }
}

/// Who a message goes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recipient {
    One(PlayerId),
    All,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

/// Transitions that happen after a delay.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeferredKind {
    /// Memorize time is up; move to the pyramid.
    EndMemorize,
    /// The last pyramid card was revealed; announce the first reciter.
    BeginRecall,
    /// Announce the next reciter.
    AnnounceRecallTurn { turn: usize },
    /// Everybody recited; finish the game.
    FinishGame,
}

/// A deferred transition tagged with the epoch it was scheduled in. It only
/// applies if the session is still in that epoch when it fires.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deferred {
    pub kind: DeferredKind,
    pub epoch: u64,
}

/// Output of a session operation.
#[derive(Debug, Default)]
pub struct Effects {
    pub outbound: Vec<Outbound>,
    pub deferred: Vec<Deferred>,
}

impl Effects {
    pub fn send_to(&mut self, player_id: PlayerId, message: ServerMessage) {
        self.outbound.push(Outbound {
            recipient: Recipient::One(player_id),
            message,
        });
    }

    pub fn broadcast(&mut self, message: ServerMessage) {
        self.outbound.push(Outbound {
            recipient: Recipient::All,
            message,
        });
    }

    pub fn defer(&mut self, kind: DeferredKind, epoch: u64) {
        self.deferred.push(Deferred { kind, epoch });
    }

    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.deferred.is_empty()
    }

    /// Messages that `player_id` would receive, in delivery order.
    pub fn messages_for(&self, player_id: PlayerId) -> Vec<&ServerMessage> {
        self.outbound
            .iter()
            .filter(|out| match out.recipient {
                Recipient::All => true,
                Recipient::One(id) => id == player_id,
            })
            .map(|out| &out.message)
            .collect()
    }
}

/// Full state snapshot broadcast after every accepted mutation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub code: SessionCode,
    pub phase: Phase,
    pub host: PlayerId,
    pub players: Vec<PlayerId>,
    pub player_names: Vec<String>,
    pub player_hands: HashMap<PlayerId, Vec<Card>>,
    pub drink_counts: HashMap<PlayerId, u32>,
    pub pyramid_cards: Vec<PyramidSlot>,
    pub current_pyramid_card: Option<String>,
    pub flip_index: usize,
    pub recall_turn_index: usize,
}

#[derive(Debug)]
pub struct Session {
    pub(crate) code: SessionCode,
    pub(crate) host_id: PlayerId,
    /// Seating order; also the recall turn order.
    pub(crate) players: Vec<Player>,
    pub(crate) phase: Phase,
    /// Remaining cards; the top of the deck is the end of the vector.
    pub(crate) deck: Vec<Card>,
    /// Hands of departed players are kept so every card stays accounted for.
    pub(crate) hands: HashMap<PlayerId, Vec<Card>>,
    pub(crate) drink_counts: HashMap<PlayerId, u32>,
    pub(crate) pyramid: Vec<PyramidSlot>,
    pub(crate) flip_index: usize,
    pub(crate) current_card: Option<Card>,
    pub(crate) active_challenge: Option<ActiveChallenge>,
    pub(crate) recall_turn_index: usize,
    /// Bumped on every phase transition and recall reset.
    pub(crate) epoch: u64,
    pub(crate) settings: GameSettings,
}

impl Session {
    /// A new lobby with `host_id` as its only member.
    pub fn new(
        code: SessionCode,
        host_id: PlayerId,
        host_name: impl Into<String>,
        settings: GameSettings,
    ) -> Self {
        Self {
            code,
            host_id,
            players: vec![Player::new(host_id, host_name, true)],
            phase: Phase::Lobby,
            deck: Vec::new(),
            hands: HashMap::new(),
            drink_counts: HashMap::from([(host_id, 0)]),
            pyramid: Vec::new(),
            flip_index: 0,
            current_card: None,
            active_challenge: None,
            recall_turn_index: 0,
            epoch: 0,
            settings,
        }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn host_id(&self) -> PlayerId {
        self.host_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player(player_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn hand(&self, player_id: PlayerId) -> Option<&[Card]> {
        self.hands.get(&player_id).map(Vec::as_slice)
    }

    pub fn drink_count(&self, player_id: PlayerId) -> Option<u32> {
        self.drink_counts.get(&player_id).copied()
    }

    pub fn pyramid(&self) -> &[PyramidSlot] {
        &self.pyramid
    }

    pub fn flip_index(&self) -> usize {
        self.flip_index
    }

    pub fn current_card(&self) -> Option<Card> {
        self.current_card
    }

    pub fn active_challenge(&self) -> Option<&ActiveChallenge> {
        self.active_challenge.as_ref()
    }

    pub fn recall_turn_index(&self) -> usize {
        self.recall_turn_index
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Every card the session holds: deck, all hands (including departed
    /// players'), and the pyramid.
    pub fn cards_in_play(&self) -> Vec<Card> {
        let mut cards = self.deck.clone();
        for hand in self.hands.values() {
            cards.extend_from_slice(hand);
        }
        cards.extend(self.pyramid.iter().map(|slot| slot.card));
        cards
    }

    pub fn view(&self) -> GameStateView {
        let ids = self.player_ids();
        GameStateView {
            code: self.code.clone(),
            phase: self.phase,
            host: self.host_id,
            player_names: self.players.iter().map(|p| p.name.clone()).collect(),
            player_hands: ids
                .iter()
                .filter_map(|id| self.hands.get(id).map(|hand| (*id, hand.clone())))
                .collect(),
            drink_counts: ids
                .iter()
                .map(|id| (*id, self.drink_counts.get(id).copied().unwrap_or(0)))
                .collect(),
            players: ids,
            pyramid_cards: self.pyramid.clone(),
            current_pyramid_card: self.current_card.map(|card| card.to_string()),
            flip_index: self.flip_index,
            recall_turn_index: self.recall_turn_index,
        }
    }

    pub(crate) fn state_update(&self) -> ServerMessage {
        ServerMessage::GameStateUpdate {
            game_state: self.view(),
        }
    }

    pub(crate) fn require_member(&self, player_id: PlayerId) -> Result<&Player> {
        self.player(player_id).ok_or(GameError::NotInSession)
    }

    pub(crate) fn require_host(&self, player_id: PlayerId) -> Result<()> {
        self.require_member(player_id)?;
        if player_id != self.host_id {
            return Err(GameError::NotHost);
        }
        Ok(())
    }

    pub(crate) fn display_name(&self, player_id: PlayerId) -> String {
        self.player(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Someone".to_string())
    }

    pub(crate) fn add_drinks(&mut self, player_id: PlayerId, drinks: u32) {
        *self.drink_counts.entry(player_id).or_insert(0) += drinks;
    }

    /// Moves to `phase` and starts a new epoch, invalidating pending timers.
    pub(crate) fn enter(&mut self, phase: Phase) {
        log::debug!("Session {}: {} -> {}", self.code, self.phase, phase);
        self.phase = phase;
        self.bump_epoch();
    }

    pub(crate) fn bump_epoch(&mut self) {
        self.epoch += 1;
    }
}
