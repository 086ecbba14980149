//! Recital checking.
//!
//! Players recite their hand as free text, e.g. "ace 5 king 2". Order does
//! not matter and suits are never compared.

use super::{
    entities::{Card, Phase, PlayerId},
    errors::{GameError, Result},
    session::{DeferredKind, Effects, Session},
};
use crate::net::messages::ServerMessage;

/// Splits a recital into rank tokens on whitespace and commas. Tokens are
/// upper-cased and rank words are mapped to their short form; anything else
/// passes through unchanged.
pub fn parse_recalled_cards(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| canonical_token(&token.to_uppercase()))
        .collect()
}

fn canonical_token(token: &str) -> String {
    let short = match token {
        "ACE" => "A",
        "TWO" => "2",
        "THREE" => "3",
        "FOUR" => "4",
        "FIVE" => "5",
        "SIX" => "6",
        "SEVEN" => "7",
        "EIGHT" => "8",
        "NINE" => "9",
        "TEN" => "10",
        "JACK" => "J",
        "QUEEN" => "Q",
        "KING" => "K",
        other => other,
    };
    short.to_string()
}

/// Whether `recital` names exactly the ranks in `hand`, as a multiset.
pub fn recall_matches(hand: &[Card], recital: &str) -> bool {
    let mut actual: Vec<&str> = hand.iter().map(|card| card.rank.token()).collect();
    let mut recalled = parse_recalled_cards(recital);
    actual.sort_unstable();
    recalled.sort_unstable();
    actual.len() == recalled.len() && actual.iter().zip(&recalled).all(|(a, b)| *a == b.as_str())
}

impl Session {
    /// Checks the current reciter's recital. A wrong recital (or a missing
    /// hand) costs the recall penalty; either way the turn passes on.
    pub fn verify_recall(
        &mut self,
        requester: PlayerId,
        player_id: PlayerId,
        recital: &str,
    ) -> Result<Effects> {
        self.require_member(requester)?;
        if self.phase != Phase::Recall {
            return Err(GameError::NotRecallPhase);
        }
        let reciter = self
            .players
            .get(self.recall_turn_index)
            .ok_or(GameError::NotYourRecallTurn)?;
        if requester != player_id || reciter.id != player_id {
            return Err(GameError::NotYourRecallTurn);
        }
        let player_name = reciter.name.clone();

        let correct = self
            .hands
            .get(&player_id)
            .is_some_and(|hand| recall_matches(hand, recital));
        if !correct {
            self.add_drinks(player_id, self.settings.recall_penalty);
        }
        self.recall_turn_index += 1;
        log::debug!(
            "Session {}: {} recited {}",
            self.code,
            player_name,
            if correct { "correctly" } else { "wrongly" }
        );

        let mut effects = Effects::default();
        effects.broadcast(ServerMessage::CardRecallResult {
            player_name,
            correct,
            next_player_index: self.recall_turn_index,
        });
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
        effects.broadcast(self.state_update());
        Ok(effects)
    }
}
