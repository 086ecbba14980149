//! The challenge sub-protocol.
//!
//! Once a pyramid card is showing, any player may claim to hold its rank and
//! point at someone else. The target either drinks or calls the bluff; a
//! called bluff is settled by the accuser proving the card or not.
//!
//! | reply       | accuser proves it holds the rank | result              |
//! |-------------|----------------------------------|---------------------|
//! | `accept`    | -                                | target +1           |
//! | `challenge` | yes                              | target +2, revealed |
//! | `challenge` | no (bluff or wrong rank)         | accuser +1          |

use super::{
    constants::{ACCEPT_PENALTY, BLUFF_PENALTY, PROVEN_PENALTY},
    entities::{ActiveChallenge, Card, ChallengeReply, PlayerId, Rank},
    errors::{GameError, Result},
    session::{Effects, Session},
};
use crate::net::messages::{ChallengeReveal, ServerMessage};

impl Session {
    /// Opens a challenge. `challenger_id` must be the requester itself and the
    /// target must be another member of the session.
    pub fn challenge(
        &mut self,
        requester: PlayerId,
        challenger_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<Effects> {
        self.require_member(requester)?;
        if challenger_id != requester {
            return Err(GameError::ChallengerMismatch);
        }
        if target_id == requester {
            return Err(GameError::SelfChallenge);
        }
        if !self.contains(target_id) {
            return Err(GameError::UnknownPlayer);
        }
        if self.current_card.is_none() {
            return Err(GameError::NoCardRevealed);
        }
        if self.active_challenge.is_some() {
            return Err(GameError::ChallengeAlreadyActive);
        }

        self.active_challenge = Some(ActiveChallenge {
            accuser_id: challenger_id,
            target_id,
            contested_rank: None,
        });
        log::debug!(
            "Session {}: {} challenges {}",
            self.code,
            challenger_id,
            target_id
        );

        let mut effects = Effects::default();
        effects.send_to(
            target_id,
            ServerMessage::ChallengeReceived {
                challenger_id,
                target_id,
            },
        );
        Ok(effects)
    }

    /// The target's answer. Only the target may answer, and only once.
    pub fn respond_to_challenge(
        &mut self,
        requester: PlayerId,
        reply: ChallengeReply,
    ) -> Result<Effects> {
        let challenge = self
            .active_challenge
            .ok_or(GameError::NoActiveChallenge)?;
        if requester != challenge.target_id {
            return Err(GameError::NotChallengeTarget);
        }
        if challenge.contested_rank.is_some() {
            return Err(GameError::ChallengeAlreadyContested);
        }

        let target = self.display_name(challenge.target_id);
        let accuser = self.display_name(challenge.accuser_id);
        let mut effects = Effects::default();
        match reply {
            ChallengeReply::Accept => {
                self.add_drinks(challenge.target_id, ACCEPT_PENALTY);
                self.active_challenge = None;
                effects.broadcast(ServerMessage::ChallengeResult {
                    message: format!("{target} accepted {accuser}'s challenge and drinks!"),
                    reveal: None,
                });
                effects.broadcast(self.state_update());
            }
            ChallengeReply::Challenge => {
                let rank = self
                    .current_card
                    .map(|card| card.rank)
                    .ok_or(GameError::NoCardRevealed)?;
                self.active_challenge = Some(ActiveChallenge {
                    contested_rank: Some(rank),
                    ..challenge
                });
                effects.broadcast(ServerMessage::ChallengeResult {
                    message: format!("{target} doesn't believe {accuser}!"),
                    reveal: None,
                });
                effects.send_to(
                    challenge.accuser_id,
                    ServerMessage::ProveYourCard { card_value: rank },
                );
            }
        }
        Ok(effects)
    }

    /// Settles a contested challenge. The accuser holds the card only if the
    /// claimed rank is the contested one and its hand really contains it.
    pub fn prove_card(&mut self, requester: PlayerId, claimed: Rank, proved: bool) -> Result<Effects> {
        let challenge = self
            .active_challenge
            .ok_or(GameError::NoActiveChallenge)?;
        if requester != challenge.accuser_id {
            return Err(GameError::NotChallengeAccuser);
        }
        let contested = challenge
            .contested_rank
            .ok_or(GameError::ChallengeNotContested)?;

        let matching: Vec<Card> = self
            .hand(challenge.accuser_id)
            .unwrap_or_default()
            .iter()
            .filter(|card| card.rank == contested)
            .copied()
            .collect();
        let holds = claimed == contested && !matching.is_empty();

        self.active_challenge = None;
        let target = self.display_name(challenge.target_id);
        let accuser = self.display_name(challenge.accuser_id);
        let mut effects = Effects::default();

        if proved && holds {
            self.add_drinks(challenge.target_id, PROVEN_PENALTY);
            effects.broadcast(ServerMessage::ChallengeResult {
                message: format!("{accuser} had the {contested}! {target} drinks {PROVEN_PENALTY}."),
                reveal: Some(ChallengeReveal {
                    player_id: challenge.accuser_id,
                    card_value: contested,
                    cards: matching,
                }),
            });
        } else {
            self.add_drinks(challenge.accuser_id, BLUFF_PENALTY);
            effects.broadcast(ServerMessage::ChallengeResult {
                message: format!("{accuser} was bluffing and drinks!"),
                reveal: None,
            });
        }
        log::debug!(
            "Session {}: challenge settled, accuser held card: {}",
            self.code,
            proved && holds
        );
        effects.broadcast(self.state_update());
        Ok(effects)
    }
}
