//! Dealing hands and laying out the pyramid.

use std::collections::HashMap;

use super::{
    constants::{DEFAULT_PYRAMID_ROWS, HAND_SIZE, PYRAMID_SHRINK_THRESHOLD},
    entities::{Card, PlayerId, PyramidSlot},
};

/// Number of pyramid rows for a table of `player_count` players.
pub fn pyramid_rows(player_count: usize) -> usize {
    if player_count < PYRAMID_SHRINK_THRESHOLD {
        DEFAULT_PYRAMID_ROWS
    } else {
        PYRAMID_SHRINK_THRESHOLD.saturating_sub(player_count).max(1)
    }
}

/// Pops [`HAND_SIZE`] cards off the top of `deck` for each player, in seating
/// order. Hands come up short rather than failing if the deck runs out.
pub fn deal(deck: &mut Vec<Card>, seating: &[PlayerId]) -> HashMap<PlayerId, Vec<Card>> {
    let mut hands = HashMap::with_capacity(seating.len());
    for &player_id in seating {
        let mut hand = Vec::with_capacity(HAND_SIZE);
        for _ in 0..HAND_SIZE {
            match deck.pop() {
                Some(card) => hand.push(card),
                None => break,
            }
        }
        hands.insert(player_id, hand);
    }
    hands
}

/// Builds the pyramid top row first; row `r` (1-based) holds `r` cards.
pub fn build_pyramid(deck: &mut Vec<Card>, player_count: usize) -> Vec<PyramidSlot> {
    let rows = pyramid_rows(player_count);
    let mut slots = Vec::with_capacity(rows * (rows + 1) / 2);
    for row in 1..=rows {
        for position in 0..row {
            if let Some(card) = deck.pop() {
                slots.push(PyramidSlot::new(card, row, position));
            }
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::deck::new_deck;
    use uuid::Uuid;

    #[test]
    fn test_pyramid_rows() {
        assert_eq!(pyramid_rows(3), 6);
        assert_eq!(pyramid_rows(7), 6);
        assert_eq!(pyramid_rows(8), 1);
        assert_eq!(pyramid_rows(12), 1);
    }

    #[test]
    fn test_deal_gives_four_cards_in_order() {
        let mut deck = new_deck();
        let top = deck[deck.len() - 1];
        let seating: Vec<_> = (0..3).map(|_| Uuid::new_v4()).collect();

        let hands = deal(&mut deck, &seating);

        assert_eq!(deck.len(), 52 - 12);
        assert_eq!(hands.len(), 3);
        assert!(hands.values().all(|h| h.len() == 4));
        assert_eq!(hands[&seating[0]][0], top);
    }

    #[test]
    fn test_deal_truncates_when_deck_runs_low() {
        let mut deck = new_deck();
        deck.truncate(6);
        let seating: Vec<_> = (0..2).map(|_| Uuid::new_v4()).collect();

        let hands = deal(&mut deck, &seating);

        assert!(deck.is_empty());
        assert_eq!(hands[&seating[0]].len(), 4);
        assert_eq!(hands[&seating[1]].len(), 2);
    }

    #[test]
    fn test_build_pyramid_layout() {
        let mut deck = new_deck();
        let pyramid = build_pyramid(&mut deck, 4);

        assert_eq!(pyramid.len(), 21);
        assert_eq!(deck.len(), 31);
        assert!(pyramid.iter().all(|slot| !slot.revealed));
        assert_eq!((pyramid[0].row, pyramid[0].position), (1, 0));
        assert_eq!((pyramid[1].row, pyramid[1].position), (2, 0));
        assert_eq!((pyramid[2].row, pyramid[2].position), (2, 1));
        assert_eq!((pyramid[20].row, pyramid[20].position), (6, 5));
    }
}
