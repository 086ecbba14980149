//! Deck construction and shuffling.

use rand::Rng;

use super::{
    constants::DECK_SIZE,
    entities::{Card, Rank, Suit},
};

/// Every rank/suit combination exactly once, suit-major.
pub fn new_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(rank, suit));
        }
    }
    deck
}

/// Fisher-Yates shuffle: walking down from the last index, swap each element
/// with a uniformly chosen element at or below it.
pub fn shuffle<T, R: Rng>(mut deck: Vec<T>, rng: &mut R) -> Vec<T> {
    for i in (1..deck.len()).rev() {
        let j = rng.random_range(0..=i);
        deck.swap(i, j);
    }
    deck
}

/// A freshly shuffled 52-card deck.
pub fn shuffled_deck<R: Rng>(rng: &mut R) -> Vec<Card> {
    shuffle(new_deck(), rng)
}
