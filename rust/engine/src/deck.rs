use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::horse::HorseId;

/// The draw pile. Cards come off the tail and are never put back.
///
/// ```
/// use derby_engine::deck::Deck;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha20Rng;
///
/// let mut rng = ChaCha20Rng::seed_from_u64(42);
/// let mut deck = Deck::shuffled([0, 1, 2], 5, &mut rng);
/// assert_eq!(deck.remaining(), 15);
///
/// let peeked = deck.peek(2);
/// assert_eq!(deck.draw(2), peeked);
/// assert_eq!(deck.remaining(), 13);
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<HorseId>,
}

impl Deck {
    /// Every id repeated `cards_per_horse` times, in id order.
    pub fn ordered<I>(ids: I, cards_per_horse: u32) -> Self
    where
        I: IntoIterator<Item = HorseId>,
    {
        let ids = ids.into_iter();
        let mut cards = Vec::with_capacity(ids.size_hint().0 * cards_per_horse as usize);
        for id in ids {
            cards.extend(std::iter::repeat_n(id, cards_per_horse as usize));
        }
        Self { cards }
    }

    /// Builds the deck and applies a uniform Fisher-Yates permutation.
    pub fn shuffled<I, R>(ids: I, cards_per_horse: u32, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = HorseId>,
        R: Rng + ?Sized,
    {
        let mut deck = Self::ordered(ids, cards_per_horse);
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// The ids the next `n` draws would produce, without removing them.
    /// Returns fewer than `n` when the deck runs short.
    pub fn peek(&self, n: usize) -> Vec<HorseId> {
        self.cards.iter().rev().take(n).copied().collect()
    }

    /// Pops up to `n` cards from the tail, in draw order.
    pub fn draw(&mut self, n: usize) -> Vec<HorseId> {
        let keep = self.cards.len().saturating_sub(n);
        let mut drawn = self.cards.split_off(keep);
        drawn.reverse();
        drawn
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards bottom to top; the last element is drawn next.
    pub fn cards(&self) -> &[HorseId] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn ordered_deck_groups_by_horse() {
        let deck = Deck::ordered([0, 1], 3);
        assert_eq!(deck.cards(), &[0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn draw_pops_from_tail() {
        let mut deck = Deck::ordered([0, 1, 2], 1);
        assert_eq!(deck.draw(2), vec![2, 1]);
        assert_eq!(deck.cards(), &[0]);
    }

    #[test]
    fn underflow_draws_what_is_left() {
        let mut deck = Deck::ordered([4], 2);
        assert_eq!(deck.peek(5), vec![4, 4]);
        assert_eq!(deck.draw(5), vec![4, 4]);
        assert!(deck.is_empty());
        assert!(deck.draw(1).is_empty());
    }

    #[test]
    fn shuffle_keeps_every_card() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let deck = Deck::shuffled(0..4, 6, &mut rng);
        for id in 0..4 {
            assert_eq!(deck.cards().iter().filter(|&&c| c == id).count(), 6);
        }
    }
}
