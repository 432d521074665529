//! Player decks

use crate::core::Card;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::sync::Arc;

/// Ordered draw pile owned by one player
///
/// Built by cloning the template list and shuffling it. The front of the
/// queue is the top of the deck.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: VecDeque<Arc<Card>>,
}

impl Deck {
    /// Build an unshuffled deck in template order
    pub fn from_templates(templates: &[Arc<Card>]) -> Self {
        Deck {
            cards: templates.iter().cloned().collect(),
        }
    }

    /// Build a deck from the templates and shuffle it
    pub fn shuffled(templates: &[Arc<Card>], rng: &mut impl rand::Rng) -> Self {
        let mut deck = Self::from_templates(templates);
        deck.shuffle(rng);
        deck
    }

    /// Uniform Fisher-Yates shuffle
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// Draw from the top; `None` when the deck is exhausted
    pub fn draw(&mut self) -> Option<Arc<Card>> {
        self.cards.pop_front()
    }

    pub fn peek(&self) -> Option<&Arc<Card>> {
        self.cards.front()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Card>> {
        self.cards.iter()
    }
}
