//! Card database for looking up card templates
//!
//! Provides case-insensitive lookup of card templates by name and turns
//! deck lists into playable card sequences.

use crate::core::Card;
use crate::loader::card::CardLoader;
use crate::loader::deck::DeckList;
use crate::{GameError, Result};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

/// Database of card templates keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct CardDatabase {
    cards: FxHashMap<String, Arc<Card>>,
}

impl CardDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a card list; later duplicates replace earlier ones
    pub fn from_cards(cards: &[Arc<Card>]) -> Self {
        let mut db = Self::new();
        for card in cards {
            db.add_card(Arc::clone(card));
        }
        db
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        Ok(Self::from_cards(&CardLoader::load_from_file(path)?))
    }

    pub fn add_card(&mut self, card: Arc<Card>) {
        self.cards.insert(card.name.as_str().to_lowercase(), card);
    }

    /// Look up a card by name (case-insensitive)
    pub fn get_card(&self, name: &str) -> Option<&Arc<Card>> {
        self.cards.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Expand a deck list into card references, in list order
    pub fn build_deck(&self, list: &DeckList) -> Result<Vec<Arc<Card>>> {
        let mut deck = Vec::with_capacity(list.total_cards());
        for entry in &list.entries {
            let card = self
                .get_card(&entry.card_name)
                .ok_or_else(|| GameError::InvalidCardData(format!("unknown card '{}'", entry.card_name)))?;
            deck.extend(std::iter::repeat(card).take(entry.count as usize).cloned());
        }
        Ok(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{starter_cards, DeckLoader};

    #[test]
    fn test_lookup_is_case_insensitive() {
        let db = CardDatabase::from_cards(&starter_cards());
        assert_eq!(db.len(), 16);
        assert!(db.contains("fireball"));
        assert_eq!(db.get_card("IRON SWORD").unwrap().cost, 2);
        assert!(db.get_card("Dragon").is_none());
    }

    #[test]
    fn test_build_deck() {
        let db = CardDatabase::from_cards(&starter_cards());
        let list = DeckLoader::parse("3 Footman\n2 Fireball\n").unwrap();
        let deck = db.build_deck(&list).unwrap();
        assert_eq!(deck.len(), 5);
        assert!(Arc::ptr_eq(&deck[0], &deck[2]));

        let bad = DeckLoader::parse("1 Dragon").unwrap();
        assert!(matches!(db.build_deck(&bad), Err(GameError::InvalidCardData(_))));
    }
}
