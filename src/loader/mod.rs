//! Card and deck loaders
//!
//! Parsers for JSON card lists and plain-text deck lists, plus the
//! built-in starter set.

pub mod card;
pub mod database;
pub mod deck;

pub use card::{starter_cards, CardLoader, MAX_CARD_COST};
pub use database::CardDatabase;
pub use deck::{DeckEntry, DeckList, DeckLoader};
