//! Card and deck loading tests
//!
//! Loads the card and deck files shipped with the repository and checks
//! they resolve into playable decks.

use grid_tactics::core::{Archetype, CardEffect, CardType};
use grid_tactics::loader::{starter_cards, CardDatabase, CardLoader, DeckLoader};
use grid_tactics::{GameError, Result};
use std::path::PathBuf;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn test_load_frontier_cards() -> Result<()> {
    let cards = CardLoader::load_from_file(&repo_path("cards/frontier.json"))?;
    assert_eq!(cards.len(), 8);

    let scout = &cards[0];
    assert_eq!(scout.name.as_str(), "Scout");
    assert_eq!(scout.movement, 3);
    assert_eq!(scout.archetype, Archetype::Melee);

    let db = CardDatabase::from_cards(&cards);
    let firestorm = db.get_card("firestorm").expect("Firestorm should be indexed");
    assert_eq!(firestorm.card_type, CardType::Spell);
    assert_eq!(firestorm.effect, Some(CardEffect::DamageEnemyMinions { amount: 3 }));

    let axe = db.get_card("War Axe").expect("War Axe should be indexed");
    assert_eq!(
        axe.resolved_effect(),
        Some(CardEffect::EquipWeapon { attack: 3, durability: 2 })
    );
    Ok(())
}

#[test]
fn test_frontier_deck_resolves() -> Result<()> {
    let db = CardDatabase::load_from_file(&repo_path("cards/frontier.json"))?;
    let list = DeckLoader::load_from_file(&repo_path("cards/frontier.dck"))?;
    let deck = db.build_deck(&list)?;
    assert_eq!(deck.len(), list.total_cards());
    assert_eq!(deck.len(), 24);
    Ok(())
}

#[test]
fn test_sample_decks_resolve_against_starter_set() -> Result<()> {
    let db = CardDatabase::from_cards(&starter_cards());
    for name in ["vanguard", "artillery"] {
        let list = DeckLoader::load_from_file(&repo_path(&format!("test_decks/{name}.dck")))?;
        let deck = db.build_deck(&list)?;
        assert_eq!(deck.len(), 28, "{name}");
    }
    Ok(())
}

#[test]
fn test_unknown_card_in_deck_is_rejected() {
    let db = CardDatabase::from_cards(&starter_cards());
    let list = DeckLoader::parse("2 Footman\n1 Dragon").unwrap();
    assert!(matches!(db.build_deck(&list), Err(GameError::InvalidCardData(_))));
}

#[test]
fn test_missing_card_file_is_io_error() {
    let result = CardLoader::load_from_file(&repo_path("cards/does_not_exist.json"));
    assert!(matches!(result, Err(GameError::IoError(_))));
}
