//! Card data loader (JSON format)
//!
//! A card file is a flat JSON array of card templates in deck-building
//! order. Templates are validated on load and shared as `Arc<Card>`.

use crate::core::{Archetype, Card, CardEffect, CardType};
use crate::{GameError, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Highest mana cost a card may carry
pub const MAX_CARD_COST: u8 = 10;

/// Card loader for JSON card lists
pub struct CardLoader;

impl CardLoader {
    /// Load card templates from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Vec<Arc<Card>>> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse card templates from JSON text
    pub fn parse(content: &str) -> Result<Vec<Arc<Card>>> {
        let cards: Vec<Card> = serde_json::from_str(content)?;
        cards
            .into_iter()
            .map(|card| Self::validate(&card).map(|()| Arc::new(card)))
            .collect()
    }

    /// Reject templates the rules cannot play
    pub fn validate(card: &Card) -> Result<()> {
        let problem = if card.name.as_str().trim().is_empty() {
            Some("card without a name".to_string())
        } else if card.cost > MAX_CARD_COST {
            Some(format!("{} costs {} (max {MAX_CARD_COST})", card.name, card.cost))
        } else if card.card_type == CardType::Minion && card.health <= 0 {
            Some(format!("minion {} has no health", card.name))
        } else if card.card_type == CardType::Minion && card.attack < 0 {
            Some(format!("minion {} has negative attack", card.name))
        } else if card.card_type == CardType::Weapon && card.effect.is_none() && card.health <= 0 {
            Some(format!("weapon {} has no durability", card.name))
        } else {
            None
        };
        match problem {
            Some(message) => Err(GameError::InvalidCardData(message)),
            None => Ok(()),
        }
    }
}

/// The stock card set, two copies of each template
pub fn starter_cards() -> Vec<Arc<Card>> {
    let templates = [
        Card::minion("Footman", 1, 1, 3, 1, Archetype::Melee),
        Card::minion("Slinger", 1, 1, 1, 1, Archetype::Ranged),
        Card::minion("Squire", 2, 2, 3, 2, Archetype::Melee),
        Card::minion("Apprentice", 2, 2, 2, 1, Archetype::Magic),
        Card::minion("Longbowman", 3, 2, 3, 1, Archetype::Ranged),
        Card::minion("Knight", 3, 3, 4, 2, Archetype::Melee),
        Card::minion("Battlemage", 4, 3, 4, 1, Archetype::Magic),
        Card::minion("Ogre", 5, 5, 6, 1, Archetype::Melee),
        Card::spell("Fireball", 3, CardEffect::DamageEnemyHero { amount: 4 }),
        Card::spell("Arcane Burst", 4, CardEffect::DamageEnemyMinions { amount: 2 }),
        Card::spell("Mend", 2, CardEffect::HealHero { amount: 5 }),
        Card::spell("Rally", 3, CardEffect::BuffFriendlyMinions { attack: 1, health: 1 }),
        Card::spell("Insight", 2, CardEffect::DrawCards { count: 2 }),
        Card::spell("Siege Order", 4, CardEffect::DamageEnemyTowers { amount: 5 }),
        Card::spell("Thunderclap", 3, CardEffect::StunEnemyMinions { turns: 1 }),
        Card::weapon("Iron Sword", 2, 2, 2),
    ];
    templates
        .into_iter()
        .flat_map(|card| {
            let card = Arc::new(card);
            [Arc::clone(&card), card]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card_list() {
        let json = r#"[
            {"name": "Guard", "card_type": "Minion", "cost": 2, "attack": 1, "health": 4,
             "movement": 1, "archetype": "Melee"},
            {"name": "Zap", "card_type": "Spell", "cost": 1,
             "effect": {"kind": "damage_enemy_hero", "amount": 2}},
            {"name": "Club", "card_type": "Weapon", "cost": 1, "attack": 1, "health": 3}
        ]"#;
        let cards = CardLoader::parse(json).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].health, 4);
        assert_eq!(cards[1].effect, Some(CardEffect::DamageEnemyHero { amount: 2 }));
        assert_eq!(
            cards[2].resolved_effect(),
            Some(CardEffect::EquipWeapon { attack: 1, durability: 3 })
        );
    }

    #[test]
    fn test_rejects_unplayable_cards() {
        let costly = r#"[{"name": "Titan", "card_type": "Minion", "cost": 11, "health": 9}]"#;
        assert!(matches!(CardLoader::parse(costly), Err(GameError::InvalidCardData(_))));

        let hollow = r#"[{"name": "Ghost", "card_type": "Minion", "cost": 1, "health": 0}]"#;
        assert!(matches!(CardLoader::parse(hollow), Err(GameError::InvalidCardData(_))));

        assert!(matches!(CardLoader::parse("{"), Err(GameError::JsonError(_))));
    }

    #[test]
    fn test_starter_cards_are_valid() {
        let cards = starter_cards();
        assert_eq!(cards.len(), 32);
        for card in &cards {
            CardLoader::validate(card).unwrap();
        }
        assert!(cards.iter().any(|c| c.card_type == CardType::Weapon));
    }
}
