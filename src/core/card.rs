//! Card templates
//!
//! A `Card` is an immutable template loaded once from card data and shared
//! by reference (`Arc<Card>`) between decks, hands and the minions it spawns.

use crate::core::CardName;
use serde::{Deserialize, Serialize};

/// Card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Minion,
    Spell,
    Weapon,
}

/// Attack-range class of a minion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Archetype {
    #[default]
    Melee,
    Magic,
    Ranged,
}

impl Archetype {
    /// Attack reach in Chebyshev distance
    pub fn reach(&self) -> u8 {
        match self {
            Archetype::Melee => 1,
            Archetype::Magic => 2,
            Archetype::Ranged => 3,
        }
    }
}

/// Effect procedure bound to a spell or weapon card
///
/// Interpreted by the game manager against the casting player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardEffect {
    /// Damage the opposing hero
    DamageEnemyHero { amount: i32 },
    /// Restore the caster's hero health (capped at starting health)
    HealHero { amount: i32 },
    /// Damage every enemy minion on the board
    DamageEnemyMinions { amount: i32 },
    /// Heal every friendly minion on the board
    HealFriendlyMinions { amount: i32 },
    /// Buff every friendly minion on the board
    BuffFriendlyMinions { attack: i32, health: i32 },
    /// Draw cards from the caster's deck
    DrawCards { count: u8 },
    /// Gain mana this turn (not above the mana cap)
    GainMana { amount: u8 },
    /// Damage every enemy tower
    DamageEnemyTowers { amount: i32 },
    /// Stun every enemy minion for a number of turns
    StunEnemyMinions { turns: i32 },
    /// Equip a weapon on the caster's hero
    EquipWeapon { attack: i32, durability: i32 },
}

/// Card template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: CardName,

    pub card_type: CardType,

    /// Mana cost
    pub cost: u8,

    #[serde(default)]
    pub attack: i32,

    /// Health for minions, durability for weapons
    #[serde(default)]
    pub health: i32,

    /// Movement range in tiles (minions only)
    #[serde(default)]
    pub movement: u8,

    #[serde(default)]
    pub archetype: Archetype,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<CardEffect>,
}

impl Card {
    /// Create a minion card template
    pub fn minion(
        name: impl Into<CardName>,
        cost: u8,
        attack: i32,
        health: i32,
        movement: u8,
        archetype: Archetype,
    ) -> Self {
        Card {
            name: name.into(),
            card_type: CardType::Minion,
            cost,
            attack,
            health,
            movement,
            archetype,
            effect: None,
        }
    }

    /// Create a spell card template
    pub fn spell(name: impl Into<CardName>, cost: u8, effect: CardEffect) -> Self {
        Card {
            name: name.into(),
            card_type: CardType::Spell,
            cost,
            attack: 0,
            health: 0,
            movement: 0,
            archetype: Archetype::default(),
            effect: Some(effect),
        }
    }

    /// Create a weapon card template (health is durability)
    pub fn weapon(name: impl Into<CardName>, cost: u8, attack: i32, durability: i32) -> Self {
        Card {
            name: name.into(),
            card_type: CardType::Weapon,
            cost,
            attack,
            health: durability,
            movement: 0,
            archetype: Archetype::default(),
            effect: None,
        }
    }

    pub fn is_minion(&self) -> bool {
        self.card_type == CardType::Minion
    }

    /// The effect resolved when this card is played
    ///
    /// Weapons without an explicit effect equip themselves.
    pub fn resolved_effect(&self) -> Option<CardEffect> {
        match (&self.effect, self.card_type) {
            (Some(effect), _) => Some(effect.clone()),
            (None, CardType::Weapon) => Some(CardEffect::EquipWeapon {
                attack: self.attack,
                durability: self.health,
            }),
            (None, _) => None,
        }
    }
}
