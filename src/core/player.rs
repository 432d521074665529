//! Player representation

use crate::core::{Card, Deck, GameEntity, MinionId, PlayerId, PlayerName};
use std::sync::Arc;

/// A weapon equipped on a hero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    pub name: String,
    pub attack: i32,
    pub durability: i32,
}

/// Represents a player in the game
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,

    pub name: PlayerName,

    /// Hero health
    pub health: i32,

    /// Mana available this turn
    pub mana_crystals: u8,

    /// Mana refilled at the start of each own turn
    pub max_mana_crystals: u8,

    /// Cards in hand, in draw order
    pub hand: Vec<Arc<Card>>,

    pub deck: Deck,

    pub weapon: Option<Weapon>,

    /// Has the hero attacked this turn?
    pub hero_attacked: bool,

    /// Minions this player has summoned and that are still alive
    pub minions: Vec<MinionId>,

    /// Damage the next empty-deck draw deals under the fatigue rule
    pub fatigue: i32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>, starting_health: i32, deck: Deck) -> Self {
        Player {
            id,
            name: name.into(),
            health: starting_health,
            mana_crystals: 0,
            max_mana_crystals: 0,
            hand: Vec::new(),
            deck,
            weapon: None,
            hero_attacked: false,
            minions: Vec::new(),
            fatigue: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Heal without exceeding `max_health`; returns the amount restored
    pub fn heal(&mut self, amount: i32, max_health: i32) -> i32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount.max(0)).min(max_health.max(before));
        self.health - before
    }

    /// Grow max mana by one (up to `cap`) and refill
    pub fn grow_mana(&mut self, cap: u8) {
        self.max_mana_crystals = (self.max_mana_crystals + 1).min(cap);
        self.mana_crystals = self.max_mana_crystals;
    }

    pub fn can_afford(&self, cost: u8) -> bool {
        cost <= self.mana_crystals
    }

    pub fn spend_mana(&mut self, cost: u8) {
        self.mana_crystals = self.mana_crystals.saturating_sub(cost);
    }

    pub fn forget_minion(&mut self, minion: MinionId) {
        self.minions.retain(|&id| id != minion);
    }
}

impl GameEntity<Player> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let id = PlayerId::new(0);
        let player = Player::new(id, "Alice", 30, Deck::default());

        assert_eq!(player.id, id);
        assert_eq!(player.name.as_str(), "Alice");
        assert_eq!(player.health, 30);
        assert_eq!(player.mana_crystals, 0);
        assert_eq!(player.max_mana_crystals, 0);
        assert!(player.hand.is_empty());
        assert!(!player.is_dead());
    }

    #[test]
    fn test_mana_growth_caps() {
        let mut player = Player::new(PlayerId::new(0), "Bob", 30, Deck::default());
        for turn in 1..=12u8 {
            player.grow_mana(10);
            assert_eq!(player.max_mana_crystals, turn.min(10));
            assert_eq!(player.mana_crystals, player.max_mana_crystals);
        }

        player.spend_mana(4);
        assert_eq!(player.mana_crystals, 6);
        assert!(player.can_afford(6));
        assert!(!player.can_afford(7));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut player = Player::new(PlayerId::new(0), "Carol", 30, Deck::default());
        player.take_damage(5);
        assert_eq!(player.heal(3, 30), 3);
        assert_eq!(player.heal(10, 30), 2);
        assert_eq!(player.health, 30);

        player.take_damage(30);
        assert!(player.is_dead());
    }

    #[test]
    fn test_huge_damage_saturates() {
        let mut player = Player::new(PlayerId::new(0), "Dave", 30, Deck::default());
        player.take_damage(40);
        player.take_damage(i32::MAX);
        assert_eq!(player.health, i32::MIN);
        assert!(player.is_dead());
        assert_eq!(player.heal(i32::MAX, 30), i32::MAX);
    }
}
