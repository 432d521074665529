//! Minions on the board and the timed effects attached to them

use crate::core::{Archetype, Card, CardName, GameEntity, MinionId, PlayerId, Position, TowerId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// What caused a damage, heal, buff or effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    Minion(MinionId),
    Tower(TowerId),
    /// A player's hero (weapon attacks, fatigue)
    Hero(PlayerId),
    /// A spell or weapon card
    Card(CardName),
    None,
}

/// Effect type tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Cannot move or attack
    Stunned,
    Custom(String),
}

/// Transient modifier attached to a minion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    /// Turns left; the effect expires when this reaches 0
    pub remaining: i32,
    pub source: Source,
}

impl Effect {
    pub fn new(kind: EffectKind, remaining: i32, source: Source) -> Self {
        Effect {
            kind,
            remaining,
            source,
        }
    }
}

/// Attack/health snapshot used in buff notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinionStats {
    pub attack: i32,
    pub health: i32,
    pub max_health: i32,
}

/// Runtime minion instance spawned from a minion card
#[derive(Debug, Clone)]
pub struct Minion {
    pub id: MinionId,
    pub name: CardName,
    pub owner: PlayerId,
    pub attack: i32,
    pub health: i32,
    pub max_health: i32,
    pub movement: u8,
    pub archetype: Archetype,
    /// `None` until placed on a tile
    pub position: Option<Position>,
    pub can_attack: bool,
    pub has_moved: bool,
    /// Set on the turn the minion was played
    pub summoning_sick: bool,
    pub effects: SmallVec<[Effect; 2]>,
}

impl Minion {
    /// Spawn from a card: full health, unable to attack this turn
    pub fn from_card(id: MinionId, card: &Card, owner: PlayerId) -> Self {
        let max_health = card.health.max(1);
        Minion {
            id,
            name: card.name.clone(),
            owner,
            attack: card.attack.max(0),
            health: max_health,
            max_health,
            movement: card.movement,
            archetype: card.archetype,
            position: None,
            can_attack: false,
            has_moved: false,
            summoning_sick: true,
            effects: SmallVec::new(),
        }
    }

    pub fn reach(&self) -> u8 {
        self.archetype.reach()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn has_effect(&self, kind: &EffectKind) -> bool {
        self.effects.iter().any(|e| &e.kind == kind)
    }

    pub fn is_stunned(&self) -> bool {
        self.has_effect(&EffectKind::Stunned)
    }

    pub fn stats(&self) -> MinionStats {
        MinionStats {
            attack: self.attack,
            health: self.health,
            max_health: self.max_health,
        }
    }

    /// Reset per-turn flags at the start of the owner's turn
    pub fn refresh(&mut self) {
        self.can_attack = true;
        self.has_moved = false;
        self.summoning_sick = false;
    }
}

impl GameEntity<Minion> for Minion {
    fn id(&self) -> MinionId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
