//! Core game types and entities

pub mod card;
pub mod deck;
pub mod entity;
pub mod minion;
pub mod player;
pub mod tower;
pub mod types;

pub use card::{Archetype, Card, CardEffect, CardType};
pub use deck::Deck;
pub use entity::{EntityId, EntityStore, GameEntity};
pub use minion::{Effect, EffectKind, Minion, MinionStats, Source};
pub use player::{Player, Weapon};
pub use tower::Tower;
pub use types::{CardName, PlayerName, Position};

pub type PlayerId = EntityId<Player>;
pub type MinionId = EntityId<Minion>;
pub type TowerId = EntityId<Tower>;
