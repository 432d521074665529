//! Grid Tactics - turn-based card battles on a tile grid
//!
//! Two players draw from shuffled decks, spend growing mana to summon
//! minions onto a grid and cast spells, and fight until a hero falls or a
//! side loses all of its towers. Every state change is announced on an
//! [`events::EventBus`], so presentation layers and AI observers hook in
//! without touching the rules.

pub mod board;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod game;
pub mod loader;
pub mod tournament;

pub use error::{GameError, Result};
