//! Match configuration

use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What happens when a player draws from an empty deck
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatiguePolicy {
    /// Nothing is drawn and nothing else happens
    #[default]
    None,
    /// The hero takes 1, then 2, then 3, ... damage per empty draw
    Damage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_health: i32,
    pub starting_hand: usize,
    pub mana_cap: u8,
    pub max_hand_size: usize,
    pub tower_health: i32,
    pub seed: u64,
    pub fatigue: FatiguePolicy,
    pub layout: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            starting_health: 30,
            starting_hand: 3,
            mana_cap: 10,
            max_hand_size: 10,
            tower_health: 20,
            seed: 0,
            fatigue: FatiguePolicy::None,
            layout: "classic".to_string(),
        }
    }
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_fatigue(mut self, fatigue: FatiguePolicy) -> Self {
        self.fatigue = fatigue;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.starting_health <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "starting_health must be positive, got {}",
                self.starting_health
            )));
        }
        if self.tower_health <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "tower_health must be positive, got {}",
                self.tower_health
            )));
        }
        if self.max_hand_size == 0 {
            return Err(GameError::InvalidConfig("max_hand_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse a JSON object; missing fields take their defaults
    pub fn parse(content: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }
}
