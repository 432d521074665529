//! Board-layout registry
//!
//! A layout names the grid geometry and where each player's towers stand.
//! The background asset path is carried for the renderer and never read by
//! the core.

use crate::core::Position;
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub name: String,
    pub rows: u8,
    pub cols: u8,
    #[serde(default)]
    pub player1_towers: Vec<Position>,
    #[serde(default)]
    pub player2_towers: Vec<Position>,
    #[serde(default)]
    pub background: String,
}

impl BoardLayout {
    pub fn new(name: impl Into<String>, rows: u8, cols: u8) -> Self {
        BoardLayout {
            name: name.into(),
            rows,
            cols,
            player1_towers: Vec::new(),
            player2_towers: Vec::new(),
            background: String::new(),
        }
    }

    pub fn with_towers(mut self, player1: Position, player2: Position) -> Self {
        self.player1_towers = vec![player1];
        self.player2_towers = vec![player2];
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn has_towers(&self) -> bool {
        !self.player1_towers.is_empty() || !self.player2_towers.is_empty()
    }

    fn contains(&self, pos: Position) -> bool {
        (1..=self.cols).contains(&pos.x) && (1..=self.rows).contains(&pos.y)
    }

    /// Check geometry and tower coordinates
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::InvalidConfig(format!(
                "layout '{}' has an empty grid ({}x{})",
                self.name, self.rows, self.cols
            )));
        }
        let towers = self.player1_towers.iter().chain(self.player2_towers.iter());
        let mut seen = Vec::new();
        for &pos in towers {
            if !self.contains(pos) {
                return Err(GameError::InvalidConfig(format!(
                    "layout '{}' places a tower outside the grid at {pos}",
                    self.name
                )));
            }
            if seen.contains(&pos) {
                return Err(GameError::InvalidConfig(format!(
                    "layout '{}' stacks two towers at {pos}",
                    self.name
                )));
            }
            seen.push(pos);
        }
        Ok(())
    }
}

/// Named collection of layouts
#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    layouts: Vec<BoardLayout>,
}

impl LayoutRegistry {
    pub fn empty() -> Self {
        LayoutRegistry {
            layouts: Vec::new(),
        }
    }

    /// Registry preloaded with the stock layouts
    pub fn builtin() -> Self {
        LayoutRegistry {
            layouts: vec![
                BoardLayout::new("classic", 9, 9)
                    .with_towers(Position::new(5, 8), Position::new(5, 2))
                    .with_background("boards/classic.png"),
                BoardLayout::new("frontier", 11, 8)
                    .with_towers(Position::new(4, 10), Position::new(5, 2))
                    .with_background("boards/frontier.png"),
                BoardLayout::new("skirmish", 7, 7).with_background("boards/skirmish.png"),
                BoardLayout::new("arena", 8, 8)
                    .with_towers(Position::new(4, 7), Position::new(5, 2))
                    .with_background("boards/arena.png"),
            ],
        }
    }

    /// Parse a JSON array of layouts
    pub fn parse(content: &str) -> Result<Self> {
        let layouts: Vec<BoardLayout> = serde_json::from_str(content)?;
        let mut registry = Self::empty();
        for layout in layouts {
            registry.register(layout)?;
        }
        Ok(registry)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Add or replace a layout by name
    pub fn register(&mut self, layout: BoardLayout) -> Result<()> {
        layout.validate()?;
        self.layouts.retain(|l| l.name != layout.name);
        self.layouts.push(layout);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&BoardLayout> {
        self.layouts
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| GameError::UnknownLayout(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.iter().map(|l| l.name.as_str())
    }
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
