//! Deck list loader
//!
//! One entry per line, `<count> <card name>`. Blank lines, `#` comments and
//! `[section]` headers are ignored.

use crate::{GameError, Result};
use std::fs;
use std::path::Path;

/// Deck loader for plain-text deck lists
pub struct DeckLoader;

impl DeckLoader {
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its text content
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut entries = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }

            let parsed = line
                .split_once(' ')
                .and_then(|(count, name)| Some((count.parse::<u8>().ok()?, name.trim())));
            match parsed {
                Some((count, name)) if count > 0 && !name.is_empty() => entries.push(DeckEntry {
                    card_name: name.to_string(),
                    count,
                }),
                _ => {
                    return Err(GameError::InvalidCardData(format!(
                        "deck line {}: expected '<count> <card name>', got '{line}'",
                        number + 1
                    )))
                }
            }
        }

        if entries.is_empty() {
            return Err(GameError::InvalidCardData("Empty deck".to_string()));
        }
        Ok(DeckList { entries })
    }
}

/// Represents a deck entry (card name and count)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_name: String,
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckList {
    pub entries: Vec<DeckEntry>,
}

impl DeckList {
    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }
}
