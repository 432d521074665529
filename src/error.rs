//! Error types for Grid Tactics

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid hand index {index} (hand size {hand_size})")]
    InvalidHandIndex { index: usize, hand_size: usize },

    #[error("Not enough mana: card costs {cost}, {available} available")]
    InsufficientMana { cost: u8, available: u8 },

    #[error("It is not {0}'s turn")]
    NotYourTurn(String),

    #[error("The match is already over")]
    GameOver,

    #[error("No turn has started yet")]
    TurnNotStarted,

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Cannot place minion at {0}")]
    PlacementFailed(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Unknown board layout: {0}")]
    UnknownLayout(String),

    #[error("Invalid card data: {0}")]
    InvalidCardData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
