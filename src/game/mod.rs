//! Match flow: turn structure, card play, combat and the AI layer

pub mod actions;
pub mod combat;
pub mod controller;
pub mod effects;
pub mod game_loop;
pub mod logger;
pub mod manager;
pub mod presentation;
pub mod random_controller;
pub mod zero_controller;

pub use controller::{GameStateView, PlayerAction, PlayerController};
pub use game_loop::{GameResult, MatchRunner, DEFAULT_TICK};
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use manager::{EndReason, GameManager, MatchOutcome, MatchState, PlayedCard};
pub use presentation::{cue_for, AnimationBridge, AnimationPlayer, NullAnimationPlayer};
pub use random_controller::RandomController;
pub use zero_controller::ZeroController;
