//! Zero controller for testing and automation
//!
//! This controller always chooses the first available action other than
//! ending the turn. It's useful for automated testing and ensuring matches
//! can complete without user input.

use crate::core::PlayerId;
use crate::game::controller::{GameStateView, PlayerAction, PlayerController};

/// A controller that always chooses the first meaningful action
///
/// This is useful for:
/// - Automated testing
/// - Benchmarking the game engine
/// - Ensuring matches play out deterministically
pub struct ZeroController {
    player_id: PlayerId,
}

impl ZeroController {
    pub fn new(player_id: PlayerId) -> Self {
        ZeroController { player_id }
    }
}

impl PlayerController for ZeroController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(&mut self, _view: &GameStateView, legal_actions: &[PlayerAction]) -> Option<PlayerAction> {
        // Plays and attacks first, walking only once nothing else is left
        legal_actions
            .iter()
            .find(|a| !matches!(a, PlayerAction::EndTurn | PlayerAction::Move { .. }))
            .or_else(|| legal_actions.iter().find(|a| matches!(a, PlayerAction::Move { .. })))
            .cloned()
    }
}
