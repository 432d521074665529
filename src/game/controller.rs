//! Player controller trait and game state view
//!
//! This module defines the interface between the game manager and player
//! controllers (AI or human). The runner asks the controller for a decision
//! whenever it is that player's turn, and the controller inspects a
//! read-only view of the match to choose one of the legal actions.

use crate::board::Board;
use crate::core::{Card, Minion, PlayerId, Position, Weapon};
use crate::game::GameManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything a player may do on their turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Play a minion card onto one of the player's spawn tiles
    PlaySummon { hand_index: usize, position: Position },

    /// Play a spell or weapon card
    PlaySpell { hand_index: usize },

    /// Walk a minion to another tile
    Move { from: Position, to: Position },

    /// Attack the minion or tower on `target`
    Attack { from: Position, target: Position },

    /// Swing the hero's weapon at an enemy minion
    HeroAttack { target: Position },

    EndTurn,
}

/// Read-only view of the match for controllers
///
/// This provides access to game information without allowing mutation.
pub struct GameStateView<'a> {
    game: &'a GameManager,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    pub fn new(game: &'a GameManager, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    /// Get the player ID this view is for
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn opponent_id(&self) -> PlayerId {
        self.game.opponent_of(self.player_id).unwrap_or(self.player_id)
    }

    pub fn board(&self) -> &Board {
        self.game.board()
    }

    pub fn turn_number(&self) -> u32 {
        self.game.turn_number()
    }

    /// Cards in this player's hand
    pub fn hand(&self) -> &[Arc<Card>] {
        self.game
            .player(self.player_id)
            .map(|p| p.hand.as_slice())
            .unwrap_or(&[])
    }

    pub fn health(&self) -> i32 {
        self.game.player(self.player_id).map(|p| p.health).unwrap_or(0)
    }

    pub fn opponent_health(&self) -> i32 {
        self.game.player(self.opponent_id()).map(|p| p.health).unwrap_or(0)
    }

    pub fn mana(&self) -> u8 {
        self.game
            .player(self.player_id)
            .map(|p| p.mana_crystals)
            .unwrap_or(0)
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.game
            .player(self.player_id)
            .ok()
            .and_then(|p| p.weapon.as_ref())
    }

    pub fn minion_at(&self, pos: Position) -> Option<&Minion> {
        self.game.board().get_minion_at(pos)
    }

    /// Health left on the opponent's standing towers
    pub fn enemy_tower_health(&self) -> i32 {
        self.game
            .board()
            .towers_of(self.opponent_id())
            .filter(|t| !t.is_destroyed())
            .map(|t| t.hp)
            .sum()
    }
}

/// Player controller trait
///
/// Implement this trait to create AI players or connect to UI.
/// The runner calls these methods when decisions need to be made.
pub trait PlayerController {
    /// Get the player ID this controller is responsible for
    fn player_id(&self) -> PlayerId;

    /// Choose an action from the legal options
    ///
    /// `legal_actions` always contains `EndTurn`. Returning `None` also
    /// ends the turn.
    fn choose_action(&mut self, view: &GameStateView, legal_actions: &[PlayerAction]) -> Option<PlayerAction>;

    /// Called when the game ends (for cleanup/logging)
    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}
