//! Random AI controller for testing and baseline gameplay
//!
//! Makes random choices from the legal actions. Serves as a baseline for
//! more sophisticated AI.

use crate::core::PlayerId;
use crate::game::controller::{GameStateView, PlayerAction, PlayerController};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A controller that makes random choices
pub struct RandomController {
    player_id: PlayerId,
    rng: ChaCha12Rng,
    /// Chance of ending the turn while other actions remain
    end_turn_bias: f64,
}

impl RandomController {
    /// Create a random controller seeded from OS entropy
    pub fn new(player_id: PlayerId) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::from_entropy(),
            end_turn_bias: 0.1,
        }
    }

    /// Create a random controller with a seeded RNG (for deterministic testing)
    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
            end_turn_bias: 0.1,
        }
    }

    pub fn with_end_turn_bias(mut self, bias: f64) -> Self {
        self.end_turn_bias = bias.clamp(0.0, 1.0);
        self
    }
}

impl PlayerController for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(&mut self, _view: &GameStateView, legal_actions: &[PlayerAction]) -> Option<PlayerAction> {
        let options: Vec<&PlayerAction> = legal_actions
            .iter()
            .filter(|a| !matches!(a, PlayerAction::EndTurn))
            .collect();
        if options.is_empty() || self.rng.gen_bool(self.end_turn_bias) {
            return None;
        }
        let index = self.rng.gen_range(0..options.len());
        Some(options[index].clone())
    }
}
