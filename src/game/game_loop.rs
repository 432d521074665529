//! Match loop implementation
//!
//! Drives two controllers through a match: one action per tick, with the
//! event bus (and the animation bridge, when attached) updated before each
//! decision.

use crate::core::PlayerId;
use crate::game::controller::{GameStateView, PlayerAction, PlayerController};
use crate::game::{AnimationBridge, EndReason, GameManager, MatchOutcome, VerbosityLevel};
use crate::{GameError, Result};

/// Frame length used when none is given
pub const DEFAULT_TICK: f64 = 1.0 / 60.0;

/// Result of a completed match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Winner of the match (None if drawn or stopped at the turn limit)
    pub winner: Option<PlayerId>,
    /// Total number of turns started, both players counted
    pub turns_played: u32,
    pub end_reason: EndReason,
    /// Actions applied, end-of-turn excluded
    pub actions_taken: u32,
}

/// Match runner
///
/// Handles turn progression and controller decisions until the match ends
/// or the turn limit is hit.
pub struct MatchRunner<'a> {
    /// The match being driven
    pub game: &'a mut GameManager,
    /// Maximum turns before forcing a draw
    max_turns: u32,
    /// Decisions a controller may make in one turn
    max_actions_per_turn: u32,
    tick: f64,
    animations: Option<AnimationBridge>,
    actions_taken: u32,
}

impl<'a> MatchRunner<'a> {
    pub fn new(game: &'a mut GameManager) -> Self {
        MatchRunner {
            game,
            max_turns: 200,
            max_actions_per_turn: 60,
            tick: DEFAULT_TICK,
            animations: None,
            actions_taken: 0,
        }
    }

    /// Set maximum turns before forcing a draw
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_max_actions_per_turn(mut self, max_actions: u32) -> Self {
        self.max_actions_per_turn = max_actions.max(1);
        self
    }

    /// Seconds advanced on the bus per decision
    pub fn with_tick(mut self, tick: f64) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_animations(mut self, bridge: AnimationBridge) -> Self {
        self.animations = Some(bridge);
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger_mut().set_verbosity(verbosity);
        self
    }

    /// Run the match with the given player controllers
    ///
    /// Starts player 1's first turn if no turn has begun yet.
    pub fn run_game(
        &mut self,
        controller1: &mut dyn PlayerController,
        controller2: &mut dyn PlayerController,
    ) -> Result<GameResult> {
        let [player1, player2] = self.game.player_ids();
        if controller1.player_id() != player1 || controller2.player_id() != player2 {
            return Err(GameError::InvalidConfig(
                "controllers do not match the match's players".to_string(),
            ));
        }
        if self.game.turn_number() == 0 && !self.game.is_over() {
            self.game.start_turn()?;
        }

        while !self.game.is_over() {
            if self.game.turn_number() > self.max_turns {
                self.game.end_match(MatchOutcome {
                    winner: None,
                    reason: EndReason::TurnLimit,
                });
                break;
            }
            if self.game.active_player() == player1 {
                self.run_turn(controller1)?;
            } else {
                self.run_turn(controller2)?;
            }
        }
        self.advance_frame();

        let outcome = self.game.outcome().cloned().unwrap_or(MatchOutcome {
            winner: None,
            reason: EndReason::TurnLimit,
        });
        controller1.on_game_end(
            &GameStateView::new(&*self.game, player1),
            outcome.winner == Some(player1),
        );
        controller2.on_game_end(
            &GameStateView::new(&*self.game, player2),
            outcome.winner == Some(player2),
        );

        Ok(GameResult {
            winner: outcome.winner,
            turns_played: self.game.turn_number(),
            end_reason: outcome.reason,
            actions_taken: self.actions_taken,
        })
    }

    /// Let the active player act until they end the turn, then pass it on
    fn run_turn(&mut self, controller: &mut dyn PlayerController) -> Result<()> {
        let player = controller.player_id();
        for _ in 0..self.max_actions_per_turn {
            self.advance_frame();
            if self.game.is_over() {
                return Ok(());
            }
            let legal = self.game.legal_actions(player);
            let choice = {
                let view = GameStateView::new(&*self.game, player);
                controller.choose_action(&view, &legal)
            };
            let action = match choice {
                None | Some(PlayerAction::EndTurn) => break,
                Some(action) => action,
            };
            if let Err(err) = self.game.apply_action(player, &action) {
                // Already logged by the manager; a confused controller forfeits the rest of its turn
                self.game
                    .logger()
                    .category("game", &format!("{action:?} failed: {err}"));
                break;
            }
            self.actions_taken += 1;
            if self.game.is_over() {
                return Ok(());
            }
        }
        self.game.end_turn()
    }

    fn advance_frame(&mut self) {
        if let Some(bridge) = self.animations.as_mut() {
            bridge.update(self.tick);
        }
        self.game.bus().update(self.tick);
    }
}
