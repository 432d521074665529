//! Action enumeration and dispatch
//!
//! `legal_actions` lists every action the rules currently allow so that AI
//! controllers can choose without probing; `apply_action` routes a chosen
//! action to the matching manager operation.

use crate::core::{CardType, PlayerId, Position};
use crate::game::{GameManager, PlayerAction};
use crate::Result;

impl GameManager {
    /// Every action `player` may take right now, `EndTurn` last
    ///
    /// Empty before the first turn, when the match is over or when it is not
    /// the player's turn.
    pub fn legal_actions(&self, player: PlayerId) -> Vec<PlayerAction> {
        let Ok(index) = self.index_of(player) else {
            return Vec::new();
        };
        if self.is_over() || self.turn_number() == 0 || index != self.active_index() {
            return Vec::new();
        }
        let me = &self.players[index];
        let mut actions = Vec::new();

        let spawn_tiles = self.board.spawn_tiles(player);
        for (hand_index, card) in me.hand.iter().enumerate() {
            if !me.can_afford(card.cost) {
                continue;
            }
            match card.card_type {
                CardType::Minion => actions.extend(
                    spawn_tiles
                        .iter()
                        .map(|&position| PlayerAction::PlaySummon { hand_index, position }),
                ),
                CardType::Spell | CardType::Weapon => {
                    actions.push(PlayerAction::PlaySpell { hand_index });
                }
            }
        }

        for id in self.board.minions_of(player) {
            let Some(minion) = self.board.minion(id) else {
                continue;
            };
            let Some(from) = minion.position else {
                continue;
            };
            if minion.is_stunned() {
                continue;
            }
            if !minion.has_moved {
                for to in self.tiles_within(from, minion.movement) {
                    if self.board.is_empty(to) {
                        actions.push(PlayerAction::Move { from, to });
                    }
                }
            }
            if minion.can_attack && minion.attack > 0 {
                for target in self.tiles_within(from, minion.reach()) {
                    if self.is_enemy_target(player, target) {
                        actions.push(PlayerAction::Attack { from, target });
                    }
                }
            }
        }

        if me.weapon.is_some() && !me.hero_attacked {
            let enemy = self.players[1 - index].id;
            for id in self.board.minions_of(enemy) {
                if let Some(target) = self.board.minion(id).and_then(|m| m.position) {
                    actions.push(PlayerAction::HeroAttack { target });
                }
            }
        }

        actions.push(PlayerAction::EndTurn);
        actions
    }

    /// Carry out an action for `player`
    pub fn apply_action(&mut self, player: PlayerId, action: &PlayerAction) -> Result<()> {
        match *action {
            PlayerAction::PlaySummon { hand_index, position } => {
                self.summon_from_hand(player, hand_index, position).map(|_| ())
            }
            PlayerAction::PlaySpell { hand_index } => self.play_card_from_hand(player, hand_index).map(|_| ()),
            PlayerAction::Move { from, to } => self.move_minion(player, from, to),
            PlayerAction::Attack { from, target } => self.attack(player, from, target),
            PlayerAction::HeroAttack { target } => self.hero_attack(player, target),
            PlayerAction::EndTurn => {
                self.ensure_active(player)?;
                self.end_turn()
            }
        }
    }

    /// In-bounds tiles within Chebyshev `range` of `center`, row-major, excluding it
    fn tiles_within(&self, center: Position, range: u8) -> Vec<Position> {
        let range = range as i16;
        let mut tiles = Vec::new();
        for dy in -range..=range {
            for dx in -range..=range {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (x, y) = (center.x as i16 + dx, center.y as i16 + dy);
                if x < 1 || y < 1 || x > self.board.cols() as i16 || y > self.board.rows() as i16 {
                    continue;
                }
                tiles.push(Position::new(x as u8, y as u8));
            }
        }
        tiles
    }

    fn is_enemy_target(&self, player: PlayerId, pos: Position) -> bool {
        if let Some(minion) = self.board.get_minion_at(pos) {
            return minion.owner != player;
        }
        self.board.tower_at(pos).is_some_and(|t| t.owner != player)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::core::{Archetype, Card, CardEffect};
    use crate::events::EventBus;
    use crate::game::{GameLogger, GameManager, PlayerAction};
    use std::sync::Arc;

    fn game(cards: Vec<Arc<Card>>) -> GameManager {
        let bus = EventBus::with_logger(GameLogger::capturing());
        let mut game = GameManager::new(GameConfig::default(), [&cards, &cards], bus).unwrap();
        game.set_logger(GameLogger::capturing());
        game
    }

    #[test]
    fn test_no_actions_out_of_turn() {
        let cards = vec![Arc::new(Card::minion("Pike", 1, 1, 1, 1, Archetype::Melee)); 6];
        let mut g = game(cards);
        g.start_turn().unwrap();
        let [p1, p2] = g.player_ids();
        assert!(g.legal_actions(p2).is_empty());
        assert_eq!(g.legal_actions(p1).last(), Some(&PlayerAction::EndTurn));
    }

    #[test]
    fn test_summons_cover_spawn_tiles() {
        let cards = vec![Arc::new(Card::minion("Pike", 1, 1, 1, 1, Archetype::Melee)); 6];
        let mut g = game(cards);
        g.start_turn().unwrap();
        let p1 = g.active_player();
        let summons = g
            .legal_actions(p1)
            .into_iter()
            .filter(|a| matches!(a, PlayerAction::PlaySummon { hand_index: 0, .. }))
            .count();
        assert_eq!(summons, 8);
    }

    #[test]
    fn test_unaffordable_cards_are_skipped() {
        let cards = vec![Arc::new(Card::spell("Nova", 5, CardEffect::DamageEnemyHero { amount: 3 })); 6];
        let mut g = game(cards);
        g.start_turn().unwrap();
        let p1 = g.active_player();
        assert_eq!(g.legal_actions(p1), vec![PlayerAction::EndTurn]);
    }

    #[test]
    fn test_listed_moves_apply() {
        let cards = vec![Arc::new(Card::minion("Pike", 1, 2, 3, 2, Archetype::Magic)); 10];
        let mut g = game(cards);
        g.start_turn().unwrap();
        let [p1, p2] = g.player_ids();

        let summon = g.legal_actions(p1)[0].clone();
        assert!(matches!(summon, PlayerAction::PlaySummon { hand_index: 0, .. }));
        g.apply_action(p1, &summon).unwrap();
        g.apply_action(p1, &PlayerAction::EndTurn).unwrap();
        g.apply_action(p2, &PlayerAction::EndTurn).unwrap();

        let moves: Vec<PlayerAction> = g
            .legal_actions(p1)
            .into_iter()
            .filter(|a| matches!(a, PlayerAction::Move { .. }))
            .collect();
        assert!(!moves.is_empty());
        for action in &moves {
            if let PlayerAction::Move { from, to } = *action {
                assert!(g.board().is_empty(to));
                assert_eq!(g.board().get_minion_at(from).unwrap().owner, p1);
            }
        }

        g.apply_action(p1, &moves[0]).unwrap();
        assert!(!g
            .legal_actions(p1)
            .iter()
            .any(|a| matches!(a, PlayerAction::Move { .. })));
    }
}
