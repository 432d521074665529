//! Attack resolution
//!
//! Minions attack enemy minions or towers within their archetype reach.
//! Minion combat is simultaneous: a defender that can reach the attacker
//! strikes back with the attack value it had before the blow landed.

use crate::core::{PlayerId, Position, Source};
use crate::events::{GameEvent, Target};
use crate::game::GameManager;
use crate::{GameError, Result};

impl GameManager {
    /// Attack the minion or tower standing on `target` with the minion on `from`
    pub fn attack(&mut self, player: PlayerId, from: Position, target: Position) -> Result<()> {
        self.ensure_active(player)?;

        let Some(attacker) = self.board.get_minion_at(from) else {
            return Err(self.reject(GameError::InvalidTarget(format!("no minion at {from}"))));
        };
        if attacker.owner != player {
            return Err(self.reject(GameError::InvalidTarget(format!("{} is not yours", attacker.name))));
        }
        if !attacker.can_attack {
            return Err(self.reject(GameError::IllegalMove(format!("{} cannot attack yet", attacker.name))));
        }
        if attacker.is_stunned() {
            return Err(self.reject(GameError::IllegalMove(format!("{} is stunned", attacker.name))));
        }
        let distance = from.chebyshev(target);
        if distance > attacker.reach() {
            return Err(self.reject(GameError::InvalidTarget(format!(
                "{target} is out of {}'s reach",
                attacker.name
            ))));
        }
        let (attacker_id, power) = (attacker.id, attacker.attack);

        let victim = if let Some(defender) = self.board.get_minion_at(target) {
            if defender.owner == player {
                return Err(self.reject(GameError::InvalidTarget(format!("{} is friendly", defender.name))));
            }
            let strikes_back = distance <= defender.reach();
            Engagement {
                target: Target::Minion(defender.id),
                retaliation: strikes_back.then_some(defender.attack),
            }
        } else if let Some(tower) = self.board.tower_at(target) {
            if tower.owner == player {
                return Err(self.reject(GameError::InvalidTarget(format!("own tower at {target}"))));
            }
            Engagement {
                target: Target::Tower(tower.id),
                retaliation: None,
            }
        } else {
            return Err(self.reject(GameError::InvalidTarget(format!("nothing to attack at {target}"))));
        };

        if let Some(m) = self.board.minion_mut(attacker_id) {
            m.can_attack = false;
        }
        self.bus().publish(GameEvent::MinionAttacked {
            attacker: attacker_id,
            target: victim.target,
        });

        let source = Source::Minion(attacker_id);
        match victim.target {
            Target::Minion(defender_id) => {
                self.board.apply_damage_to_minion(defender_id, power, source);
                if let Some(counter) = victim.retaliation {
                    self.board
                        .apply_damage_to_minion(attacker_id, counter, Source::Minion(defender_id));
                }
            }
            Target::Tower(tower) => {
                self.board.apply_damage_to_tower(tower, power, source);
            }
        }

        self.remove_dead_minions();
        self.check_win_conditions();
        Ok(())
    }

    /// Strike an enemy minion with the hero's weapon
    ///
    /// Once per turn; each swing costs one durability and the weapon breaks
    /// at zero.
    pub fn hero_attack(&mut self, player: PlayerId, target: Position) -> Result<()> {
        let index = self.ensure_active(player)?;
        let hero = &self.players[index];
        let Some(weapon) = hero.weapon.clone() else {
            return Err(self.reject(GameError::IllegalMove(format!("{} has no weapon", hero.name))));
        };
        if hero.hero_attacked {
            return Err(self.reject(GameError::IllegalMove(format!("{} already attacked", hero.name))));
        }
        let defender = match self.board.get_minion_at(target) {
            Some(m) if m.owner != player => m.id,
            _ => return Err(self.reject(GameError::InvalidTarget(format!("no enemy minion at {target}")))),
        };

        self.board
            .apply_damage_to_minion(defender, weapon.attack, Source::Hero(player));

        let hero = &mut self.players[index];
        hero.hero_attacked = true;
        if let Some(w) = hero.weapon.as_mut() {
            w.durability -= 1;
            if w.durability <= 0 {
                hero.weapon = None;
                self.bus().publish(GameEvent::WeaponBroken {
                    player,
                    name: weapon.name,
                });
            }
        }

        self.remove_dead_minions();
        self.check_win_conditions();
        Ok(())
    }
}

/// An attack target plus the counter-damage it deals, if any
struct Engagement {
    target: Target,
    retaliation: Option<i32>,
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::core::{Archetype, Card, MinionId, PlayerId, Position};
    use crate::events::EventBus;
    use crate::game::{EndReason, GameLogger, GameManager};
    use crate::GameError;
    use std::sync::Arc;

    fn game() -> GameManager {
        let cards = vec![Arc::new(Card::weapon("Hatchet", 1, 2, 2)); 10];
        let bus = EventBus::with_logger(GameLogger::capturing());
        let mut game = GameManager::new(GameConfig::default(), [&cards, &cards], bus).unwrap();
        game.set_logger(GameLogger::capturing());
        game.start_turn().unwrap();
        game
    }

    fn put(game: &mut GameManager, owner: PlayerId, pos: Position, card: Card) -> MinionId {
        let id = game.board_mut().create_minion(&card, owner);
        assert!(game.board_mut().place_minion(id, pos));
        game.board_mut().minion_mut(id).unwrap().refresh();
        id
    }

    #[test]
    fn test_melee_trade_is_simultaneous() {
        let mut g = game();
        let [p1, p2] = g.player_ids();
        let a = put(&mut g, p1, Position::new(3, 5), Card::minion("Knight", 2, 3, 3, 1, Archetype::Melee));
        let d = put(&mut g, p2, Position::new(3, 4), Card::minion("Brute", 2, 3, 2, 1, Archetype::Melee));

        g.attack(p1, Position::new(3, 5), Position::new(3, 4)).unwrap();
        assert!(g.board().minion(d).is_none());
        assert!(g.board().minion(a).is_none());
    }

    #[test]
    fn test_ranged_attacker_avoids_melee_retaliation() {
        let mut g = game();
        let [p1, p2] = g.player_ids();
        let a = put(&mut g, p1, Position::new(3, 6), Card::minion("Archer", 2, 2, 2, 1, Archetype::Ranged));
        let d = put(&mut g, p2, Position::new(3, 3), Card::minion("Brute", 2, 3, 5, 1, Archetype::Melee));

        g.attack(p1, Position::new(3, 6), Position::new(3, 3)).unwrap();
        assert_eq!(g.board().minion(d).unwrap().health, 3);
        assert_eq!(g.board().minion(a).unwrap().health, 2);
        assert!(!g.board().minion(a).unwrap().can_attack);
        assert!(matches!(
            g.attack(p1, Position::new(3, 6), Position::new(3, 3)),
            Err(GameError::IllegalMove(_))
        ));
    }

    #[test]
    fn test_out_of_reach_and_friendly_targets() {
        let mut g = game();
        let [p1, p2] = g.player_ids();
        put(&mut g, p1, Position::new(1, 5), Card::minion("Knight", 2, 3, 3, 1, Archetype::Melee));
        put(&mut g, p1, Position::new(2, 5), Card::minion("Squire", 1, 1, 1, 1, Archetype::Melee));
        put(&mut g, p2, Position::new(1, 2), Card::minion("Brute", 2, 3, 2, 1, Archetype::Melee));

        assert!(matches!(
            g.attack(p1, Position::new(1, 5), Position::new(1, 2)),
            Err(GameError::InvalidTarget(_))
        ));
        assert!(matches!(
            g.attack(p1, Position::new(1, 5), Position::new(2, 5)),
            Err(GameError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_fresh_minion_cannot_attack() {
        let mut g = game();
        let [p1, p2] = g.player_ids();
        let card = Card::minion("Rookie", 1, 1, 1, 1, Archetype::Melee);
        let id = g.board_mut().create_minion(&card, p1);
        g.board_mut().place_minion(id, Position::new(4, 4));
        put(&mut g, p2, Position::new(4, 3), Card::minion("Brute", 2, 3, 2, 1, Archetype::Melee));
        assert!(g.attack(p1, Position::new(4, 4), Position::new(4, 3)).is_err());
    }

    #[test]
    fn test_tower_kill_ends_match() {
        let mut g = game();
        let [p1, _] = g.player_ids();
        let giant = put(&mut g, p1, Position::new(5, 3), Card::minion("Giant", 8, 25, 8, 1, Archetype::Melee));

        g.attack(p1, Position::new(5, 3), Position::new(5, 2)).unwrap();
        assert!(g.board().minion(giant).is_some());
        let outcome = g.outcome().unwrap();
        assert_eq!(outcome.winner, Some(p1));
        assert_eq!(outcome.reason, EndReason::TowersDestroyed);
    }

    #[test]
    fn test_hero_weapon_swings_once_and_breaks() {
        let mut g = game();
        let [p1, p2] = g.player_ids();
        g.play_card_from_hand(p1, 0).unwrap();
        let target = put(&mut g, p2, Position::new(6, 6), Card::minion("Brute", 2, 3, 9, 1, Archetype::Melee));

        g.hero_attack(p1, Position::new(6, 6)).unwrap();
        assert_eq!(g.board().minion(target).unwrap().health, 7);
        assert!(g.hero_attack(p1, Position::new(6, 6)).is_err());

        g.end_turn().unwrap();
        g.end_turn().unwrap();
        g.hero_attack(p1, Position::new(6, 6)).unwrap();
        assert_eq!(g.board().minion(target).unwrap().health, 5);
        assert!(g.players()[0].weapon.is_none());
    }
}
