//! Card effect resolution
//!
//! Spells and weapons carry a [`CardEffect`]; playing one hands the manager
//! and the casting player's index to `resolve_effect`, which may touch any
//! part of the match.

use crate::core::{Card, CardEffect, Effect, EffectKind, Source, Weapon};
use crate::events::GameEvent;
use crate::game::GameManager;

impl GameManager {
    pub(crate) fn resolve_effect(&mut self, index: usize, card: &Card) {
        let Some(effect) = card.resolved_effect() else {
            self.logger
                .category("game", &format!("{} has no effect", card.name));
            return;
        };
        let source = Source::Card(card.name.clone());
        let caster = self.players[index].id;
        let enemy = self.players[1 - index].id;

        match effect {
            CardEffect::DamageEnemyHero { amount } => {
                self.damage_hero(1 - index, amount, source);
            }
            CardEffect::HealHero { amount } => {
                self.heal_hero(index, amount, source);
            }
            CardEffect::DamageEnemyMinions { amount } => {
                for id in self.board.minions_of(enemy) {
                    self.board.apply_damage_to_minion(id, amount, source.clone());
                }
                self.remove_dead_minions();
            }
            CardEffect::HealFriendlyMinions { amount } => {
                for id in self.board.minions_of(caster) {
                    self.board.heal_minion(id, amount, source.clone());
                }
            }
            CardEffect::BuffFriendlyMinions { attack, health } => {
                for id in self.board.minions_of(caster) {
                    self.board.buff_minion(id, attack, health, source.clone());
                }
            }
            CardEffect::DrawCards { count } => {
                for _ in 0..count {
                    self.draw_card(index);
                }
            }
            CardEffect::GainMana { amount } => {
                let cap = self.config.mana_cap;
                let player = &mut self.players[index];
                player.mana_crystals = player.mana_crystals.saturating_add(amount).min(cap);
                self.publish_mana(index);
            }
            CardEffect::DamageEnemyTowers { amount } => {
                let targets: Vec<_> = self
                    .board
                    .towers_of(enemy)
                    .filter(|t| !t.is_destroyed())
                    .map(|t| t.id)
                    .collect();
                for tower in targets {
                    self.board.apply_damage_to_tower(tower, amount, source.clone());
                }
            }
            CardEffect::StunEnemyMinions { turns } => {
                for id in self.board.minions_of(enemy) {
                    let stun = Effect::new(EffectKind::Stunned, turns, source.clone());
                    self.board.add_minion_effect(id, stun);
                }
            }
            CardEffect::EquipWeapon { attack, durability } => {
                let weapon = Weapon {
                    name: card.name.to_string(),
                    attack,
                    durability: durability.max(1),
                };
                self.bus().publish(GameEvent::WeaponEquipped {
                    player: caster,
                    name: weapon.name.clone(),
                    attack: weapon.attack,
                    durability: weapon.durability,
                });
                self.players[index].weapon = Some(weapon);
            }
        }
    }
}
