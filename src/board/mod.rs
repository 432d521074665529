//! Authoritative spatial state
//!
//! The board owns the tile grid, every minion instance (placed or waiting
//! to be placed) and the towers. All mutating primitives return a success
//! flag and publish their notification on the event bus.
//!
//! Invariant: a placed minion's `position` always names the tile that holds
//! its ID, and no tile holds more than one minion.

pub mod layout;

pub use layout::{BoardLayout, LayoutRegistry};

use crate::core::{
    Card, Effect, EntityStore, Minion, MinionId, PlayerId, Position, Source, Tower, TowerId,
};
use crate::events::{EffectNotice, EventBus, GameEvent};
use smallvec::SmallVec;

#[derive(Debug)]
pub struct Board {
    rows: u8,
    cols: u8,
    /// Row-major tile slots
    tiles: Vec<Option<MinionId>>,
    minions: EntityStore<Minion>,
    towers: SmallVec<[Tower; 4]>,
    /// Player 1 defends the last row, player 2 the first
    sides: [PlayerId; 2],
    bus: EventBus,
}

impl Board {
    /// Empty board without towers
    pub fn new(rows: u8, cols: u8, sides: [PlayerId; 2], bus: EventBus) -> Self {
        Board {
            rows,
            cols,
            tiles: vec![None; rows as usize * cols as usize],
            minions: EntityStore::new(),
            towers: SmallVec::new(),
            sides,
            bus,
        }
    }

    /// Board with the layout's geometry and towers at full health
    pub fn from_layout(layout: &BoardLayout, sides: [PlayerId; 2], tower_hp: i32, bus: EventBus) -> Self {
        let mut board = Self::new(layout.rows, layout.cols, sides, bus);
        let placements = layout
            .player1_towers
            .iter()
            .map(|&p| (sides[0], p))
            .chain(layout.player2_towers.iter().map(|&p| (sides[1], p)));
        for (index, (owner, position)) in placements.enumerate() {
            let id = TowerId::new(index as u32);
            board.towers.push(Tower::new(id, owner, position, tower_hp));
        }
        board
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        (1..=self.cols).contains(&pos.x) && (1..=self.rows).contains(&pos.y)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y as usize - 1) * self.cols as usize + (pos.x as usize - 1))
        } else {
            None
        }
    }

    fn position_of(&self, index: usize) -> Position {
        let cols = self.cols as usize;
        Position::new((index % cols + 1) as u8, (index / cols + 1) as u8)
    }

    /// In bounds, no minion and no standing tower
    pub fn is_empty(&self, pos: Position) -> bool {
        match self.index(pos) {
            Some(i) => self.tiles[i].is_none() && self.tower_at(pos).is_none(),
            None => false,
        }
    }

    // Minions

    /// Create an unplaced minion from a card; place it with `place_minion`
    pub fn create_minion(&mut self, card: &Card, owner: PlayerId) -> MinionId {
        let id = self.minions.next_id();
        self.minions.insert(id, Minion::from_card(id, card, owner));
        id
    }

    pub fn minion(&self, id: MinionId) -> Option<&Minion> {
        self.minions.get(id).ok()
    }

    pub fn minion_mut(&mut self, id: MinionId) -> Option<&mut Minion> {
        self.minions.get_mut(id).ok()
    }

    pub fn minion_id_at(&self, pos: Position) -> Option<MinionId> {
        self.index(pos).and_then(|i| self.tiles[i])
    }

    pub fn get_minion_at(&self, pos: Position) -> Option<&Minion> {
        self.minion_id_at(pos).and_then(|id| self.minion(id))
    }

    /// Put an unplaced minion on an empty tile
    pub fn place_minion(&mut self, id: MinionId, pos: Position) -> bool {
        if !self.is_empty(pos) {
            return false;
        }
        let Some(index) = self.index(pos) else {
            return false;
        };
        let Some(minion) = self.minion_mut(id) else {
            return false;
        };
        if minion.position.is_some() {
            return false;
        }
        minion.position = Some(pos);
        let (owner, name) = (minion.owner, minion.name.clone());
        self.tiles[index] = Some(id);

        self.bus.publish(GameEvent::MinionSummoned {
            owner,
            minion: id,
            name,
            position: pos,
        });
        true
    }

    /// Relocate the minion on `from` to the empty tile `to`
    pub fn move_minion(&mut self, from: Position, to: Position) -> bool {
        let (Some(from_index), Some(to_index)) = (self.index(from), self.index(to)) else {
            return false;
        };
        let Some(id) = self.tiles[from_index] else {
            return false;
        };
        if !self.is_empty(to) {
            return false;
        }

        self.tiles[from_index] = None;
        self.tiles[to_index] = Some(id);
        if let Some(minion) = self.minion_mut(id) {
            minion.position = Some(to);
        }

        self.bus.publish(GameEvent::MinionMoved {
            minion: id,
            from,
            to,
        });
        true
    }

    /// Take the minion off its tile and out of the board
    ///
    /// The removal notification goes out before the tile is cleared.
    pub fn remove_minion(&mut self, pos: Position) -> Option<Minion> {
        let index = self.index(pos)?;
        let id = self.tiles[index]?;

        self.bus
            .publish(GameEvent::EffectTriggered(EffectNotice::Removed { minion: id, position: pos }));

        self.tiles[index] = None;
        self.minions.remove(id)
    }

    /// Drop a minion that never reached a tile
    pub fn discard_unplaced(&mut self, id: MinionId) -> Option<Minion> {
        match self.minion(id) {
            Some(m) if m.position.is_none() => self.minions.remove(id),
            _ => None,
        }
    }

    /// Subtract health; fires `minion:damaged`, then `minion:died` at <= 0
    ///
    /// A dead minion stays on its tile until the caller removes it.
    pub fn apply_damage_to_minion(&mut self, id: MinionId, amount: i32, source: Source) -> bool {
        if amount <= 0 {
            return false;
        }
        let Some(minion) = self.minion_mut(id) else {
            return false;
        };
        let old_health = minion.health;
        minion.health = minion.health.saturating_sub(amount);
        let new_health = minion.health;

        self.bus.publish(GameEvent::MinionDamaged {
            minion: id,
            source: source.clone(),
            amount,
            old_health,
            new_health,
        });
        if new_health <= 0 {
            self.bus.publish(GameEvent::MinionDied { minion: id, source });
        }
        true
    }

    /// Restore health up to the maximum; silent when nothing changes
    pub fn heal_minion(&mut self, id: MinionId, amount: i32, source: Source) -> bool {
        if amount <= 0 {
            return false;
        }
        let Some(minion) = self.minion_mut(id) else {
            return false;
        };
        if minion.health >= minion.max_health {
            return false;
        }
        let old_health = minion.health;
        minion.health = minion.health.saturating_add(amount).min(minion.max_health);
        let new_health = minion.health;

        self.bus.publish(GameEvent::MinionHealed {
            minion: id,
            source,
            amount: new_health - old_health,
            old_health,
            new_health,
        });
        true
    }

    /// Adjust attack and max health
    ///
    /// Attack floors at 0 and max health at 1. A positive health delta also
    /// raises current health; a negative one only clamps it to the new max.
    pub fn buff_minion(&mut self, id: MinionId, attack_delta: i32, health_delta: i32, source: Source) -> bool {
        let Some(minion) = self.minion_mut(id) else {
            return false;
        };
        let before = minion.stats();

        minion.attack = minion.attack.saturating_add(attack_delta).max(0);
        minion.max_health = minion.max_health.saturating_add(health_delta).max(1);
        if health_delta > 0 {
            minion.health = minion.health.saturating_add(health_delta);
        }
        minion.health = minion.health.min(minion.max_health);

        let after = minion.stats();
        if before == after {
            return false;
        }
        self.bus.publish(GameEvent::EffectTriggered(EffectNotice::Buffed {
            minion: id,
            source,
            before,
            after,
        }));
        true
    }

    pub fn add_minion_effect(&mut self, id: MinionId, effect: Effect) -> bool {
        if effect.remaining <= 0 {
            return false;
        }
        let Some(minion) = self.minion_mut(id) else {
            return false;
        };
        let notice = EffectNotice::Applied {
            minion: id,
            kind: effect.kind.clone(),
            duration: effect.remaining,
            source: effect.source.clone(),
        };
        minion.effects.push(effect);
        self.bus.publish(GameEvent::EffectTriggered(notice));
        true
    }

    /// Tick every timed effect once and expire those that run out
    ///
    /// With `owner` set, only that player's minions tick. Returns the
    /// number of effects that expired.
    pub fn update_minion_effects(&mut self, owner: Option<PlayerId>) -> usize {
        let mut expired = Vec::new();
        for id in self.minion_ids() {
            let Some(minion) = self.minion_mut(id) else {
                continue;
            };
            if owner.is_some_and(|o| o != minion.owner) {
                continue;
            }
            for effect in minion.effects.iter_mut() {
                effect.remaining -= 1;
            }
            let (done, kept): (SmallVec<[Effect; 2]>, SmallVec<[Effect; 2]>) =
                minion.effects.drain(..).partition(|e| e.remaining <= 0);
            minion.effects = kept;
            expired.extend(done.into_iter().map(|e| (id, e)));
        }

        let count = expired.len();
        for (minion, effect) in expired {
            self.bus.publish(GameEvent::EffectTriggered(EffectNotice::Expired {
                minion,
                kind: effect.kind,
                source: effect.source,
            }));
        }
        count
    }

    /// Visit placed minions in row-major order
    pub fn for_each_minion(&self, mut visitor: impl FnMut(&Minion)) {
        for id in self.tiles.iter().flatten() {
            if let Some(minion) = self.minion(*id) {
                visitor(minion);
            }
        }
    }

    /// Placed minions in row-major order, then unplaced ones by ID
    pub fn minion_ids(&self) -> Vec<MinionId> {
        let mut ids: Vec<MinionId> = self.tiles.iter().flatten().copied().collect();
        let mut unplaced: Vec<MinionId> = self
            .minions
            .iter()
            .filter(|(_, m)| m.position.is_none())
            .map(|(id, _)| *id)
            .collect();
        unplaced.sort();
        ids.extend(unplaced);
        ids
    }

    /// Placed minions owned by `owner`, row-major
    pub fn minions_of(&self, owner: PlayerId) -> Vec<MinionId> {
        let mut ids = Vec::new();
        self.for_each_minion(|m| {
            if m.owner == owner {
                ids.push(m.id);
            }
        });
        ids
    }

    pub fn minion_count(&self) -> usize {
        self.tiles.iter().flatten().count()
    }

    /// Re-arm every minion `owner` controls for a new turn
    pub fn refresh_minions(&mut self, owner: PlayerId) {
        for minion in self.minions.values_mut() {
            if minion.owner == owner {
                minion.refresh();
            }
        }
    }

    /// Placed minions at or below 0 health, row-major
    pub fn dead_minions(&self) -> Vec<(MinionId, Position)> {
        let mut dead = Vec::new();
        for (index, slot) in self.tiles.iter().enumerate() {
            if let Some(minion) = (*slot).and_then(|id| self.minion(id)) {
                if minion.is_dead() {
                    dead.push((minion.id, self.position_of(index)));
                }
            }
        }
        dead
    }

    // Towers

    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|t| t.id == id)
    }

    /// Standing tower on a tile
    pub fn tower_at(&self, pos: Position) -> Option<&Tower> {
        self.towers
            .iter()
            .find(|t| t.position == pos && !t.is_destroyed())
    }

    pub fn towers_of(&self, owner: PlayerId) -> impl Iterator<Item = &Tower> {
        self.towers.iter().filter(move |t| t.owner == owner)
    }

    /// True when `owner` started with towers and none are standing
    pub fn all_towers_destroyed(&self, owner: PlayerId) -> bool {
        let mut towers = self.towers_of(owner).peekable();
        towers.peek().is_some() && towers.all(Tower::is_destroyed)
    }

    /// Damage a standing tower; `tower:destroyed` follows when it falls
    pub fn apply_damage_to_tower(&mut self, id: TowerId, amount: i32, source: Source) -> bool {
        if amount <= 0 {
            return false;
        }
        let Some(tower) = self.towers.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if tower.is_destroyed() {
            return false;
        }
        let old_hp = tower.hp;
        tower.hp = tower.hp.saturating_sub(amount);
        let (new_hp, owner) = (tower.hp, tower.owner);

        self.bus.publish(GameEvent::TowerDamaged {
            tower: id,
            owner,
            source,
            amount,
            old_hp,
            new_hp,
        });
        if new_hp <= 0 {
            self.bus.publish(GameEvent::TowerDestroyed { tower: id, owner });
        }
        true
    }

    // Spawning

    /// Empty tiles where `player` may place a new minion
    ///
    /// Tiles next to one of the player's standing towers; on a layout
    /// without towers, the player's home row.
    pub fn spawn_tiles(&self, player: PlayerId) -> Vec<Position> {
        let anchors: Vec<Position> = self
            .towers_of(player)
            .filter(|t| !t.is_destroyed())
            .map(|t| t.position)
            .collect();

        let mut tiles = Vec::new();
        for y in 1..=self.rows {
            for x in 1..=self.cols {
                let pos = Position::new(x, y);
                if !self.is_empty(pos) {
                    continue;
                }
                let allowed = if self.towers_of(player).next().is_some() {
                    anchors.iter().any(|a| a.chebyshev(pos) <= 1)
                } else {
                    y == self.home_row(player)
                };
                if allowed {
                    tiles.push(pos);
                }
            }
        }
        tiles
    }

    pub fn is_spawn_tile(&self, player: PlayerId, pos: Position) -> bool {
        self.spawn_tiles(player).contains(&pos)
    }

    fn home_row(&self, player: PlayerId) -> u8 {
        if player == self.sides[0] {
            self.rows
        } else {
            1
        }
    }
}
