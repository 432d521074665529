//! Towers

use crate::core::{GameEntity, PlayerId, Position, TowerId};

/// Fixed, owned, destructible structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tower {
    pub id: TowerId,
    pub owner: PlayerId,
    pub position: Position,
    pub hp: i32,
    pub max_hp: i32,
}

impl Tower {
    pub fn new(id: TowerId, owner: PlayerId, position: Position, max_hp: i32) -> Self {
        Tower {
            id,
            owner,
            position,
            hp: max_hp,
            max_hp,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0
    }
}

impl GameEntity<Tower> for Tower {
    fn id(&self) -> TowerId {
        self.id
    }

    fn name(&self) -> &str {
        "Tower"
    }
}
