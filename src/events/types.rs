//! Event definitions
//!
//! Every notification the core emits is one `GameEvent` variant with a
//! typed payload. `GameEvent::name` gives the stable wire name consumers
//! match on (`"minion:damaged"`, `"turn:started"`, ...). Consumers must
//! ignore names they do not know.

use crate::core::{
    CardName, CardType, EffectKind, MinionId, MinionStats, PlayerId, Position, Source, TowerId,
};
use crate::game::MatchOutcome;
use serde::{Deserialize, Serialize};

/// What an attack was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Minion(MinionId),
    Tower(TowerId),
}

/// Payload of the catch-all `effect:triggered` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectNotice {
    /// A buff changed attack and/or health
    Buffed {
        minion: MinionId,
        source: Source,
        before: MinionStats,
        after: MinionStats,
    },
    /// A minion was taken off its tile
    Removed { minion: MinionId, position: Position },
    /// A timed effect was attached
    Applied {
        minion: MinionId,
        kind: EffectKind,
        duration: i32,
        source: Source,
    },
    /// A timed effect ran out
    Expired {
        minion: MinionId,
        kind: EffectKind,
        source: Source,
    },
    /// Ad hoc notification
    Custom { label: String, detail: String },
}

impl EffectNotice {
    pub fn label(&self) -> &str {
        match self {
            EffectNotice::Buffed { .. } => "buffed",
            EffectNotice::Removed { .. } => "minionRemoved",
            EffectNotice::Applied { .. } => "effectApplied",
            EffectNotice::Expired { .. } => "effectExpired",
            EffectNotice::Custom { label, .. } => label,
        }
    }
}

/// Every event published through the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameInitialized {
        players: [PlayerId; 2],
        rows: u8,
        cols: u8,
    },
    GameEnded {
        outcome: MatchOutcome,
    },
    TurnStarted {
        player: PlayerId,
        turn: u32,
    },
    TurnEnded {
        player: PlayerId,
        turn: u32,
    },
    ManaChanged {
        player: PlayerId,
        mana: u8,
        max_mana: u8,
    },
    HeroDamaged {
        player: PlayerId,
        source: Source,
        amount: i32,
        old_health: i32,
        new_health: i32,
    },
    HeroHealed {
        player: PlayerId,
        source: Source,
        amount: i32,
        old_health: i32,
        new_health: i32,
    },
    CardDrawn {
        player: PlayerId,
        card: CardName,
    },
    /// Drawn into a full hand and discarded
    CardBurned {
        player: PlayerId,
        card: CardName,
    },
    DeckEmpty {
        player: PlayerId,
        fatigue: i32,
    },
    CardPlayed {
        player: PlayerId,
        card: CardName,
        card_type: CardType,
    },
    WeaponEquipped {
        player: PlayerId,
        name: String,
        attack: i32,
        durability: i32,
    },
    WeaponBroken {
        player: PlayerId,
        name: String,
    },
    MinionSummoned {
        owner: PlayerId,
        minion: MinionId,
        name: CardName,
        position: Position,
    },
    MinionMoved {
        minion: MinionId,
        from: Position,
        to: Position,
    },
    MinionAttacked {
        attacker: MinionId,
        target: Target,
    },
    MinionDamaged {
        minion: MinionId,
        source: Source,
        amount: i32,
        old_health: i32,
        new_health: i32,
    },
    MinionHealed {
        minion: MinionId,
        source: Source,
        amount: i32,
        old_health: i32,
        new_health: i32,
    },
    MinionDied {
        minion: MinionId,
        source: Source,
    },
    TowerDamaged {
        tower: TowerId,
        owner: PlayerId,
        source: Source,
        amount: i32,
        old_hp: i32,
        new_hp: i32,
    },
    TowerDestroyed {
        tower: TowerId,
        owner: PlayerId,
    },
    EffectTriggered(EffectNotice),
    AnimationFinished {
        cue: String,
        skipped: bool,
    },
}

/// Payload-free discriminant of `GameEvent`, used as a subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    GameInitialized,
    GameEnded,
    TurnStarted,
    TurnEnded,
    ManaChanged,
    HeroDamaged,
    HeroHealed,
    CardDrawn,
    CardBurned,
    DeckEmpty,
    CardPlayed,
    WeaponEquipped,
    WeaponBroken,
    MinionSummoned,
    MinionMoved,
    MinionAttacked,
    MinionDamaged,
    MinionHealed,
    MinionDied,
    TowerDamaged,
    TowerDestroyed,
    EffectTriggered,
    AnimationFinished,
}

impl EventKind {
    pub const ALL: [EventKind; 23] = [
        EventKind::GameInitialized,
        EventKind::GameEnded,
        EventKind::TurnStarted,
        EventKind::TurnEnded,
        EventKind::ManaChanged,
        EventKind::HeroDamaged,
        EventKind::HeroHealed,
        EventKind::CardDrawn,
        EventKind::CardBurned,
        EventKind::DeckEmpty,
        EventKind::CardPlayed,
        EventKind::WeaponEquipped,
        EventKind::WeaponBroken,
        EventKind::MinionSummoned,
        EventKind::MinionMoved,
        EventKind::MinionAttacked,
        EventKind::MinionDamaged,
        EventKind::MinionHealed,
        EventKind::MinionDied,
        EventKind::TowerDamaged,
        EventKind::TowerDestroyed,
        EventKind::EffectTriggered,
        EventKind::AnimationFinished,
    ];

    /// Stable wire name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::GameInitialized => "game:initialized",
            EventKind::GameEnded => "game:ended",
            EventKind::TurnStarted => "turn:started",
            EventKind::TurnEnded => "turn:ended",
            EventKind::ManaChanged => "player:mana_changed",
            EventKind::HeroDamaged => "player:damaged",
            EventKind::HeroHealed => "player:healed",
            EventKind::CardDrawn => "card:drawn",
            EventKind::CardBurned => "card:burned",
            EventKind::DeckEmpty => "deck:empty",
            EventKind::CardPlayed => "card:played",
            EventKind::WeaponEquipped => "weapon:equipped",
            EventKind::WeaponBroken => "weapon:broken",
            EventKind::MinionSummoned => "minion:summoned",
            EventKind::MinionMoved => "minion:moved",
            EventKind::MinionAttacked => "minion:attacked",
            EventKind::MinionDamaged => "minion:damaged",
            EventKind::MinionHealed => "minion:healed",
            EventKind::MinionDied => "minion:died",
            EventKind::TowerDamaged => "tower:damaged",
            EventKind::TowerDestroyed => "tower:destroyed",
            EventKind::EffectTriggered => "effect:triggered",
            EventKind::AnimationFinished => "animation:finished",
        }
    }

    /// Look up a kind by wire name; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<EventKind> {
        EventKind::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::GameInitialized { .. } => EventKind::GameInitialized,
            GameEvent::GameEnded { .. } => EventKind::GameEnded,
            GameEvent::TurnStarted { .. } => EventKind::TurnStarted,
            GameEvent::TurnEnded { .. } => EventKind::TurnEnded,
            GameEvent::ManaChanged { .. } => EventKind::ManaChanged,
            GameEvent::HeroDamaged { .. } => EventKind::HeroDamaged,
            GameEvent::HeroHealed { .. } => EventKind::HeroHealed,
            GameEvent::CardDrawn { .. } => EventKind::CardDrawn,
            GameEvent::CardBurned { .. } => EventKind::CardBurned,
            GameEvent::DeckEmpty { .. } => EventKind::DeckEmpty,
            GameEvent::CardPlayed { .. } => EventKind::CardPlayed,
            GameEvent::WeaponEquipped { .. } => EventKind::WeaponEquipped,
            GameEvent::WeaponBroken { .. } => EventKind::WeaponBroken,
            GameEvent::MinionSummoned { .. } => EventKind::MinionSummoned,
            GameEvent::MinionMoved { .. } => EventKind::MinionMoved,
            GameEvent::MinionAttacked { .. } => EventKind::MinionAttacked,
            GameEvent::MinionDamaged { .. } => EventKind::MinionDamaged,
            GameEvent::MinionHealed { .. } => EventKind::MinionHealed,
            GameEvent::MinionDied { .. } => EventKind::MinionDied,
            GameEvent::TowerDamaged { .. } => EventKind::TowerDamaged,
            GameEvent::TowerDestroyed { .. } => EventKind::TowerDestroyed,
            GameEvent::EffectTriggered(_) => EventKind::EffectTriggered,
            GameEvent::AnimationFinished { .. } => EventKind::AnimationFinished,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Shorthand for an ad hoc `effect:triggered` notification
    pub fn custom(label: impl Into<String>, detail: impl Into<String>) -> Self {
        GameEvent::EffectTriggered(EffectNotice::Custom {
            label: label.into(),
            detail: detail.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_kind() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("minion:teleported"), None);
    }

    #[test]
    fn test_event_names() {
        let died = GameEvent::MinionDied {
            minion: MinionId::new(1),
            source: Source::None,
        };
        assert_eq!(died.name(), "minion:died");
        assert_eq!(GameEvent::custom("shout", "hi").name(), "effect:triggered");
    }

    #[test]
    fn test_custom_notice_label() {
        match GameEvent::custom("shout", "hi") {
            GameEvent::EffectTriggered(notice) => assert_eq!(notice.label(), "shout"),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
