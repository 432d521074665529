//! Animation capability
//!
//! Playback lives outside the core. A renderer plugs in an
//! [`AnimationPlayer`]; without one, [`NullAnimationPlayer`] reports that
//! animations are disabled and every cue completes at once. Either way the
//! [`AnimationBridge`] publishes `animation:finished` through the
//! `animation` queue, so nothing downstream waits on a missing renderer.

use crate::events::{EventBus, EventKind, GameEvent, QueueName, SubscriptionId};
use std::cell::RefCell;
use std::rc::Rc;

pub trait AnimationPlayer {
    /// False when playback is unavailable; cues are then skipped
    fn is_enabled(&self) -> bool;

    /// Start playing `cue` for `event`
    fn play(&mut self, cue: &str, event: &GameEvent);

    /// Advance playback; returns the cues that finished
    fn update(&mut self, dt: f64) -> Vec<String>;
}

/// Stand-in used when no renderer is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAnimationPlayer;

impl AnimationPlayer for NullAnimationPlayer {
    fn is_enabled(&self) -> bool {
        false
    }

    fn play(&mut self, _cue: &str, _event: &GameEvent) {}

    fn update(&mut self, _dt: f64) -> Vec<String> {
        Vec::new()
    }
}

/// Cue name for events that have an animation
pub fn cue_for(event: &GameEvent) -> Option<&'static str> {
    match event.kind() {
        EventKind::MinionSummoned
        | EventKind::MinionMoved
        | EventKind::MinionAttacked
        | EventKind::MinionDied
        | EventKind::TowerDamaged
        | EventKind::TowerDestroyed
        | EventKind::CardPlayed => Some(event.name()),
        _ => None,
    }
}

/// Forwards animated events to a player and reports completions
pub struct AnimationBridge {
    player: Rc<RefCell<Box<dyn AnimationPlayer>>>,
    skipped: Rc<RefCell<Vec<String>>>,
    bus: EventBus,
    subscription: SubscriptionId,
}

impl AnimationBridge {
    pub fn attach(bus: &EventBus, player: Box<dyn AnimationPlayer>) -> Self {
        if !player.is_enabled() {
            bus.logger().category("bus", "animations disabled");
        }
        let player = Rc::new(RefCell::new(player));
        let skipped = Rc::new(RefCell::new(Vec::new()));

        let (p, s) = (Rc::clone(&player), Rc::clone(&skipped));
        let subscription = bus.subscribe_all("animation_bridge", 90, move |_, event| {
            let Some(cue) = cue_for(event) else {
                return Ok(());
            };
            let mut player = p
                .try_borrow_mut()
                .map_err(|_| anyhow::anyhow!("animation player busy while handling {cue}"))?;
            if player.is_enabled() {
                player.play(cue, event);
            } else {
                s.borrow_mut().push(cue.to_string());
            }
            Ok(())
        });

        AnimationBridge {
            player,
            skipped,
            bus: bus.clone(),
            subscription,
        }
    }

    /// Stand-alone bridge with the null player
    pub fn disabled(bus: &EventBus) -> Self {
        Self::attach(bus, Box::new(NullAnimationPlayer))
    }

    pub fn is_enabled(&self) -> bool {
        self.player.borrow().is_enabled()
    }

    /// Advance playback and queue `animation:finished` for each completed
    /// or skipped cue; call once per frame before `EventBus::update`
    pub fn update(&mut self, dt: f64) {
        let finished = self.player.borrow_mut().update(dt);
        for cue in finished {
            self.bus.publish_to_queue(
                QueueName::Animation,
                GameEvent::AnimationFinished { cue, skipped: false },
            );
        }
        let skipped: Vec<String> = self.skipped.borrow_mut().drain(..).collect();
        for cue in skipped {
            self.bus.publish_to_queue(
                QueueName::Animation,
                GameEvent::AnimationFinished { cue, skipped: true },
            );
        }
    }
}

impl Drop for AnimationBridge {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}
