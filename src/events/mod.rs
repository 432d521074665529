//! Event system decoupling game-state mutation from its consumers
//!
//! The board and the game manager publish fine-grained [`GameEvent`]s;
//! renderers, animation, AI loggers and the manager's own derived rules
//! subscribe to them.
//!
//! - [`types`]: event payloads and their wire names
//! - [`bus`]: the [`EventBus`] dispatcher

pub mod bus;
pub mod types;

pub use bus::{
    EventBus, EventRecord, QueueName, SequenceStep, SubscriptionId, DEFAULT_PRIORITY,
    EVENT_LOG_CAPACITY, MAX_DISPATCH_DEPTH,
};
pub use types::{EffectNotice, EventKind, GameEvent, Target};
