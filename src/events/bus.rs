//! Publish/subscribe event bus
//!
//! The bus is a cheap-to-clone handle around shared state. The game manager
//! and the board each hold a clone; subscribers may capture one too and
//! publish from inside a callback.
//!
//! Dispatch is synchronous. Subscribers for a concrete event run first in
//! ascending priority (ties in subscription order), then wildcard
//! subscribers in the same order. Time only moves inside [`EventBus::update`],
//! which delivers delayed events, advances sequences and drains the queues.

use crate::events::{EventKind, GameEvent};
use crate::game::GameLogger;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Priority given when a subscriber does not care
pub const DEFAULT_PRIORITY: i32 = 50;

/// Capacity of the recent-event log
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Nested publish depth at which further events are dropped
pub const MAX_DISPATCH_DEPTH: usize = 32;

type Handler = dyn Fn(&GameEvent) -> anyhow::Result<()>;

/// Opaque handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Ordered delivery queues, drained by `update` in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueName {
    High,
    Game,
    Ui,
    Animation,
    Low,
}

impl QueueName {
    pub const ALL: [QueueName; 5] = [
        QueueName::High,
        QueueName::Game,
        QueueName::Ui,
        QueueName::Animation,
        QueueName::Low,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One step of a published sequence
#[derive(Debug, Clone)]
pub struct SequenceStep {
    pub event: GameEvent,
    /// Seconds to wait after the previous step (or after scheduling, for
    /// the first step)
    pub delay: f64,
}

impl SequenceStep {
    pub fn new(event: GameEvent, delay: f64) -> Self {
        SequenceStep { event, delay }
    }
}

/// Entry of the recent-event log
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub name: &'static str,
    /// Bus clock at publish time
    pub time: f64,
    /// Running publish counter
    pub index: u64,
}

struct Subscription {
    id: SubscriptionId,
    subscriber: String,
    priority: i32,
    handler: Rc<Handler>,
}

struct DelayedEvent {
    due: f64,
    order: u64,
    event: GameEvent,
}

struct EventSequence {
    steps: VecDeque<SequenceStep>,
    next_due: f64,
}

#[derive(Default)]
struct BusState {
    subscriptions: FxHashMap<EventKind, Vec<Subscription>>,
    wildcard: Vec<Subscription>,
    next_id: u64,
    now: f64,
    delayed: Vec<DelayedEvent>,
    sequences: Vec<EventSequence>,
    queues: [VecDeque<GameEvent>; 5],
    recent: VecDeque<EventRecord>,
    published: u64,
    depth: usize,
}

impl BusState {
    fn insert_sorted(list: &mut Vec<Subscription>, sub: Subscription) {
        let at = list
            .iter()
            .position(|s| s.priority > sub.priority)
            .unwrap_or(list.len());
        list.insert(at, sub);
    }

    fn record(&mut self, name: &'static str) {
        if self.recent.len() == EVENT_LOG_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(EventRecord {
            name,
            time: self.now,
            index: self.published,
        });
        self.published += 1;
    }
}

type Dispatch = (SubscriptionId, String, Rc<Handler>);

/// Event-dispatch service shared by one match
#[derive(Clone)]
pub struct EventBus {
    state: Rc<RefCell<BusState>>,
    logger: Rc<GameLogger>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_logger(GameLogger::new())
    }

    pub fn with_logger(logger: GameLogger) -> Self {
        EventBus {
            state: Rc::new(RefCell::new(BusState::default())),
            logger: Rc::new(logger),
        }
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    /// Subscribe to one event kind
    pub fn subscribe<F>(
        &self,
        kind: EventKind,
        subscriber: impl Into<String>,
        priority: i32,
        callback: F,
    ) -> SubscriptionId
    where
        F: Fn(&GameEvent) -> anyhow::Result<()> + 'static,
    {
        let mut state = self.state.borrow_mut();
        let sub = Self::make_subscription(&mut state, subscriber.into(), priority, Rc::new(callback));
        let id = sub.id;
        BusState::insert_sorted(state.subscriptions.entry(kind).or_default(), sub);
        id
    }

    /// Subscribe to every event; the callback also receives the event name
    pub fn subscribe_all<F>(
        &self,
        subscriber: impl Into<String>,
        priority: i32,
        callback: F,
    ) -> SubscriptionId
    where
        F: Fn(&'static str, &GameEvent) -> anyhow::Result<()> + 'static,
    {
        let mut state = self.state.borrow_mut();
        let handler: Rc<Handler> = Rc::new(move |event: &GameEvent| callback(event.name(), event));
        let sub = Self::make_subscription(&mut state, subscriber.into(), priority, handler);
        let id = sub.id;
        BusState::insert_sorted(&mut state.wildcard, sub);
        id
    }

    fn make_subscription(
        state: &mut BusState,
        subscriber: String,
        priority: i32,
        handler: Rc<Handler>,
    ) -> Subscription {
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        Subscription {
            id,
            subscriber,
            priority,
            handler,
        }
    }

    /// Remove a subscription; unknown handles are logged and ignored
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let mut removed = false;
            for list in state.subscriptions.values_mut() {
                let before = list.len();
                list.retain(|s| s.id != id);
                removed |= list.len() != before;
            }
            let before = state.wildcard.len();
            state.wildcard.retain(|s| s.id != id);
            removed | (state.wildcard.len() != before)
        };
        if !removed {
            self.logger
                .error("bus", &format!("unsubscribe: unknown subscription {}", id.0));
        }
        removed
    }

    /// Deliver an event to every matching subscriber right now
    pub fn publish(&self, event: GameEvent) {
        self.dispatch(&event);
    }

    fn dispatch(&self, event: &GameEvent) {
        let (depth, handlers): (usize, Vec<Dispatch>) = {
            let mut state = self.state.borrow_mut();
            if state.depth >= MAX_DISPATCH_DEPTH {
                drop(state);
                self.logger.error(
                    "bus",
                    &format!("dropping '{}': publish depth limit reached", event.name()),
                );
                return;
            }
            state.depth += 1;
            state.record(event.name());

            let concrete = state.subscriptions.get(&event.kind()).into_iter().flatten();
            let handlers = concrete
                .chain(state.wildcard.iter())
                .map(|s| (s.id, s.subscriber.clone(), Rc::clone(&s.handler)))
                .collect();
            (state.depth, handlers)
        };

        for (id, subscriber, handler) in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => self.logger.error(
                    "bus",
                    &format!("subscriber '{subscriber}' ({}) failed on '{}': {err:#}", id.0, event.name()),
                ),
                Err(_) => {
                    // Nested dispatches unwound by the panic never decremented
                    self.state.borrow_mut().depth = depth;
                    self.logger.error(
                        "bus",
                        &format!("subscriber '{subscriber}' ({}) panicked on '{}'", id.0, event.name()),
                    );
                }
            }
        }

        self.state.borrow_mut().depth -= 1;
    }

    /// Schedule an event `delay` seconds from the current bus clock
    pub fn publish_delayed(&self, event: GameEvent, delay: f64) {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay.max(0.0);
        let order = state.next_id;
        state.next_id += 1;
        state.delayed.push(DelayedEvent { due, order, event });
    }

    /// Schedule an ordered chain of events
    pub fn publish_sequence(&self, steps: Vec<SequenceStep>) {
        let mut steps: VecDeque<SequenceStep> = steps.into();
        let Some(first) = steps.front() else {
            return;
        };
        let mut state = self.state.borrow_mut();
        let next_due = state.now + first.delay.max(0.0);
        // The first step's delay is now folded into next_due
        if let Some(first) = steps.front_mut() {
            first.delay = 0.0;
        }
        state.sequences.push(EventSequence { steps, next_due });
    }

    /// Buffer an event until the next `update`
    pub fn publish_to_queue(&self, queue: QueueName, event: GameEvent) {
        self.state.borrow_mut().queues[queue.index()].push_back(event);
    }

    /// Advance the bus clock and deliver everything that became due
    ///
    /// Order: delayed events, sequence steps, then queues by priority.
    pub fn update(&self, dt: f64) {
        self.state.borrow_mut().now += dt.max(0.0);
        self.deliver_delayed();
        self.advance_sequences();
        self.drain_queues();
    }

    fn deliver_delayed(&self) {
        let due = {
            let mut state = self.state.borrow_mut();
            let now = state.now;
            let (mut ready, pending): (Vec<_>, Vec<_>) =
                state.delayed.drain(..).partition(|d| d.due <= now);
            state.delayed = pending;
            ready.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.order.cmp(&b.order)));
            ready
        };
        for delayed in due {
            self.dispatch(&delayed.event);
        }
    }

    fn advance_sequences(&self) {
        let fired = {
            let mut state = self.state.borrow_mut();
            let now = state.now;
            let mut fired = Vec::new();
            for sequence in state.sequences.iter_mut() {
                while sequence.next_due <= now {
                    let Some(step) = sequence.steps.pop_front() else {
                        break;
                    };
                    fired.push(step.event);
                    match sequence.steps.front() {
                        Some(next) => sequence.next_due = now + next.delay.max(0.0),
                        None => break,
                    }
                }
            }
            state.sequences.retain(|s| !s.steps.is_empty());
            fired
        };
        for event in fired {
            self.dispatch(&event);
        }
    }

    fn drain_queues(&self) {
        // Only what was queued before the drain; later arrivals wait a frame
        let pending = QueueName::ALL.map(|queue| self.queue_len(queue));
        for (queue, pending) in QueueName::ALL.into_iter().zip(pending) {
            for _ in 0..pending {
                let next = self.state.borrow_mut().queues[queue.index()].pop_front();
                match next {
                    Some(event) => self.dispatch(&event),
                    None => break,
                }
            }
        }
    }

    /// Drop every delayed, sequenced and queued event
    pub fn clear_pending(&self) {
        let mut state = self.state.borrow_mut();
        state.delayed.clear();
        state.sequences.clear();
        for queue in state.queues.iter_mut() {
            queue.clear();
        }
    }

    // Diagnostics

    /// Current bus clock in seconds
    pub fn now(&self) -> f64 {
        self.state.borrow().now
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .subscriptions
            .get(&kind)
            .map_or(0, Vec::len)
    }

    pub fn wildcard_count(&self) -> usize {
        self.state.borrow().wildcard.len()
    }

    pub fn total_subscribers(&self) -> usize {
        let state = self.state.borrow();
        state.subscriptions.values().map(Vec::len).sum::<usize>() + state.wildcard.len()
    }

    /// Subscriber names for one kind, in dispatch order
    pub fn subscribers(&self, kind: EventKind) -> Vec<String> {
        self.state
            .borrow()
            .subscriptions
            .get(&kind)
            .map(|list| list.iter().map(|s| s.subscriber.clone()).collect())
            .unwrap_or_default()
    }

    pub fn pending_delayed(&self) -> usize {
        self.state.borrow().delayed.len()
    }

    pub fn pending_sequences(&self) -> usize {
        self.state.borrow().sequences.len()
    }

    pub fn queue_len(&self, queue: QueueName) -> usize {
        self.state.borrow().queues[queue.index()].len()
    }

    /// Delayed events, remaining sequence steps and queued events combined
    pub fn pending_total(&self) -> usize {
        let state = self.state.borrow();
        state.delayed.len()
            + state.sequences.iter().map(|s| s.steps.len()).sum::<usize>()
            + state.queues.iter().map(VecDeque::len).sum::<usize>()
    }

    /// Most recent published events, oldest first
    pub fn recent_events(&self) -> Vec<EventRecord> {
        self.state.borrow().recent.iter().cloned().collect()
    }

    pub fn published_count(&self) -> u64 {
        self.state.borrow().published
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.total_subscribers())
            .field("pending", &self.pending_total())
            .field("published", &self.published_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;
    use std::cell::Cell;

    fn turn(n: u32) -> GameEvent {
        GameEvent::TurnStarted {
            player: PlayerId::new(0),
            turn: n,
        }
    }

    fn quiet_bus() -> EventBus {
        EventBus::with_logger(GameLogger::capturing())
    }

    #[test]
    fn test_priority_order() {
        let bus = quiet_bus();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (name, priority) in [("late", 90), ("early", 10), ("default", DEFAULT_PRIORITY)] {
            let order = Rc::clone(&order);
            bus.subscribe(EventKind::TurnStarted, name, priority, move |_| {
                order.borrow_mut().push(name);
                Ok(())
            });
        }

        bus.publish(turn(1));
        assert_eq!(*order.borrow(), vec!["early", "default", "late"]);
        assert_eq!(bus.subscribers(EventKind::TurnStarted), vec!["early", "default", "late"]);
    }

    #[test]
    fn test_wildcard_runs_after_concrete() {
        let bus = quiet_bus();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        bus.subscribe_all("logger", 0, move |name, _| {
            o.borrow_mut().push(format!("wild:{name}"));
            Ok(())
        });
        let o = Rc::clone(&order);
        bus.subscribe(EventKind::TurnStarted, "hud", 99, move |_| {
            o.borrow_mut().push("hud".to_string());
            Ok(())
        });

        bus.publish(turn(1));
        assert_eq!(*order.borrow(), vec!["hud".to_string(), "wild:turn:started".to_string()]);
    }

    #[test]
    fn test_failing_subscriber_is_isolated() {
        let bus = quiet_bus();
        let hits = Rc::new(Cell::new(0));

        bus.subscribe(EventKind::TurnStarted, "broken", 1, |_| anyhow::bail!("boom"));
        bus.subscribe(EventKind::TurnStarted, "panicky", 2, |_| panic!("kaboom"));
        let h = Rc::clone(&hits);
        bus.subscribe(EventKind::TurnStarted, "fine", 3, move |_| {
            h.set(h.get() + 1);
            Ok(())
        });

        bus.publish(turn(1));
        bus.publish(turn(2));
        assert_eq!(hits.get(), 2);
        assert_eq!(bus.logger().error_count(), 4);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = quiet_bus();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = bus.subscribe(EventKind::TurnStarted, "hud", DEFAULT_PRIORITY, move |_| {
            h.set(h.get() + 1);
            Ok(())
        });

        bus.publish(turn(1));
        assert!(bus.unsubscribe(id));
        bus.publish(turn(2));
        assert_eq!(hits.get(), 1);

        // Second removal fails quietly
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.logger().error_count(), 1);
        assert_eq!(bus.total_subscribers(), 0);
    }

    #[test]
    fn test_delayed_delivery() {
        let bus = quiet_bus();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        bus.subscribe(EventKind::TurnStarted, "hud", DEFAULT_PRIORITY, move |_| {
            h.set(h.get() + 1);
            Ok(())
        });

        bus.publish_delayed(turn(1), 0.5);
        assert_eq!(bus.pending_delayed(), 1);

        bus.update(0.3);
        assert_eq!(hits.get(), 0);
        bus.update(0.3);
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.pending_delayed(), 0);
    }

    #[test]
    fn test_sequence_spacing() {
        let bus = quiet_bus();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        bus.subscribe(EventKind::TurnStarted, "hud", DEFAULT_PRIORITY, move |e| {
            if let GameEvent::TurnStarted { turn, .. } = e {
                s.borrow_mut().push(*turn);
            }
            Ok(())
        });

        bus.publish_sequence(vec![
            SequenceStep::new(turn(1), 0.0),
            SequenceStep::new(turn(2), 1.0),
            SequenceStep::new(turn(3), 1.0),
        ]);

        bus.update(0.0);
        assert_eq!(*seen.borrow(), vec![1]);
        bus.update(0.5);
        assert_eq!(*seen.borrow(), vec![1]);
        bus.update(0.5);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(bus.pending_sequences(), 1);
        bus.update(1.0);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert_eq!(bus.pending_sequences(), 0);
    }

    #[test]
    fn test_queue_drain_order() {
        let bus = quiet_bus();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        bus.subscribe(EventKind::TurnStarted, "hud", DEFAULT_PRIORITY, move |e| {
            if let GameEvent::TurnStarted { turn, .. } = e {
                s.borrow_mut().push(*turn);
            }
            Ok(())
        });

        bus.publish_to_queue(QueueName::Low, turn(5));
        bus.publish_to_queue(QueueName::Ui, turn(3));
        bus.publish_to_queue(QueueName::High, turn(1));
        bus.publish_to_queue(QueueName::Ui, turn(4));
        bus.publish_to_queue(QueueName::Game, turn(2));
        assert_eq!(bus.pending_total(), 5);

        bus.update(0.016);
        assert_eq!(*seen.borrow(), vec![1, 2, 3, 4, 5]);
        assert_eq!(bus.pending_total(), 0);
    }

    #[test]
    fn test_reentrant_publish_and_cycle_guard() {
        let bus = quiet_bus();
        let count = Rc::new(Cell::new(0));

        // The handler republishes its own event forever
        let inner = bus.clone();
        let c = Rc::clone(&count);
        bus.subscribe(EventKind::TurnStarted, "echo", DEFAULT_PRIORITY, move |e| {
            c.set(c.get() + 1);
            inner.publish(e.clone());
            Ok(())
        });

        bus.publish(turn(1));
        assert_eq!(count.get(), MAX_DISPATCH_DEPTH);
        assert_eq!(bus.logger().error_count(), 1);
        assert_eq!(bus.published_count(), MAX_DISPATCH_DEPTH as u64);

        // The guard unwinds fully
        bus.publish(turn(2));
        assert_eq!(count.get(), 2 * MAX_DISPATCH_DEPTH);
    }

    #[test]
    fn test_recent_log_is_bounded() {
        let bus = quiet_bus();
        for n in 0..(EVENT_LOG_CAPACITY as u32 + 20) {
            bus.publish(turn(n));
        }
        let recent = bus.recent_events();
        assert_eq!(recent.len(), EVENT_LOG_CAPACITY);
        assert_eq!(recent[0].index, 20);
        assert_eq!(bus.published_count(), EVENT_LOG_CAPACITY as u64 + 20);
    }
}
