//! Synchronous publish/subscribe event bus
//!
//! Dispatch runs on the single logic thread. Each publish iterates a snapshot
//! of the topic's handlers, so subscribing or unsubscribing from inside a
//! handler only affects later publishes. A handler that returns an error is
//! logged and the remaining handlers still run. Native builds also contain
//! handler panics the same way; on wasm32 a panic aborts.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use super::state_machine::GameMode;
use crate::error::HandlerError;

/// Event topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    StateChanged,
    SceneEntered,
    SceneExited,
    LevelStarted,
    LevelCompleted,
    ChaosStarted,
    ChaosEnded,
    PenaltyAdded,
    Click,
    DragStart,
    DragEnd,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::StateChanged => "state:changed",
            Topic::SceneEntered => "scene:entered",
            Topic::SceneExited => "scene:exited",
            Topic::LevelStarted => "level:started",
            Topic::LevelCompleted => "level:completed",
            Topic::ChaosStarted => "chaos:started",
            Topic::ChaosEnded => "chaos:ended",
            Topic::PenaltyAdded => "penalty:added",
            Topic::Click => "input:click",
            Topic::DragStart => "input:drag_start",
            Topic::DragEnd => "input:drag_end",
        }
    }
}

/// Event payloads, one variant per topic
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    StateChanged { next: GameMode, previous: GameMode },
    SceneEntered(String),
    SceneExited(String),
    LevelStarted { level: u8 },
    LevelCompleted { level: u8, time_ms: f64 },
    /// Carries the effect's display name
    ChaosStarted(&'static str),
    ChaosEnded,
    PenaltyAdded { ms: f64 },
    Click { x: f32, y: f32, button: i16 },
    DragStart { x: f32, y: f32 },
    DragEnd { x: f32, y: f32 },
}

impl GameEvent {
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::StateChanged { .. } => Topic::StateChanged,
            GameEvent::SceneEntered(_) => Topic::SceneEntered,
            GameEvent::SceneExited(_) => Topic::SceneExited,
            GameEvent::LevelStarted { .. } => Topic::LevelStarted,
            GameEvent::LevelCompleted { .. } => Topic::LevelCompleted,
            GameEvent::ChaosStarted(_) => Topic::ChaosStarted,
            GameEvent::ChaosEnded => Topic::ChaosEnded,
            GameEvent::PenaltyAdded { .. } => Topic::PenaltyAdded,
            GameEvent::Click { .. } => Topic::Click,
            GameEvent::DragStart { .. } => Topic::DragStart,
            GameEvent::DragEnd { .. } => Topic::DragEnd,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type HandlerResult = Result<(), HandlerError>;

pub type Handler = Rc<dyn Fn(&GameEvent) -> HandlerResult>;

#[cfg(not(target_arch = "wasm32"))]
fn dispatch(handler: &Handler, event: &GameEvent) -> HandlerResult {
    catch_unwind(AssertUnwindSafe(|| handler(event)))
        .unwrap_or_else(|_| Err(HandlerError("handler panicked".to_string())))
}

#[cfg(target_arch = "wasm32")]
fn dispatch(handler: &Handler, event: &GameEvent) -> HandlerResult {
    handler(event)
}

#[derive(Clone)]
struct Listener {
    id: SubscriptionId,
    handler: Handler,
    once: bool,
}

/// Publish/subscribe channel shared by every component of a session
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<HashMap<Topic, Vec<Listener>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; handlers run in subscription order
    pub fn subscribe(
        &self,
        topic: Topic,
        handler: impl Fn(&GameEvent) -> HandlerResult + 'static,
    ) -> SubscriptionId {
        self.insert(topic, Rc::new(handler), false)
    }

    /// Register a handler that is removed before its first invocation
    pub fn subscribe_once(
        &self,
        topic: Topic,
        handler: impl Fn(&GameEvent) -> HandlerResult + 'static,
    ) -> SubscriptionId {
        self.insert(topic, Rc::new(handler), true)
    }

    fn insert(&self, topic: Topic, handler: Handler, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Listener { id, handler, once });
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(list) = listeners.get_mut(&topic) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        before != list.len()
    }

    /// Deliver an event to every handler subscribed to its topic.
    /// Returns the number of handlers that succeeded.
    pub fn publish(&self, event: GameEvent) -> usize {
        let topic = event.topic();
        let snapshot: Vec<Listener> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(list) = listeners.get_mut(&topic) else {
                return 0;
            };
            let snapshot = list.clone();
            list.retain(|l| !l.once);
            snapshot
        };

        let mut delivered = 0;
        for listener in snapshot {
            match dispatch(&listener.handler, &event) {
                Ok(()) => delivered += 1,
                Err(e) => log::error!("Handler for {} failed: {}", topic.as_str(), e),
            }
        }
        delivered
    }

    /// Drop all handlers for one topic, or for every topic
    pub fn clear(&self, topic: Option<Topic>) {
        let mut listeners = self.listeners.borrow_mut();
        match topic {
            Some(topic) => {
                listeners.remove(&topic);
            }
            None => listeners.clear(),
        }
    }

    pub fn listener_count(&self, topic: Topic) -> usize {
        self.listeners.borrow().get(&topic).map(Vec::len).unwrap_or(0)
    }
}

/// Records every event published on the topics it is attached to
#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe the log to the given topics on a bus
    pub fn attach(&self, bus: &EventBus, topics: &[Topic]) {
        for &topic in topics {
            let events = Rc::clone(&self.events);
            bus.subscribe(topic, move |event| {
                events.borrow_mut().push(event.clone());
                Ok(())
            });
        }
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, topic: Topic) -> usize {
        self.events.borrow().iter().filter(|e| e.topic() == topic).count()
    }

    pub fn take(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe(Topic::ChaosEnded, move |_| {
                order.borrow_mut().push(i);
                Ok(())
            });
        }
        assert_eq!(bus.publish(GameEvent::ChaosEnded), 3);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_subscribe_during_dispatch_does_not_affect_inflight_publish() {
        let bus = Rc::new(EventBus::new());
        let calls = Rc::new(Cell::new(0));
        {
            let bus_inner = Rc::clone(&bus);
            let calls = Rc::clone(&calls);
            bus.subscribe(Topic::ChaosEnded, move |_| {
                let calls = Rc::clone(&calls);
                bus_inner.subscribe(Topic::ChaosEnded, move |_| {
                    calls.set(calls.get() + 1);
                    Ok(())
                });
                Ok(())
            });
        }
        bus.publish(GameEvent::ChaosEnded);
        assert_eq!(calls.get(), 0);
        bus.publish(GameEvent::ChaosEnded);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_keeps_snapshot() {
        let bus = Rc::new(EventBus::new());
        let second_calls = Rc::new(Cell::new(0));
        let second_id = Rc::new(Cell::new(None));
        {
            let bus_inner = Rc::clone(&bus);
            let second_id = Rc::clone(&second_id);
            bus.subscribe(Topic::ChaosEnded, move |_| {
                if let Some(id) = second_id.get() {
                    bus_inner.unsubscribe(Topic::ChaosEnded, id);
                }
                Ok(())
            });
        }
        {
            let second_calls = Rc::clone(&second_calls);
            let id = bus.subscribe(Topic::ChaosEnded, move |_| {
                second_calls.set(second_calls.get() + 1);
                Ok(())
            });
            second_id.set(Some(id));
        }
        bus.publish(GameEvent::ChaosEnded);
        assert_eq!(second_calls.get(), 1);
        bus.publish(GameEvent::ChaosEnded);
        assert_eq!(second_calls.get(), 1);
    }

    fn flag_handler(reached: &Rc<Cell<bool>>) -> impl Fn(&GameEvent) -> HandlerResult + 'static {
        let reached = Rc::clone(reached);
        move |_| {
            reached.set(true);
            Ok(())
        }
    }

    #[test]
    fn test_failing_handler_is_isolated() {
        let bus = EventBus::new();
        let reached = Rc::new(Cell::new(false));
        bus.subscribe(Topic::ChaosEnded, |_| {
            Err(HandlerError("overlay not ready".to_string()))
        });
        bus.subscribe(Topic::ChaosEnded, flag_handler(&reached));
        assert_eq!(bus.publish(GameEvent::ChaosEnded), 1);
        assert!(reached.get());

        // Failure does not unsubscribe
        reached.set(false);
        assert_eq!(bus.listener_count(Topic::ChaosEnded), 2);
        assert_eq!(bus.publish(GameEvent::ChaosEnded), 1);
        assert!(reached.get());
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let bus = EventBus::new();
        let reached = Rc::new(Cell::new(false));
        bus.subscribe(Topic::ChaosEnded, |_| panic!("boom"));
        bus.subscribe(Topic::ChaosEnded, flag_handler(&reached));
        assert_eq!(bus.publish(GameEvent::ChaosEnded), 1);
        assert!(reached.get());
    }

    #[test]
    fn test_subscribe_once_fires_once() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        {
            let calls = Rc::clone(&calls);
            bus.subscribe_once(Topic::SceneEntered, move |_| {
                calls.set(calls.get() + 1);
                Ok(())
            });
        }
        bus.publish(GameEvent::SceneEntered("splash".into()));
        bus.publish(GameEvent::SceneEntered("splash".into()));
        assert_eq!(calls.get(), 1);
        assert_eq!(bus.listener_count(Topic::SceneEntered), 0);
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();
        bus.subscribe(Topic::ChaosEnded, |_| Ok(()));
        bus.subscribe(Topic::ChaosStarted, |_| Ok(()));
        bus.clear(Some(Topic::ChaosEnded));
        assert_eq!(bus.listener_count(Topic::ChaosEnded), 0);
        assert_eq!(bus.listener_count(Topic::ChaosStarted), 1);
        bus.clear(None);
        assert_eq!(bus.listener_count(Topic::ChaosStarted), 0);
    }
}
