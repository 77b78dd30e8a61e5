//! Clock events and their delivery to subscribed collaborators.
//!
//! The clock never reaches for a global event system. Collaborators are
//! registered on an [`EventBus`] at composition time and the clock
//! publishes to it synchronously, in emission order.
//!
//! # Delivery options
//!
//! - [`ClockObserver`] -- implement directly for in-frame reactions
//!   (e.g. a stats collaborator reacting to attrition boundaries).
//! - [`EventRecorder`] -- collects events into a shared list; used by
//!   tests and by hosts that drain events once per frame.
//! - [`BroadcastObserver`] -- forwards events to a `tokio` broadcast
//!   channel so async tasks can follow the clock.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dayglass_types::CoarsePeriod;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel created by [`BroadcastObserver::channel`].
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const BROADCAST_CAPACITY: usize = 256;

/// A notification emitted by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockEvent {
    /// The lottery window opened (`active == true`) or closed.
    LotteryWindowChanged {
        /// Whether a window is now open.
        active: bool,
    },
    /// The coarse period changed.
    PeriodChanged {
        /// Period before the boundary.
        previous: CoarsePeriod,
        /// Period after the boundary.
        next: CoarsePeriod,
    },
    /// Morning -> Day or Evening -> Night was crossed. Consumed by the
    /// stats collaborator.
    AttritionBoundaryCrossed,
}

impl fmt::Display for ClockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LotteryWindowChanged { active: true } => write!(f, "lottery window opened"),
            Self::LotteryWindowChanged { active: false } => write!(f, "lottery window closed"),
            Self::PeriodChanged { previous, next } => {
                write!(f, "period changed {previous:?} -> {next:?}")
            }
            Self::AttritionBoundaryCrossed => write!(f, "attrition boundary crossed"),
        }
    }
}

/// Receives clock events as they are emitted.
///
/// Called synchronously from inside the clock's update, so
/// implementations must not block.
pub trait ClockObserver {
    /// Called once per emitted event.
    fn on_event(&mut self, event: &ClockEvent);
}

/// Ordered list of subscribed observers.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn ClockObserver>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn subscribe(&mut self, observer: Box<dyn ClockObserver>) {
        self.observers.push(observer);
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `event` to every observer.
    pub fn publish(&mut self, event: &ClockEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that appends every event to a shared list.
///
/// Clones share the same list, so one handle can be subscribed while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<ClockEvent>>>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<ClockEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return all events recorded so far.
    pub fn drain(&self) -> Vec<ClockEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Number of recorded events equal to `event`.
    pub fn count(&self, event: &ClockEvent) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }
}

impl ClockObserver for EventRecorder {
    fn on_event(&mut self, event: &ClockEvent) {
        self.events.borrow_mut().push(*event);
    }
}

/// Observer that forwards events to a `tokio` broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    tx: broadcast::Sender<ClockEvent>,
}

impl BroadcastObserver {
    /// Create an observer and its channel with [`BROADCAST_CAPACITY`].
    pub fn channel() -> (Self, broadcast::Receiver<ClockEvent>) {
        let (tx, rx) = broadcast::channel(BROADCAST_CAPACITY);
        (Self { tx }, rx)
    }

    /// Subscribe an additional receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.tx.subscribe()
    }
}

impl ClockObserver for BroadcastObserver {
    fn on_event(&mut self, event: &ClockEvent) {
        // send fails only when no receiver is alive, which is not an error.
        let _ = self.tx.send(*event);
    }
}
