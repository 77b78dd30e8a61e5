//! Wall-clock sources.
//!
//! The clock samples "now" through [`WallClock`] so hosts can drive it from
//! the system clock while tests step time by hand.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};

/// A source of the current wall-clock time.
pub trait WallClock: fmt::Debug {
    /// The current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A wall clock that only moves when told to.
///
/// Clones share the same instant, so one handle can be given to the clock
/// engine while another steps time.
#[derive(Clone)]
pub struct ManualWallClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualWallClock {
    /// Create a manual clock starting at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Create a manual clock starting at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Move the clock forward (or backward, for a negative delta).
    pub fn advance(&self, delta: TimeDelta) {
        let next = self
            .now
            .get()
            .checked_add_signed(delta)
            .unwrap_or_else(|| self.now.get());
        self.now.set(next);
    }

    /// Move the clock forward by whole milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        self.advance(TimeDelta::milliseconds(millis));
    }
}

impl WallClock for ManualWallClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl fmt::Debug for ManualWallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualWallClock")
            .field("now", &self.now.get())
            .finish()
    }
}

/// Seconds from `earlier` to `later`. A clock that went backwards yields 0.
pub fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    later
        .signed_duration_since(earlier)
        .to_std()
        .map_or(0.0, |elapsed| elapsed.as_secs_f64())
}
