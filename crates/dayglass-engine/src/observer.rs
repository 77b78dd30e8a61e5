//! Event logging task.
//!
//! The host subscribes a [`BroadcastObserver`](dayglass_events::BroadcastObserver)
//! to the clock and hands the receiver to [`log_events`], which runs as a
//! spawned task, logs every event, and returns a tally once the session
//! (and with it the sender) is dropped.

use dayglass_events::ClockEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

/// Counts of every clock event seen during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTally {
    /// Lottery windows opened.
    pub windows_opened: u64,
    /// Lottery windows closed (expired or suspended).
    pub windows_closed: u64,
    /// Coarse period changes.
    pub period_changes: u64,
    /// Attrition boundaries crossed.
    pub attrition_crossings: u64,
    /// Events dropped because the task fell behind.
    pub lagged: u64,
}

impl EventTally {
    /// Count one event.
    pub const fn record(&mut self, event: &ClockEvent) {
        let slot = match event {
            ClockEvent::LotteryWindowChanged { active: true } => &mut self.windows_opened,
            ClockEvent::LotteryWindowChanged { active: false } => &mut self.windows_closed,
            ClockEvent::PeriodChanged { .. } => &mut self.period_changes,
            ClockEvent::AttritionBoundaryCrossed => &mut self.attrition_crossings,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Log clock events until the channel closes, then return the tally.
pub async fn log_events(mut rx: broadcast::Receiver<ClockEvent>) -> EventTally {
    let mut tally = EventTally::default();
    loop {
        match rx.recv().await {
            Ok(event) => {
                info!(%event, "Clock event");
                tally.record(&event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event logger fell behind");
                tally.lagged = tally.lagged.saturating_add(skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
    tally
}
