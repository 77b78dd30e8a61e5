//! Host frame loop.
//!
//! [`run_until`] drives a [`Session`] from a `tokio` interval timer until a
//! bound in [`HostConfig`] is reached or the shutdown future resolves:
//!
//! - **Frame bound**: stop after `max_frames` frames (0 = unlimited)
//! - **Time bound**: stop after `max_real_time_seconds` (0 = unlimited)
//! - **Shutdown**: stop as soon as the shutdown future completes (Ctrl-C
//!   in the binary)
//!
//! The session itself is synchronous; the loop only decides when frames
//! happen.

use std::future::Future;

use dayglass_core::config::HostConfig;
use dayglass_types::VirtualCalendar;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::session::Session;

/// Why the frame loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `max_frames` frames ran.
    MaxFramesReached,
    /// `max_real_time_seconds` elapsed.
    MaxRealTimeReached,
    /// The shutdown future completed.
    Shutdown,
}

/// Outcome of a frame loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Frames executed.
    pub frames: u64,
    /// Virtual minutes advanced over the run.
    pub minutes_advanced: u64,
    /// Calendar at the end of the run.
    pub final_calendar: VirtualCalendar,
}

/// Run frames until a bound is hit or `shutdown` completes.
pub async fn run_until<F>(session: &mut Session, host: &HostConfig, shutdown: F) -> RunResult
where
    F: Future<Output = ()>,
{
    let period = Duration::from_millis(host.frame_interval_ms.max(1));
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let time_limit =
        (host.max_real_time_seconds > 0).then(|| Duration::from_secs(host.max_real_time_seconds));
    let started = Instant::now();
    let mut frames: u64 = 0;
    let mut minutes_advanced: u64 = 0;

    info!(
        frame_interval_ms = host.frame_interval_ms,
        max_frames = host.max_frames,
        max_real_time_seconds = host.max_real_time_seconds,
        "Frame loop starting"
    );

    tokio::pin!(shutdown);

    let end_reason = loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!("Shutdown requested");
                break EndReason::Shutdown;
            }
            _ = ticker.tick() => {}
        }

        let advanced = session.frame_from_wall_clock();
        minutes_advanced = minutes_advanced.saturating_add(advanced);
        frames = frames.saturating_add(1);

        if host.max_frames > 0 && frames >= host.max_frames {
            info!(frames, "Frame limit reached");
            break EndReason::MaxFramesReached;
        }
        if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
            info!(
                max_seconds = host.max_real_time_seconds,
                "Real-time limit reached"
            );
            break EndReason::MaxRealTimeReached;
        }
    };

    RunResult {
        end_reason,
        frames,
        minutes_advanced,
        final_calendar: session.save(),
    }
}

/// Log the end of a run, including the persisted calendar as JSON.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        frames = result.frames,
        minutes_advanced = result.minutes_advanced,
        calendar = %result.final_calendar,
        "Frame loop ended"
    );
    match serde_json::to_string(&result.final_calendar) {
        Ok(save) => info!(save = %save, "Persisted calendar"),
        Err(e) => warn!(error = %e, "Failed to encode calendar"),
    }
}
