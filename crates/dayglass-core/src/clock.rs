//! The clock engine: virtual calendar, real-to-virtual time conversion,
//! pause handling, the lottery, and coarse period transitions.
//!
//! The engine is the single owner of all temporal state for a session. It
//! is constructed explicitly, owned by the session, and lent to
//! collaborators by reference; collaborators only ever call its public
//! operations.
//!
//! # Anti-drift rule
//!
//! Wall-clock time that elapses while paused is never converted to virtual
//! time. Every pause toggle resamples the stored wall-clock instant, and a
//! paused [`update`](ClockEngine::update) resamples it again and returns
//! without touching the accumulator.
//!
//! # Per-minute processing
//!
//! Each whole virtual minute that accrues during an update is processed on
//! its own: the calendar advances by one minute, then the lottery step and
//! the period check run. A long frame spike therefore reports every window
//! expiry and every period boundary it crosses, in order.

use chrono::{DateTime, Utc};
use dayglass_events::{ClockEvent, ClockObserver, EventBus};
use dayglass_types::{CoarsePeriod, FineTimeOfDay, VirtualCalendar};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, trace, warn};

use crate::config::{ClockConfig, LotteryConfig};
use crate::lottery::{Lottery, LotteryRng, LotteryRules, LotteryTransition};
use crate::wall::{self, WallClock};

/// Errors that can occur when constructing or restoring a clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Invalid clock or lottery configuration.
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// A calendar position with a field out of range.
    #[error("invalid calendar position: month {month}, day {day}, {hour:02}:{minute:02}")]
    InvalidCalendar {
        /// Month field.
        month: u32,
        /// Day field.
        day: u32,
        /// Hour field.
        hour: u32,
        /// Minute field.
        minute: u32,
    },
}

/// Real time waiting to be converted, and the pause flag.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    /// Real seconds accrued toward the next virtual minute.
    sub_minute_seconds: f64,
    /// Wall-clock instant of the most recent sample.
    last_sample: DateTime<Utc>,
    /// Whether virtual time is stopped.
    paused: bool,
}

/// Virtual game clock.
#[derive(Debug)]
pub struct ClockEngine {
    /// Calendar truth.
    calendar: VirtualCalendar,

    /// Virtual minutes advanced since construction. Never wraps with the
    /// calendar; used for lottery bookkeeping.
    elapsed_minutes: u64,

    /// Real seconds per virtual minute.
    seconds_per_minute: f64,

    accumulator: Accumulator,

    lottery: Lottery,

    /// Detection memory for coarse period edges. Not calendar truth.
    period_memo: CoarsePeriod,

    bus: EventBus,

    wall: Box<dyn WallClock>,
}

impl ClockEngine {
    /// Create a clock from configuration, seeding the lottery RNG from
    /// `lottery.seed` (or the operating system when unset).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidCalendar`] if the start time is out of
    /// range, or [`ClockError::InvalidConfig`] if the time ratio or lottery
    /// parameters are unusable.
    pub fn new(
        clock: &ClockConfig,
        lottery: &LotteryConfig,
        wall: Box<dyn WallClock>,
    ) -> Result<Self, ClockError> {
        let rng: Box<dyn LotteryRng> = match lottery.seed {
            Some(seed) => Box::new(SmallRng::seed_from_u64(seed)),
            None => Box::new(SmallRng::from_os_rng()),
        };
        Self::with_rng(clock, lottery, wall, rng)
    }

    /// Create a clock with an explicit lottery draw source.
    ///
    /// # Errors
    ///
    /// Same as [`ClockEngine::new`].
    pub fn with_rng(
        clock: &ClockConfig,
        lottery: &LotteryConfig,
        wall: Box<dyn WallClock>,
        rng: Box<dyn LotteryRng>,
    ) -> Result<Self, ClockError> {
        let start = clock.start;
        let calendar = VirtualCalendar::new(start.month, start.day, start.hour, start.minute)
            .ok_or(ClockError::InvalidCalendar {
                month: start.month,
                day: start.day,
                hour: start.hour,
                minute: start.minute,
            })?;

        let seconds_per_minute = clock.real_seconds_per_minute;
        if !seconds_per_minute.is_finite() || seconds_per_minute <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!(
                    "real_seconds_per_minute must be positive and finite, got {seconds_per_minute}"
                ),
            });
        }

        let rules = LotteryRules::from_config(lottery)
            .map_err(|reason| ClockError::InvalidConfig { reason })?;

        let now = wall.now();
        let elapsed_minutes = 0;

        Ok(Self {
            calendar,
            elapsed_minutes,
            seconds_per_minute,
            accumulator: Accumulator {
                sub_minute_seconds: 0.0,
                last_sample: now,
                paused: false,
            },
            lottery: Lottery::new(rules, rng, elapsed_minutes),
            period_memo: calendar.coarse_period(),
            bus: EventBus::new(),
            wall,
        })
    }

    /// Register an observer for clock events.
    pub fn subscribe(&mut self, observer: Box<dyn ClockObserver>) {
        self.bus.subscribe(observer);
    }

    // -----------------------------------------------------------------------
    // Time flow
    // -----------------------------------------------------------------------

    /// Feed `wall_delta_seconds` of real time into the clock.
    ///
    /// Returns the number of virtual minutes advanced. While paused,
    /// nothing advances and the wall-clock sample is refreshed. Negative or
    /// non-finite deltas are ignored.
    pub fn update(&mut self, wall_delta_seconds: f64) -> u64 {
        if self.accumulator.paused {
            self.accumulator.last_sample = self.wall.now();
            return 0;
        }
        if !wall_delta_seconds.is_finite() || wall_delta_seconds < 0.0 {
            warn!(wall_delta_seconds, "Ignoring unusable frame delta");
            return 0;
        }

        self.accumulator.sub_minute_seconds += wall_delta_seconds;

        let mut advanced: u64 = 0;
        while self.accumulator.sub_minute_seconds >= self.seconds_per_minute {
            self.accumulator.sub_minute_seconds -= self.seconds_per_minute;
            self.advance(1);
            self.after_advance();
            advanced = advanced.saturating_add(1);
        }

        if advanced > 0 {
            trace!(advanced, calendar = %self.calendar, "Virtual time advanced");
        }
        advanced
    }

    /// Sample the wall clock and feed the time since the previous sample
    /// into [`update`](Self::update).
    pub fn update_from_wall_clock(&mut self) -> u64 {
        let now = self.wall.now();
        let delta = wall::seconds_between(self.accumulator.last_sample, now);
        self.accumulator.last_sample = now;
        self.update(delta)
    }

    /// Jump the calendar forward by a block of minutes (sleeping, scene
    /// cuts).
    ///
    /// Each skipped minute runs the lottery step and period check, exactly
    /// as in [`update`](Self::update), so every boundary crossed is
    /// reported in order. Works while paused. The sub-minute accumulator is
    /// left untouched.
    pub fn skip_minutes(&mut self, minutes: u32) {
        if minutes == 0 {
            return;
        }
        for _ in 0..minutes {
            self.advance(1);
            self.after_advance();
        }
        debug!(minutes, calendar = %self.calendar, "Skipped virtual time");
    }

    /// Stop virtual time. The lottery is not affected.
    pub fn pause(&mut self) {
        self.accumulator.paused = true;
        self.accumulator.last_sample = self.wall.now();
        debug!(calendar = %self.calendar, "Clock paused");
    }

    /// Restart virtual time from the current wall-clock instant.
    pub fn resume(&mut self) {
        self.accumulator.paused = false;
        self.accumulator.last_sample = self.wall.now();
        debug!(calendar = %self.calendar, "Clock resumed");
    }

    /// Disarm the lottery and close any open window, without stopping the
    /// calendar. Used by collaborators that need exclusive attention.
    pub fn suspend_lottery(&mut self) {
        let transition = self.lottery.suspend();
        debug!(calendar = %self.calendar, "Lottery suspended");
        if let Some(transition) = transition {
            self.emit_lottery(transition);
        }
    }

    /// Re-arm the lottery after [`suspend_lottery`](Self::suspend_lottery).
    pub fn resume_lottery(&mut self) {
        self.lottery.resume(self.elapsed_minutes);
        debug!(calendar = %self.calendar, "Lottery resumed");
    }

    /// Replace the calendar with a restored save and re-derive every piece
    /// of ephemeral state: the accumulator is emptied and unpaused, the
    /// lottery re-arms, and the period memo snaps to the restored period
    /// without emitting a transition.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidCalendar`] if the restored calendar is
    /// out of range. The clock is unchanged in that case.
    pub fn restore(&mut self, calendar: VirtualCalendar) -> Result<(), ClockError> {
        if !calendar.is_valid() {
            return Err(ClockError::InvalidCalendar {
                month: calendar.month(),
                day: calendar.day(),
                hour: calendar.hour(),
                minute: calendar.minute(),
            });
        }

        self.calendar = calendar;
        self.accumulator = Accumulator {
            sub_minute_seconds: 0.0,
            last_sample: self.wall.now(),
            paused: false,
        };
        self.period_memo = calendar.coarse_period();
        info!(calendar = %self.calendar, "Clock restored");

        if let Some(transition) = self.lottery.reset(self.elapsed_minutes) {
            self.emit_lottery(transition);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Copy of the calendar (the persisted state shape).
    pub const fn calendar(&self) -> VirtualCalendar {
        self.calendar
    }

    /// Date label, e.g. `Month 2, Day 14`.
    pub fn date_string(&self) -> String {
        self.calendar.date_label()
    }

    /// Time label, e.g. `06:03`.
    pub fn time_string(&self) -> String {
        self.calendar.time_label()
    }

    /// `day * 1440 + hour * 60 + minute`. Comparable within a month only.
    pub const fn total_minutes(&self) -> u64 {
        self.calendar.total_minutes()
    }

    /// Virtual minutes advanced since construction.
    pub const fn elapsed_minutes(&self) -> u64 {
        self.elapsed_minutes
    }

    /// Coarse period for the current hour.
    pub const fn coarse_period(&self) -> CoarsePeriod {
        self.calendar.coarse_period()
    }

    /// Fine time-of-day bucket for the current hour.
    pub const fn fine_time_of_day(&self) -> FineTimeOfDay {
        self.calendar.fine_time_of_day()
    }

    /// Fraction of the current coarse period that has elapsed, in 0-1.
    ///
    /// Night spans midnight: 02:00 is 4 of Night's 8 hours, so 0.5.
    pub fn period_progress(&self) -> f64 {
        let period = self.coarse_period();
        let into = f64::from(period.minutes_into(self.calendar.minute_of_day()));
        let length = f64::from(period.duration_minutes().max(1));
        (into / length).clamp(0.0, 1.0)
    }

    /// Whether a lottery window is open.
    pub const fn is_lottery_window_active(&self) -> bool {
        self.lottery.is_active()
    }

    /// Virtual minutes left in the open lottery window.
    pub fn lottery_window_remaining(&self) -> Option<u64> {
        self.lottery.remaining_minutes(self.elapsed_minutes)
    }

    /// Whether a collaborator has suspended the lottery.
    pub const fn is_lottery_suspended(&self) -> bool {
        self.lottery.is_suspended()
    }

    /// Total lottery trials performed.
    pub const fn lottery_trials(&self) -> u64 {
        self.lottery.trials()
    }

    /// Whether virtual time is stopped.
    pub const fn is_paused(&self) -> bool {
        self.accumulator.paused
    }

    /// Real seconds accrued toward the next virtual minute.
    pub const fn pending_seconds(&self) -> f64 {
        self.accumulator.sub_minute_seconds
    }

    /// Wall-clock instant of the most recent sample.
    pub const fn last_wall_clock_sample(&self) -> DateTime<Utc> {
        self.accumulator.last_sample
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Move the calendar and the minute counter. No events.
    fn advance(&mut self, minutes: u32) {
        self.calendar.advance(minutes);
        self.elapsed_minutes = self.elapsed_minutes.saturating_add(u64::from(minutes));
    }

    /// Lottery step, then period check.
    fn after_advance(&mut self) {
        if let Some(transition) = self.lottery.step(self.elapsed_minutes) {
            self.emit_lottery(transition);
        }
        self.check_period();
    }

    fn check_period(&mut self) {
        let next = self.calendar.coarse_period();
        let previous = self.period_memo;
        if next == previous {
            return;
        }
        self.period_memo = next;

        info!(?previous, ?next, calendar = %self.calendar, "Period changed");
        self.bus.publish(&ClockEvent::PeriodChanged { previous, next });

        if is_attrition_boundary(previous, next) {
            debug!(?previous, ?next, "Attrition boundary crossed");
            self.bus.publish(&ClockEvent::AttritionBoundaryCrossed);
        }
    }

    fn emit_lottery(&mut self, transition: LotteryTransition) {
        let active = match transition {
            LotteryTransition::Opened { duration_minutes } => {
                info!(duration_minutes, calendar = %self.calendar, "Lottery window opened");
                true
            }
            LotteryTransition::Closed => {
                info!(calendar = %self.calendar, "Lottery window closed");
                false
            }
        };
        self.bus.publish(&ClockEvent::LotteryWindowChanged { active });
    }
}

/// Morning -> Day and Evening -> Night are the boundaries the stats
/// collaborator charges attrition on.
pub const fn is_attrition_boundary(previous: CoarsePeriod, next: CoarsePeriod) -> bool {
    matches!(
        (previous, next),
        (CoarsePeriod::Morning, CoarsePeriod::Day) | (CoarsePeriod::Evening, CoarsePeriod::Night)
    )
}
