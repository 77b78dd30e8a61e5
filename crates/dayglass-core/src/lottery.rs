//! The per-minute lottery and its activity window.
//!
//! While armed, the lottery draws one roll per virtual minute. A winning
//! roll opens a window of random length; while the window is open no
//! further trials happen. The window closes on expiry or when an outside
//! collaborator suspends the lottery.
//!
//! All bookkeeping uses the clock's monotonic minute counter rather than
//! the calendar, so windows and trial spacing survive day and month wrap.

use std::fmt;

use rand::Rng;

use crate::config::LotteryConfig;

/// Source of uniform integer draws for the lottery.
///
/// Any [`rand::Rng`] qualifies. Tests can supply scripted draws.
pub trait LotteryRng: fmt::Debug {
    /// Uniform integer in `low..=high`. Callers guarantee `low <= high`.
    fn draw(&mut self, low: u32, high: u32) -> u32;
}

impl<R: Rng + fmt::Debug> LotteryRng for R {
    fn draw(&mut self, low: u32, high: u32) -> u32 {
        self.random_range(low..=high)
    }
}

/// A state change produced by [`Lottery::step`] or [`Lottery::suspend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotteryTransition {
    /// A window opened and will last `duration_minutes`.
    Opened {
        /// Window length in virtual minutes.
        duration_minutes: u32,
    },
    /// The open window closed.
    Closed,
}

/// Validated lottery parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotteryRules {
    /// Roll upper bound (rolls are `1..=trial_range_max`).
    pub trial_range_max: u32,
    /// Roll that opens a window.
    pub winning_roll: u32,
    /// Shortest window.
    pub window_min_minutes: u32,
    /// Longest window.
    pub window_max_minutes: u32,
}

impl LotteryRules {
    /// Validate a [`LotteryConfig`].
    ///
    /// Returns a description of the first problem found.
    pub fn from_config(config: &LotteryConfig) -> Result<Self, String> {
        if config.trial_range_max == 0 {
            return Err("lottery.trial_range_max must be at least 1".to_owned());
        }
        if config.winning_roll == 0 || config.winning_roll > config.trial_range_max {
            return Err(format!(
                "lottery.winning_roll {} is outside 1..={}",
                config.winning_roll, config.trial_range_max
            ));
        }
        if config.window_min_minutes == 0 {
            return Err("lottery.window_min_minutes must be at least 1".to_owned());
        }
        if config.window_min_minutes > config.window_max_minutes {
            return Err(format!(
                "lottery.window_min_minutes {} exceeds window_max_minutes {}",
                config.window_min_minutes, config.window_max_minutes
            ));
        }
        Ok(Self {
            trial_range_max: config.trial_range_max,
            winning_roll: config.winning_roll,
            window_min_minutes: config.window_min_minutes,
            window_max_minutes: config.window_max_minutes,
        })
    }
}

/// Lottery state.
///
/// `active` and `armed` are never both true. `suspended` is held
/// separately from `armed` so that nothing but
/// [`resume`](Self::resume) can re-arm a suspended lottery.
#[derive(Debug)]
pub struct Lottery {
    rules: LotteryRules,
    rng: Box<dyn LotteryRng>,
    active: bool,
    window_end_minute: Option<u64>,
    armed: bool,
    suspended: bool,
    last_trial_minute: u64,
    trials: u64,
}

impl Lottery {
    /// Create an armed lottery with no window. The first trial happens on
    /// the first minute after `now_minute`.
    pub fn new(rules: LotteryRules, rng: Box<dyn LotteryRng>, now_minute: u64) -> Self {
        Self {
            rules,
            rng,
            active: false,
            window_end_minute: None,
            armed: true,
            suspended: false,
            last_trial_minute: now_minute,
            trials: 0,
        }
    }

    /// Run the lottery for the virtual minute `now_minute`.
    ///
    /// Closes an expired window, or performs at most one trial if armed
    /// and a new minute has ticked since the last trial.
    pub fn step(&mut self, now_minute: u64) -> Option<LotteryTransition> {
        if self.active {
            let expired = self.window_end_minute.is_none_or(|end| now_minute >= end);
            if expired {
                self.close_window();
                self.armed = !self.suspended;
                return Some(LotteryTransition::Closed);
            }
            return None;
        }

        if !self.armed || now_minute <= self.last_trial_minute {
            return None;
        }

        self.last_trial_minute = now_minute;
        self.trials = self.trials.saturating_add(1);

        let roll = self.rng.draw(1, self.rules.trial_range_max);
        if roll != self.rules.winning_roll {
            return None;
        }

        let duration_minutes = self
            .rng
            .draw(self.rules.window_min_minutes, self.rules.window_max_minutes);
        self.active = true;
        self.armed = false;
        self.window_end_minute = Some(now_minute.saturating_add(u64::from(duration_minutes)));
        Some(LotteryTransition::Opened { duration_minutes })
    }

    /// Disarm the lottery and force-close any open window.
    ///
    /// Returns [`LotteryTransition::Closed`] if a window was open.
    pub fn suspend(&mut self) -> Option<LotteryTransition> {
        self.suspended = true;
        self.armed = false;
        if self.active {
            self.close_window();
            return Some(LotteryTransition::Closed);
        }
        None
    }

    /// Re-arm after [`suspend`](Self::suspend).
    ///
    /// Trial bookkeeping restarts at `now_minute`, so the first trial comes
    /// on the next minute rather than as a catch-up for the suspension.
    pub fn resume(&mut self, now_minute: u64) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        self.armed = !self.active;
        self.last_trial_minute = now_minute;
    }

    /// Drop all ephemeral state and re-arm, as after loading a save.
    ///
    /// Returns [`LotteryTransition::Closed`] if a window was open.
    pub fn reset(&mut self, now_minute: u64) -> Option<LotteryTransition> {
        let was_active = self.active;
        self.close_window();
        self.armed = true;
        self.suspended = false;
        self.last_trial_minute = now_minute;
        was_active.then_some(LotteryTransition::Closed)
    }

    /// Whether a window is open.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a trial may happen on the next new minute.
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether an outside collaborator has suspended the lottery.
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Minutes left in the open window, if any.
    pub fn remaining_minutes(&self, now_minute: u64) -> Option<u64> {
        if !self.active {
            return None;
        }
        self.window_end_minute.map(|end| end.saturating_sub(now_minute))
    }

    /// Minute counter value of the most recent trial.
    pub const fn last_trial_minute(&self) -> u64 {
        self.last_trial_minute
    }

    /// Total trials performed.
    pub const fn trials(&self) -> u64 {
        self.trials
    }

    const fn close_window(&mut self) {
        self.active = false;
        self.window_end_minute = None;
    }
}
