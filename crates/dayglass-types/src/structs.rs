//! Core value structs: the virtual calendar and RGB colors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::{CoarsePeriod, FineTimeOfDay};

/// Minutes in one in-game hour.
pub const MINUTES_PER_HOUR: u32 = 60;

/// Hours in one in-game day.
pub const HOURS_PER_DAY: u32 = 24;

/// Minutes in one in-game day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Days in every in-game month. The calendar is simplified: all months
/// have the same length.
pub const DAYS_PER_MONTH: u32 = 30;

/// Months in one in-game year.
pub const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Virtual Calendar
// ---------------------------------------------------------------------------

/// The in-game calendar position.
///
/// Month is 1-12, day is 1-30, hour is 0-23, minute is 0-59. These ranges
/// hold after every [`advance`](Self::advance). This is also the complete
/// persisted shape of the clock: everything else is re-derived on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualCalendar {
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

impl VirtualCalendar {
    /// Build a calendar position, returning `None` if any field is out of
    /// range.
    pub const fn new(month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        let calendar = Self {
            month,
            day,
            hour,
            minute,
        };
        if calendar.is_valid() {
            Some(calendar)
        } else {
            None
        }
    }

    /// Whether every field is within its range. Deserialized calendars
    /// should be checked with this before use.
    pub const fn is_valid(&self) -> bool {
        self.month >= 1
            && self.month <= MONTHS_PER_YEAR
            && self.day >= 1
            && self.day <= DAYS_PER_MONTH
            && self.hour < HOURS_PER_DAY
            && self.minute < MINUTES_PER_HOUR
    }

    /// Month of the year (1-12).
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Day of the month (1-30).
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Hour of the day (0-23).
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    /// Minute of the hour (0-59).
    pub const fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes since midnight (0-1439).
    pub const fn minute_of_day(&self) -> u32 {
        self.hour
            .saturating_mul(MINUTES_PER_HOUR)
            .saturating_add(self.minute)
    }

    /// `day * 1440 + hour * 60 + minute`.
    ///
    /// A comparable scalar for bookkeeping within a month. It is not an
    /// absolute timestamp: it drops back when the day wraps.
    pub const fn total_minutes(&self) -> u64 {
        let day_minutes = (self.day as u64).saturating_mul(MINUTES_PER_DAY as u64);
        day_minutes.saturating_add(self.minute_of_day() as u64)
    }

    /// Coarse period for the current hour.
    pub const fn coarse_period(&self) -> CoarsePeriod {
        CoarsePeriod::from_hour(self.hour)
    }

    /// Fine time-of-day bucket for the current hour.
    pub const fn fine_time_of_day(&self) -> FineTimeOfDay {
        FineTimeOfDay::from_hour(self.hour)
    }

    /// Advance by `minutes`, cascading minute -> hour -> day -> month and
    /// wrapping month 12 back to month 1.
    pub fn advance(&mut self, minutes: u32) {
        let minutes_total = u64::from(self.minute).saturating_add(u64::from(minutes));
        let minute_per_hour = u64::from(MINUTES_PER_HOUR);
        self.minute = narrow(minutes_total % minute_per_hour);

        let hours_total =
            u64::from(self.hour).saturating_add(minutes_total / minute_per_hour);
        let hours_per_day = u64::from(HOURS_PER_DAY);
        self.hour = narrow(hours_total % hours_per_day);

        // Days and months are 1-based; shift to 0-based for the cascade.
        let days_total = u64::from(self.day.saturating_sub(1))
            .saturating_add(hours_total / hours_per_day);
        let days_per_month = u64::from(DAYS_PER_MONTH);
        self.day = narrow(days_total % days_per_month).saturating_add(1);

        let months_total = u64::from(self.month.saturating_sub(1))
            .saturating_add(days_total / days_per_month);
        self.month = narrow(months_total % u64::from(MONTHS_PER_YEAR)).saturating_add(1);
    }

    /// Date label, e.g. `Month 2, Day 14`.
    pub fn date_label(&self) -> String {
        format!("Month {}, Day {}", self.month, self.day)
    }

    /// Zero-padded 24-hour time label, e.g. `06:03`.
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl fmt::Display for VirtualCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M{:02} D{:02} {:02}:{:02}",
            self.month, self.day, self.hour, self.minute
        )
    }
}

/// Narrow a value already reduced modulo a small constant.
fn narrow(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// An RGB color with float channels in the 0-255 range.
///
/// Float channels let interpolation accumulate sub-unit steps; the
/// presentation layer only ever sees the rounded [`packed`](Self::packed)
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel (0-255).
    pub r: f32,
    /// Green channel (0-255).
    pub g: f32,
    /// Blue channel (0-255).
    pub b: f32,
}

impl Rgb {
    /// Build a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r),
            g: f32::from(g),
            b: f32::from(b),
        }
    }

    /// Linear blend from `self` toward `target`; `t` is clamped to 0-1.
    pub fn lerp(self, target: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (target.r - self.r) * t,
            g: self.g + (target.g - self.g) * t,
            b: self.b + (target.b - self.b) * t,
        }
    }

    /// Round each channel and pack as `0xRRGGBB`.
    pub fn packed(self) -> u32 {
        (channel_u8(self.r) << 16) | (channel_u8(self.g) << 8) | channel_u8(self.b)
    }
}

/// Round and clamp one float channel into 0-255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_u8(value: f32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    // Clamped to 0..=255 before the cast, so truncation cannot occur.
    u32::from(value.round().clamp(0.0, 255.0) as u8)
}
