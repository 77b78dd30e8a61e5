//! Enumeration types for the Dayglass clock.
//!
//! Both enums here are derived from the calendar hour and never stored as
//! calendar truth. [`CoarsePeriod`] drives gameplay notifications;
//! [`FineTimeOfDay`] drives only the ambient background color. They change
//! at different hour boundaries and are tracked independently.

use serde::{Deserialize, Serialize};

use crate::structs::MINUTES_PER_DAY;

// ---------------------------------------------------------------------------
// Coarse Periods
// ---------------------------------------------------------------------------

/// One of the four coarse periods of the in-game day.
///
/// | period  | hours         |
/// |---------|---------------|
/// | Morning | 06:00 - 11:59 |
/// | Day     | 12:00 - 17:59 |
/// | Evening | 18:00 - 21:59 |
/// | Night   | 22:00 - 05:59 |
///
/// Night is the only period that spans midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoarsePeriod {
    /// Start of the working day.
    Morning,
    /// Midday and afternoon.
    Day,
    /// Early evening until bedtime.
    Evening,
    /// Late night through the small hours.
    Night,
}

impl CoarsePeriod {
    /// All periods in the order they occur, starting from Morning.
    pub const ALL: [Self; 4] = [Self::Morning, Self::Day, Self::Evening, Self::Night];

    /// Map a calendar hour (0-23) to its coarse period.
    ///
    /// Hours outside 0-23 fall through to [`CoarsePeriod::Night`].
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Day,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// First hour belonging to this period.
    pub const fn start_hour(self) -> u32 {
        match self {
            Self::Morning => 6,
            Self::Day => 12,
            Self::Evening => 18,
            Self::Night => 22,
        }
    }

    /// First hour belonging to the *next* period.
    pub const fn end_hour(self) -> u32 {
        self.next().start_hour()
    }

    /// The period that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Morning => Self::Day,
            Self::Day => Self::Evening,
            Self::Evening => Self::Night,
            Self::Night => Self::Morning,
        }
    }

    /// Length of the period in minutes, accounting for the midnight wrap.
    pub const fn duration_minutes(self) -> u32 {
        let start = self.start_hour().saturating_mul(60);
        let end = self.end_hour().saturating_mul(60);
        if end > start {
            end.saturating_sub(start)
        } else {
            MINUTES_PER_DAY.saturating_sub(start).saturating_add(end)
        }
    }

    /// Minutes elapsed since this period started, given a minute-of-day
    /// value (0-1439).
    ///
    /// For [`CoarsePeriod::Night`], minutes after midnight are measured from
    /// 22:00 of the previous day.
    pub const fn minutes_into(self, minute_of_day: u32) -> u32 {
        let start = self.start_hour().saturating_mul(60);
        if minute_of_day >= start {
            minute_of_day.saturating_sub(start)
        } else {
            MINUTES_PER_DAY
                .saturating_sub(start)
                .saturating_add(minute_of_day)
        }
    }
}

// ---------------------------------------------------------------------------
// Fine Time of Day
// ---------------------------------------------------------------------------

/// Six-bucket time of day used for background color.
///
/// | bucket    | hours         |
/// |-----------|---------------|
/// | Dawn      | 05:00 - 06:59 |
/// | Morning   | 07:00 - 10:59 |
/// | Noon      | 11:00 - 14:59 |
/// | Afternoon | 15:00 - 17:59 |
/// | Dusk      | 18:00 - 19:59 |
/// | Night     | 20:00 - 04:59 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FineTimeOfDay {
    /// Sunrise.
    Dawn,
    /// Bright morning light.
    Morning,
    /// Sun at its highest.
    Noon,
    /// Afternoon light.
    Afternoon,
    /// Sunset.
    Dusk,
    /// Darkness.
    Night,
}

impl FineTimeOfDay {
    /// All buckets in the order they occur, starting from Dawn.
    pub const ALL: [Self; 6] = [
        Self::Dawn,
        Self::Morning,
        Self::Noon,
        Self::Afternoon,
        Self::Dusk,
        Self::Night,
    ];

    /// Map a calendar hour (0-23) to its fine bucket.
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=6 => Self::Dawn,
            7..=10 => Self::Morning,
            11..=14 => Self::Noon,
            15..=17 => Self::Afternoon,
            18..=19 => Self::Dusk,
            _ => Self::Night,
        }
    }
}
