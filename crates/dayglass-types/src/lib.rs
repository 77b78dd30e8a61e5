//! Shared type definitions for the Dayglass game clock.
//!
//! # Modules
//!
//! - [`enums`] -- Coarse periods and fine time-of-day buckets
//! - [`structs`] -- The virtual calendar and RGB colors

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CoarsePeriod, FineTimeOfDay};
pub use structs::{
    DAYS_PER_MONTH, HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR, MONTHS_PER_YEAR, Rgb,
    VirtualCalendar,
};
