//! Virtual game clock and time-driven event scheduler for Dayglass.
//!
//! This crate owns the accelerated in-game calendar, the pause-safe
//! conversion from wall-clock time, the per-minute lottery that opens timed
//! activity windows, and coarse period transition events.
//!
//! # Modules
//!
//! - [`clock`] -- [`ClockEngine`]: calendar, accumulator, pause/resume,
//!   period transitions, and event emission.
//! - [`config`] -- Configuration loading from `dayglass-config.yaml` into
//!   strongly-typed structs.
//! - [`lottery`] -- Per-minute trials and the activity window.
//! - [`wall`] -- Wall-clock sources (system and manual).
//!
//! [`ClockEngine`]: clock::ClockEngine

pub mod clock;
pub mod config;
pub mod lottery;
pub mod wall;
