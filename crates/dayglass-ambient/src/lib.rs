//! Ambient background color for the Dayglass clock.
//!
//! [`AmbientColorDriver`] watches the clock's fine time-of-day and eases the
//! displayed color toward the matching [`Palette`] entry whenever the bucket
//! changes. The host steps blends with [`AmbientColorDriver::tick`] and
//! receives colors through a [`ColorSink`].
//!
//! # Modules
//!
//! - [`driver`] -- The driver and the color sink trait
//! - [`interpolation`] -- The blend state machine
//! - [`palette`] -- Color table and easing curve

pub mod driver;
pub mod interpolation;
pub mod palette;

pub use driver::{AmbientColorDriver, ColorSink};
pub use interpolation::Interpolation;
pub use palette::{Palette, ease_out};
