//! The ambient color driver.
//!
//! Polls the clock's fine time-of-day once per frame and, when the bucket
//! changes, blends the displayed color toward the bucket's palette entry.
//! The blend is stepped by [`AmbientColorDriver::tick`], never by the
//! clock.

use std::fmt;

use dayglass_core::clock::ClockEngine;
use dayglass_core::config::AmbientConfig;
use dayglass_types::{FineTimeOfDay, Rgb};
use tracing::{debug, warn};

use crate::interpolation::Interpolation;
use crate::palette::Palette;

/// Receives the displayed color as packed `0xRRGGBB`.
pub trait ColorSink {
    /// Present a color.
    fn apply(&mut self, packed: u32);
}

impl<F: FnMut(u32)> ColorSink for F {
    fn apply(&mut self, packed: u32) {
        self(packed);
    }
}

/// Drives the background color from the clock's fine time-of-day.
pub struct AmbientColorDriver {
    palette: Palette,
    transition_seconds: f32,
    current: Rgb,
    interpolation: Interpolation,
    fine_memo: FineTimeOfDay,
    sink: Box<dyn ColorSink>,
}

impl AmbientColorDriver {
    /// Create a driver with the palette from `config`, snapping to the
    /// clock's current bucket and pushing that color once.
    pub fn new(clock: &ClockEngine, config: &AmbientConfig, sink: Box<dyn ColorSink>) -> Self {
        Self::with_palette(
            clock,
            Palette::from_config(config),
            config.transition_seconds,
            sink,
        )
    }

    /// Create a driver with an explicit palette.
    pub fn with_palette(
        clock: &ClockEngine,
        palette: Palette,
        transition_seconds: f32,
        sink: Box<dyn ColorSink>,
    ) -> Self {
        let transition_seconds = if transition_seconds.is_finite() && transition_seconds >= 0.0 {
            transition_seconds
        } else {
            warn!(transition_seconds, "invalid transition duration, colors will snap");
            0.0
        };

        let fine = clock.fine_time_of_day();
        let mut driver = Self {
            current: palette.color_for(fine),
            palette,
            transition_seconds,
            interpolation: Interpolation::Idle,
            fine_memo: fine,
            sink,
        };
        driver.push();
        driver
    }

    /// Check the clock for a bucket change. Call once per frame after the
    /// clock has been updated.
    ///
    /// Returns `true` if a new blend was started.
    pub fn update(&mut self, clock: &ClockEngine) -> bool {
        self.observe(clock.fine_time_of_day())
    }

    /// React to the given bucket. A change cancels any blend in flight and
    /// starts a new one from the color currently displayed.
    pub fn observe(&mut self, fine: FineTimeOfDay) -> bool {
        if fine == self.fine_memo {
            return false;
        }

        let previous = self.fine_memo;
        self.fine_memo = fine;
        let target = self.palette.color_for(fine);

        if self.interpolation.is_running() {
            debug!(?previous, "cancelling color blend in flight");
        }
        self.interpolation.cancel();
        self.interpolation
            .start(self.current, target, self.transition_seconds);

        debug!(
            ?previous,
            next = ?fine,
            target = %format!("#{:06x}", target.packed()),
            seconds = self.transition_seconds,
            "color blend started"
        );
        true
    }

    /// Step the blend by `dt` real seconds and push the displayed color.
    pub fn tick(&mut self, dt: f32) {
        if let Some(color) = self.interpolation.tick(dt) {
            self.current = color;
        }
        self.push();
    }

    /// Snap to the clock's bucket without blending, as after a restore.
    pub fn resync(&mut self, clock: &ClockEngine) {
        self.interpolation.cancel();
        self.fine_memo = clock.fine_time_of_day();
        self.current = self.palette.color_for(self.fine_memo);
        debug!(fine = ?self.fine_memo, "ambient color resynced");
        self.push();
    }

    /// The color currently displayed.
    pub const fn current(&self) -> Rgb {
        self.current
    }

    /// The bucket the driver last reacted to.
    pub const fn fine_time_of_day(&self) -> FineTimeOfDay {
        self.fine_memo
    }

    /// Whether a blend is in flight.
    pub const fn is_interpolating(&self) -> bool {
        self.interpolation.is_running()
    }

    fn push(&mut self) {
        self.sink.apply(self.current.packed());
    }
}

impl fmt::Debug for AmbientColorDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientColorDriver")
            .field("current", &self.current)
            .field("fine_memo", &self.fine_memo)
            .field("interpolation", &self.interpolation)
            .field("transition_seconds", &self.transition_seconds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dayglass_core::config::{ClockConfig, LotteryConfig, StartTime};
    use dayglass_core::wall::ManualWallClock;

    use super::*;

    fn clock_at(hour: u32, minute: u32) -> ClockEngine {
        let clock = ClockConfig {
            start: StartTime {
                month: 1,
                day: 1,
                hour,
                minute,
            },
            ..ClockConfig::default()
        };
        let lottery = LotteryConfig {
            seed: Some(7),
            ..LotteryConfig::default()
        };
        ClockEngine::new(&clock, &lottery, Box::new(ManualWallClock::at_epoch())).unwrap()
    }

    fn recording_sink() -> (Rc<RefCell<Vec<u32>>>, Box<dyn ColorSink>) {
        let pushed = Rc::new(RefCell::new(Vec::new()));
        let handle = Rc::clone(&pushed);
        let sink: Box<dyn ColorSink> =
            Box::new(move |packed: u32| handle.borrow_mut().push(packed));
        (pushed, sink)
    }

    fn config(seconds: f32) -> AmbientConfig {
        AmbientConfig {
            transition_seconds: seconds,
            ..AmbientConfig::default()
        }
    }

    #[test]
    fn construction_snaps_and_pushes_once() {
        let clock = clock_at(12, 0);
        let (pushed, sink) = recording_sink();
        let driver = AmbientColorDriver::new(&clock, &config(3.0), sink);

        let noon = Palette::standard().color_for(FineTimeOfDay::Noon);
        assert_eq!(driver.current(), noon);
        assert!(!driver.is_interpolating());
        assert_eq!(*pushed.borrow(), vec![noon.packed()]);
    }

    #[test]
    fn same_bucket_does_not_start_blend() {
        let mut clock = clock_at(12, 0);
        let (_, sink) = recording_sink();
        let mut driver = AmbientColorDriver::new(&clock, &config(3.0), sink);
        clock.skip_minutes(30);
        assert!(!driver.update(&clock));
        assert!(!driver.is_interpolating());
    }

    #[test]
    fn bucket_change_blends_to_target() {
        let mut clock = clock_at(17, 59);
        let (pushed, sink) = recording_sink();
        let mut driver = AmbientColorDriver::new(&clock, &config(1.0), sink);

        clock.skip_minutes(1);
        assert!(driver.update(&clock));
        assert!(driver.is_interpolating());

        for _ in 0..10 {
            driver.tick(0.25);
        }
        let dusk = Palette::standard().color_for(FineTimeOfDay::Dusk);
        assert_eq!(driver.current(), dusk);
        assert!(!driver.is_interpolating());
        // Initial push plus one per tick.
        assert_eq!(pushed.borrow().len(), 11);
        assert_eq!(pushed.borrow().last().copied(), Some(dusk.packed()));
    }

    #[test]
    fn restart_cancels_prior_blend_and_lands_on_second_target() {
        let clock = clock_at(12, 0);
        let (_, sink) = recording_sink();
        let mut driver = AmbientColorDriver::new(&clock, &config(2.0), sink);
        let palette = Palette::standard();

        assert!(driver.observe(FineTimeOfDay::Dusk));
        driver.tick(0.5);
        let mid = driver.current();
        assert_ne!(mid, palette.color_for(FineTimeOfDay::Noon));
        assert_ne!(mid, palette.color_for(FineTimeOfDay::Dusk));

        assert!(driver.observe(FineTimeOfDay::Night));
        // The new blend starts from the partially blended color.
        driver.tick(0.0);
        assert_eq!(driver.current(), mid);

        for _ in 0..20 {
            driver.tick(0.25);
        }
        assert_eq!(driver.current(), palette.color_for(FineTimeOfDay::Night));
        assert!(!driver.is_interpolating());
    }

    #[test]
    fn resync_snaps_without_blending() {
        let mut clock = clock_at(12, 0);
        let (pushed, sink) = recording_sink();
        let mut driver = AmbientColorDriver::new(&clock, &config(3.0), sink);
        driver.observe(FineTimeOfDay::Dusk);

        clock.skip_minutes(10 * 60);
        driver.resync(&clock);
        assert!(!driver.is_interpolating());
        assert_eq!(driver.fine_time_of_day(), FineTimeOfDay::Night);
        let night = Palette::standard().color_for(FineTimeOfDay::Night);
        assert_eq!(driver.current(), night);
        assert_eq!(pushed.borrow().last().copied(), Some(night.packed()));
    }

    #[test]
    fn empty_palette_falls_back_to_night() {
        let clock = clock_at(8, 0);
        let (_, sink) = recording_sink();
        let mut driver = AmbientColorDriver::with_palette(&clock, Palette::empty(), 0.0, sink);
        assert_eq!(driver.current().packed(), 0x0014_183C);

        driver.observe(FineTimeOfDay::Noon);
        driver.tick(0.0);
        assert_eq!(driver.current().packed(), 0x0014_183C);
    }

    #[test]
    fn invalid_duration_snaps_on_first_tick() {
        let clock = clock_at(12, 0);
        let (_, sink) = recording_sink();
        let mut driver = AmbientColorDriver::new(&clock, &config(f32::NAN), sink);
        driver.observe(FineTimeOfDay::Dusk);
        driver.tick(0.01);
        assert_eq!(
            driver.current(),
            Palette::standard().color_for(FineTimeOfDay::Dusk)
        );
    }
}
