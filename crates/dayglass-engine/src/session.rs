//! One play session: the clock and the ambient driver, stepped together.
//!
//! The session owns the [`ClockEngine`] and lends it by reference to the
//! [`AmbientColorDriver`] each frame. Collaborators that need to pause the
//! clock or suspend the lottery reach it through [`Session::clock_mut`].

use dayglass_ambient::{AmbientColorDriver, ColorSink};
use dayglass_core::clock::ClockEngine;
use dayglass_core::config::{AmbientConfig, DayglassConfig};
use dayglass_core::wall::{self, WallClock};
use dayglass_events::ClockObserver;
use dayglass_types::VirtualCalendar;
use tracing::info;

use crate::error::EngineError;

/// The clock plus everything that follows it.
#[derive(Debug)]
pub struct Session {
    clock: ClockEngine,
    ambient: AmbientColorDriver,
}

impl Session {
    /// Build a session from configuration.
    pub fn new(
        config: &DayglassConfig,
        wall: Box<dyn WallClock>,
        sink: Box<dyn ColorSink>,
    ) -> Result<Self, EngineError> {
        let clock = ClockEngine::new(&config.clock, &config.lottery, wall)?;
        Ok(Self::with_clock(clock, &config.ambient, sink))
    }

    /// Build a session around an already constructed clock.
    pub fn with_clock(
        clock: ClockEngine,
        ambient: &AmbientConfig,
        sink: Box<dyn ColorSink>,
    ) -> Self {
        let ambient = AmbientColorDriver::new(&clock, ambient, sink);
        info!(
            calendar = %clock.calendar(),
            period = ?clock.coarse_period(),
            fine = ?clock.fine_time_of_day(),
            "Session started"
        );
        Self { clock, ambient }
    }

    /// Register an observer for clock events.
    pub fn subscribe(&mut self, observer: Box<dyn ClockObserver>) {
        self.clock.subscribe(observer);
    }

    /// Run one frame with an explicit real-time delta in seconds.
    ///
    /// The clock is updated first, then the driver checks for a bucket
    /// change, then the color blend is stepped. Returns the virtual minutes
    /// advanced.
    pub fn frame(&mut self, dt_seconds: f64) -> u64 {
        let advanced = self.clock.update(dt_seconds);
        self.ambient.update(&self.clock);
        self.ambient.tick(seconds_f32(dt_seconds));
        advanced
    }

    /// Run one frame timed by the clock's wall-clock source.
    pub fn frame_from_wall_clock(&mut self) -> u64 {
        let before = self.clock.last_wall_clock_sample();
        let advanced = self.clock.update_from_wall_clock();
        let dt = wall::seconds_between(before, self.clock.last_wall_clock_sample());
        self.ambient.update(&self.clock);
        self.ambient.tick(seconds_f32(dt));
        advanced
    }

    /// The clock.
    pub const fn clock(&self) -> &ClockEngine {
        &self.clock
    }

    /// Mutable access for pause, resume, lottery suspension, and skips.
    pub const fn clock_mut(&mut self) -> &mut ClockEngine {
        &mut self.clock
    }

    /// The ambient color driver.
    pub const fn ambient(&self) -> &AmbientColorDriver {
        &self.ambient
    }

    /// The persisted state: the calendar only.
    pub const fn save(&self) -> VirtualCalendar {
        self.clock.calendar()
    }

    /// The persisted state as JSON.
    pub fn save_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(&self.save())?)
    }

    /// Restore a saved calendar. Ephemeral state is re-derived: the
    /// lottery re-arms and the color snaps without blending.
    pub fn restore(&mut self, calendar: VirtualCalendar) -> Result<(), EngineError> {
        self.clock.restore(calendar)?;
        self.ambient.resync(&self.clock);
        Ok(())
    }

    /// Restore from the JSON produced by [`save_json`](Self::save_json).
    pub fn restore_json(&mut self, json: &str) -> Result<(), EngineError> {
        let calendar: VirtualCalendar = serde_json::from_str(json)?;
        self.restore(calendar)
    }
}

/// Frame deltas are small; f32 precision is plenty for color blending.
#[allow(clippy::cast_possible_truncation)]
const fn seconds_f32(seconds: f64) -> f32 {
    seconds as f32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dayglass_ambient::Palette;
    use dayglass_core::wall::ManualWallClock;
    use dayglass_types::FineTimeOfDay;

    use super::*;

    fn config_at(hour: u32, minute: u32) -> DayglassConfig {
        let mut config = DayglassConfig::default();
        config.clock.start.hour = hour;
        config.clock.start.minute = minute;
        config.lottery.seed = Some(11);
        config.ambient.transition_seconds = 2.0;
        config
    }

    fn session_at(hour: u32, minute: u32) -> (Session, ManualWallClock, Rc<RefCell<Vec<u32>>>) {
        let wall = ManualWallClock::at_epoch();
        let pushed = Rc::new(RefCell::new(Vec::new()));
        let handle = Rc::clone(&pushed);
        let sink: Box<dyn ColorSink> =
            Box::new(move |packed: u32| handle.borrow_mut().push(packed));
        let session = Session::new(&config_at(hour, minute), Box::new(wall.clone()), sink).unwrap();
        (session, wall, pushed)
    }

    #[test]
    fn invalid_start_is_rejected() {
        let mut config = DayglassConfig::default();
        config.clock.start.month = 13;
        let result = Session::new(
            &config,
            Box::new(ManualWallClock::at_epoch()),
            Box::new(|_packed: u32| {}),
        );
        assert!(matches!(result, Err(EngineError::Clock { .. })));
    }

    #[test]
    fn frame_advances_clock_and_pushes_color() {
        let (mut session, _wall, pushed) = session_at(6, 0);
        assert_eq!(session.frame(2.5), 2);
        assert_eq!(session.clock().time_string(), "06:02");
        // One push at construction, one per frame.
        assert_eq!(pushed.borrow().len(), 2);
    }

    #[test]
    fn wall_clock_frames_measure_elapsed_time() {
        let (mut session, wall, _) = session_at(6, 0);
        wall.advance_millis(3_000);
        assert_eq!(session.frame_from_wall_clock(), 3);
        wall.advance_millis(500);
        assert_eq!(session.frame_from_wall_clock(), 0);
        wall.advance_millis(500);
        assert_eq!(session.frame_from_wall_clock(), 1);
        assert_eq!(session.clock().time_string(), "06:04");
    }

    #[test]
    fn color_follows_bucket_change() {
        let (mut session, _wall, _) = session_at(17, 59);
        session.frame(1.0);
        assert!(session.ambient().is_interpolating());
        for _ in 0..4 {
            session.frame(0.5);
        }
        assert!(!session.ambient().is_interpolating());
        assert_eq!(
            session.ambient().current(),
            Palette::standard().color_for(FineTimeOfDay::Dusk)
        );
    }

    #[test]
    fn save_and_restore_round_trip_through_json() {
        let (mut session, _wall, _) = session_at(12, 30);
        let json = session.save_json().unwrap();
        assert_eq!(json, r#"{"month":1,"day":1,"hour":12,"minute":30}"#);

        session.clock_mut().skip_minutes(10 * 60);
        assert_eq!(session.ambient().fine_time_of_day(), FineTimeOfDay::Noon);

        session
            .restore_json(r#"{"month":3,"day":9,"hour":21,"minute":15}"#)
            .unwrap();
        assert_eq!(session.save(), VirtualCalendar::new(3, 9, 21, 15).unwrap());
        assert!(!session.ambient().is_interpolating());
        assert_eq!(session.ambient().fine_time_of_day(), FineTimeOfDay::Night);
    }

    #[test]
    fn restore_rejects_out_of_range_save() {
        let (mut session, _wall, _) = session_at(12, 0);
        let before = session.save();
        let result = session.restore_json(r#"{"month":1,"day":31,"hour":0,"minute":0}"#);
        assert!(matches!(result, Err(EngineError::Clock { .. })));
        assert_eq!(session.save(), before);

        let result = session.restore_json("not json");
        assert!(matches!(result, Err(EngineError::Save { .. })));
    }
}
