//! End-to-end tests for a [`Session`]: clock, lottery, events, ambient
//! color, and save/restore working together.
//!
//! Time is stepped by hand through explicit frame deltas or a shared
//! [`ManualWallClock`], so every test is deterministic.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::cell::RefCell;
use std::rc::Rc;

use dayglass_ambient::{ColorSink, Palette};
use dayglass_core::clock::ClockEngine;
use dayglass_core::config::DayglassConfig;
use dayglass_core::lottery::LotteryRng;
use dayglass_core::wall::ManualWallClock;
use dayglass_engine::session::Session;
use dayglass_events::{ClockEvent, EventRecorder};
use dayglass_types::{CoarsePeriod, FineTimeOfDay, VirtualCalendar};

/// Every roll is the lowest value: with the default winning roll of 1,
/// every trial opens a window of the minimum length.
#[derive(Debug)]
struct AlwaysWin;

impl LotteryRng for AlwaysWin {
    fn draw(&mut self, low: u32, _high: u32) -> u32 {
        low
    }
}

type Pushed = Rc<RefCell<Vec<u32>>>;

fn recording_sink() -> (Pushed, Box<dyn ColorSink>) {
    let pushed: Pushed = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::clone(&pushed);
    let sink: Box<dyn ColorSink> = Box::new(move |packed: u32| handle.borrow_mut().push(packed));
    (pushed, sink)
}

fn seeded_config() -> DayglassConfig {
    let mut config = DayglassConfig::default();
    config.lottery.seed = Some(42);
    config
}

/// Session starting at 06:00 whose lottery wins every trial.
fn winning_session(wall: &ManualWallClock) -> (Session, EventRecorder) {
    let config = seeded_config();
    let clock = ClockEngine::with_rng(
        &config.clock,
        &config.lottery,
        Box::new(wall.clone()),
        Box::new(AlwaysWin),
    )
    .unwrap();
    let (_, sink) = recording_sink();
    let mut session = Session::with_clock(clock, &config.ambient, sink);
    let recorder = EventRecorder::new();
    session.subscribe(Box::new(recorder.clone()));
    (session, recorder)
}

const OPENED: ClockEvent = ClockEvent::LotteryWindowChanged { active: true };
const CLOSED: ClockEvent = ClockEvent::LotteryWindowChanged { active: false };

// =============================================================================
// Time flow
// =============================================================================

#[test]
fn paused_wall_time_is_never_converted() {
    let wall = ManualWallClock::at_epoch();
    let (pushed, sink) = recording_sink();
    let mut session = Session::new(&seeded_config(), Box::new(wall.clone()), sink).unwrap();

    wall.advance_millis(2_000);
    assert_eq!(session.frame_from_wall_clock(), 2);

    session.clock_mut().pause();
    wall.advance_millis(3_600_000);
    assert_eq!(session.frame_from_wall_clock(), 0);
    assert_eq!(session.frame_from_wall_clock(), 0);

    session.clock_mut().resume();
    wall.advance_millis(1_000);
    assert_eq!(session.frame_from_wall_clock(), 1);

    assert_eq!(session.clock().elapsed_minutes(), 3);
    assert_eq!(session.clock().time_string(), "06:03");
    // Color frames keep running while the clock is paused.
    assert_eq!(pushed.borrow().len(), 5);
}

#[test]
fn full_day_reports_each_period_once_and_settles_on_dawn() {
    let wall = ManualWallClock::at_epoch();
    let (pushed, sink) = recording_sink();
    let mut session = Session::new(&seeded_config(), Box::new(wall), sink).unwrap();
    let recorder = EventRecorder::new();
    session.subscribe(Box::new(recorder.clone()));

    for _ in 0..1440 {
        session.frame(1.0);
    }

    assert_eq!(session.save(), VirtualCalendar::new(1, 2, 6, 0).unwrap());
    for (previous, next) in [
        (CoarsePeriod::Morning, CoarsePeriod::Day),
        (CoarsePeriod::Day, CoarsePeriod::Evening),
        (CoarsePeriod::Evening, CoarsePeriod::Night),
        (CoarsePeriod::Night, CoarsePeriod::Morning),
    ] {
        assert_eq!(
            recorder.count(&ClockEvent::PeriodChanged { previous, next }),
            1,
            "{previous:?} -> {next:?}"
        );
    }
    assert_eq!(recorder.count(&ClockEvent::AttritionBoundaryCrossed), 2);

    let dawn = Palette::standard().color_for(FineTimeOfDay::Dawn);
    assert_eq!(session.ambient().current(), dawn);
    assert_eq!(pushed.borrow().last().copied(), Some(dawn.packed()));
}

// =============================================================================
// Lottery
// =============================================================================

#[test]
fn window_opens_expires_and_reopens() {
    let wall = ManualWallClock::at_epoch();
    let (mut session, recorder) = winning_session(&wall);

    session.frame(1.0);
    assert!(session.clock().is_lottery_window_active());
    assert_eq!(session.clock().lottery_window_remaining(), Some(5));

    // Expires five minutes after opening, re-opens on the next minute.
    for _ in 0..5 {
        session.frame(1.0);
    }
    assert!(!session.clock().is_lottery_window_active());
    session.frame(1.0);
    assert!(session.clock().is_lottery_window_active());

    assert_eq!(recorder.events(), vec![OPENED, CLOSED, OPENED]);
}

#[test]
fn suspension_excludes_windows_until_resumed() {
    let wall = ManualWallClock::at_epoch();
    let (mut session, recorder) = winning_session(&wall);

    session.frame(1.0);
    assert!(session.clock().is_lottery_window_active());

    session.clock_mut().suspend_lottery();
    assert!(!session.clock().is_lottery_window_active());
    assert_eq!(recorder.drain(), vec![OPENED, CLOSED]);

    for _ in 0..30 {
        session.frame(1.0);
        assert!(!session.clock().is_lottery_window_active());
    }
    assert!(recorder.events().is_empty());

    session.clock_mut().resume_lottery();
    session.frame(1.0);
    assert!(session.clock().is_lottery_window_active());
    assert_eq!(recorder.events(), vec![OPENED]);
}

// =============================================================================
// Save / restore
// =============================================================================

#[test]
fn restore_closes_window_and_rearms() {
    let wall = ManualWallClock::at_epoch();
    let (mut session, recorder) = winning_session(&wall);

    session.frame(1.0);
    let save = session.save_json().unwrap();
    assert_eq!(save, r#"{"month":1,"day":1,"hour":6,"minute":1}"#);

    session
        .restore_json(r#"{"month":6,"day":15,"hour":19,"minute":30}"#)
        .unwrap();
    assert!(!session.clock().is_lottery_window_active());
    assert_eq!(session.clock().coarse_period(), CoarsePeriod::Evening);
    assert_eq!(
        session.ambient().current(),
        Palette::standard().color_for(FineTimeOfDay::Dusk)
    );
    // No period event for the jump itself.
    assert_eq!(recorder.drain(), vec![OPENED, CLOSED]);

    session.frame(1.0);
    assert!(session.clock().is_lottery_window_active());
    assert_eq!(recorder.events(), vec![OPENED]);
}
