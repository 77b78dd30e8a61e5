//! Color interpolation as an explicit state machine.
//!
//! There is at most one running interpolation per driver. Starting a new
//! one replaces the old state outright, so a cancelled interpolation can
//! never write another color.

use dayglass_types::Rgb;

use crate::palette::ease_out;

/// An eased blend between two colors, stepped by the host frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interpolation {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Blending from `from` toward `to`.
    Running {
        /// Color at the moment the blend started.
        from: Rgb,
        /// Target color.
        to: Rgb,
        /// Seconds stepped so far.
        elapsed: f32,
        /// Total seconds for the blend.
        duration: f32,
    },
}

impl Interpolation {
    /// Begin a blend, discarding whatever was running.
    pub const fn start(&mut self, from: Rgb, to: Rgb, duration: f32) {
        *self = Self::Running {
            from,
            to,
            elapsed: 0.0,
            duration,
        };
    }

    /// Stop without writing a final color.
    pub const fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// Whether a blend is in flight.
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Advance by `dt` seconds and return the color to display.
    ///
    /// Returns `None` when idle. The step that reaches the end of the blend
    /// returns exactly `to` and leaves the state idle. A non-positive
    /// duration completes on the first tick.
    pub fn tick(&mut self, dt: f32) -> Option<Rgb> {
        let Self::Running {
            from,
            to,
            elapsed,
            duration,
        } = self
        else {
            return None;
        };

        if dt.is_finite() && dt > 0.0 {
            *elapsed += dt;
        }

        if *duration <= 0.0 || *elapsed >= *duration {
            let target = *to;
            *self = Self::Idle;
            return Some(target);
        }

        Some(from.lerp(*to, ease_out(*elapsed / *duration)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black() -> Rgb {
        Rgb::from_u8(0, 0, 0)
    }

    fn white() -> Rgb {
        Rgb::from_u8(255, 255, 255)
    }

    #[test]
    fn idle_tick_yields_nothing() {
        let mut interp = Interpolation::default();
        assert!(!interp.is_running());
        assert_eq!(interp.tick(0.1), None);
    }

    #[test]
    fn runs_to_completion_and_lands_on_target() {
        let mut interp = Interpolation::Idle;
        interp.start(black(), white(), 1.0);
        assert!(interp.is_running());

        let halfway = interp.tick(0.5);
        // Ease-out is past the linear midpoint at half time.
        assert!(halfway.is_some_and(|c| c.r > 127.5 && c.r < 255.0));

        assert_eq!(interp.tick(0.6), Some(white()));
        assert!(!interp.is_running());
        assert_eq!(interp.tick(0.1), None);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut interp = Interpolation::Idle;
        interp.start(black(), white(), 0.0);
        assert_eq!(interp.tick(0.0), Some(white()));
        assert!(!interp.is_running());
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut interp = Interpolation::Idle;
        interp.start(black(), white(), 2.0);
        interp.cancel();
        assert_eq!(interp, Interpolation::Idle);
        assert_eq!(interp.tick(5.0), None);
    }

    #[test]
    fn bad_dt_does_not_advance() {
        let mut interp = Interpolation::Idle;
        interp.start(black(), white(), 1.0);
        assert_eq!(interp.tick(f32::NAN), Some(black()));
        assert_eq!(interp.tick(-1.0), Some(black()));
        assert!(interp.is_running());
    }
}
