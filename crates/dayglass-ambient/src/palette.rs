//! Background colors per fine time-of-day bucket.

use std::collections::BTreeMap;

use dayglass_core::config::AmbientConfig;
use dayglass_types::{FineTimeOfDay, Rgb};

/// Built-in color for each bucket as `[r, g, b]`.
pub const DEFAULT_COLORS: [(FineTimeOfDay, [u8; 3]); 6] = [
    (FineTimeOfDay::Dawn, [250, 170, 140]),
    (FineTimeOfDay::Morning, [170, 215, 245]),
    (FineTimeOfDay::Noon, [120, 190, 250]),
    (FineTimeOfDay::Afternoon, [150, 180, 230]),
    (FineTimeOfDay::Dusk, [235, 130, 90]),
    (FineTimeOfDay::Night, [20, 24, 60]),
];

/// Used when even the night entry is missing.
const NIGHT_FALLBACK: [u8; 3] = [20, 24, 60];

/// Lookup table from fine time-of-day to target color.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: BTreeMap<FineTimeOfDay, Rgb>,
}

impl Palette {
    /// The built-in table.
    pub fn standard() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .map(|&(bucket, rgb)| (bucket, to_rgb(rgb)))
                .collect(),
        }
    }

    /// A table with no entries. Every lookup falls back to night.
    pub const fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    /// The built-in table with any configured overrides applied.
    pub fn from_config(config: &AmbientConfig) -> Self {
        let mut palette = Self::standard();
        for (&bucket, &rgb) in &config.colors {
            palette.set(bucket, to_rgb(rgb));
        }
        palette
    }

    /// Replace the color for one bucket.
    pub fn set(&mut self, bucket: FineTimeOfDay, color: Rgb) {
        self.colors.insert(bucket, color);
    }

    /// Target color for `bucket`, falling back to the night color on a miss.
    pub fn color_for(&self, bucket: FineTimeOfDay) -> Rgb {
        self.colors
            .get(&bucket)
            .or_else(|| self.colors.get(&FineTimeOfDay::Night))
            .copied()
            .unwrap_or_else(|| to_rgb(NIGHT_FALLBACK))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

fn to_rgb([r, g, b]: [u8; 3]) -> Rgb {
    Rgb::from_u8(r, g, b)
}

/// Quadratic ease-out: fast start, gentle landing. `t` is clamped to 0-1.
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    inv.mul_add(-inv, 1.0)
}
