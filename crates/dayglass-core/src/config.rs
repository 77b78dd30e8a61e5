//! Configuration loading and typed config structures for Dayglass.
//!
//! The canonical configuration lives in `dayglass-config.yaml` at the
//! workspace root. Every field has a default, so a missing section (or an
//! empty file) yields the tuned values below.
//!
//! Environment variables override YAML values:
//! - `DAYGLASS_SEED` overrides `lottery.seed`
//! - `DAYGLASS_LOG_LEVEL` overrides `logging.level`

use std::collections::BTreeMap;
use std::path::Path;

use dayglass_types::FineTimeOfDay;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DayglassConfig {
    /// Virtual clock start time and speed.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Lottery trial and window parameters.
    #[serde(default)]
    pub lottery: LotteryConfig,

    /// Background color transition settings.
    #[serde(default)]
    pub ambient: AmbientConfig,

    /// Host frame loop settings.
    #[serde(default)]
    pub host: HostConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DayglassConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml maps an empty document to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are ignored and the YAML value is kept.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = lookup("DAYGLASS_SEED").and_then(|v| v.trim().parse().ok()) {
            self.lottery.seed = Some(seed);
        }
        if let Some(level) = lookup("DAYGLASS_LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_owned();
        }
    }
}

/// Virtual calendar start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StartTime {
    /// Month (1-12).
    #[serde(default = "default_start_month")]
    pub month: u32,
    /// Day (1-30).
    #[serde(default = "default_start_day")]
    pub day: u32,
    /// Hour (0-23).
    #[serde(default = "default_start_hour")]
    pub hour: u32,
    /// Minute (0-59).
    #[serde(default)]
    pub minute: u32,
}

impl Default for StartTime {
    fn default() -> Self {
        Self {
            month: default_start_month(),
            day: default_start_day(),
            hour: default_start_hour(),
            minute: 0,
        }
    }
}

/// Virtual clock configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClockConfig {
    /// Calendar position at session start.
    #[serde(default)]
    pub start: StartTime,

    /// Real seconds that make up one virtual minute. Must be positive.
    #[serde(default = "default_real_seconds_per_minute")]
    pub real_seconds_per_minute: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            start: StartTime::default(),
            real_seconds_per_minute: default_real_seconds_per_minute(),
        }
    }
}

/// Lottery configuration.
///
/// Each virtual minute, while armed, a uniform roll in
/// `1..=trial_range_max` is drawn; a roll equal to `winning_roll` opens a
/// window lasting between `window_min_minutes` and `window_max_minutes`
/// virtual minutes (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LotteryConfig {
    /// Upper bound of the per-minute roll.
    #[serde(default = "default_trial_range_max")]
    pub trial_range_max: u32,

    /// The roll that opens a window.
    #[serde(default = "default_winning_roll")]
    pub winning_roll: u32,

    /// Shortest window, in virtual minutes.
    #[serde(default = "default_window_min_minutes")]
    pub window_min_minutes: u32,

    /// Longest window, in virtual minutes.
    #[serde(default = "default_window_max_minutes")]
    pub window_max_minutes: u32,

    /// RNG seed. `None` seeds from the operating system.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            trial_range_max: default_trial_range_max(),
            winning_roll: default_winning_roll(),
            window_min_minutes: default_window_min_minutes(),
            window_max_minutes: default_window_max_minutes(),
            seed: None,
        }
    }
}

/// Ambient background color configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmbientConfig {
    /// Real seconds a color transition takes.
    #[serde(default = "default_transition_seconds")]
    pub transition_seconds: f32,

    /// Per-bucket color overrides as `[r, g, b]`. Buckets not listed keep
    /// the built-in palette.
    #[serde(default)]
    pub colors: BTreeMap<FineTimeOfDay, [u8; 3]>,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            transition_seconds: default_transition_seconds(),
            colors: BTreeMap::new(),
        }
    }
}

/// Host frame loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Milliseconds between frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many frames (0 = unlimited).
    #[serde(default)]
    pub max_frames: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: 0,
            max_real_time_seconds: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_start_month() -> u32 {
    1
}

const fn default_start_day() -> u32 {
    1
}

const fn default_start_hour() -> u32 {
    6
}

const fn default_real_seconds_per_minute() -> f64 {
    1.0
}

const fn default_trial_range_max() -> u32 {
    100
}

const fn default_winning_roll() -> u32 {
    1
}

const fn default_window_min_minutes() -> u32 {
    5
}

const fn default_window_max_minutes() -> u32 {
    15
}

const fn default_transition_seconds() -> f32 {
    3.0
}

const fn default_frame_interval_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    String::from("info")
}
