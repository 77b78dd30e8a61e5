//! Host binary for the Dayglass clock.
//!
//! Wires configuration, logging, and a [`Session`] together and runs the
//! frame loop until a bound is reached or Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `DAYGLASS_CONFIG` or `dayglass-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Start the event logging task
//! 4. Build the session on the system clock
//! 5. Run the frame loop
//! 6. Log the result and the persisted calendar

use std::path::{Path, PathBuf};

use dayglass_core::config::{DayglassConfig, LoggingConfig};
use dayglass_core::wall::SystemWallClock;
use dayglass_engine::error::EngineError;
use dayglass_engine::observer;
use dayglass_engine::runner;
use dayglass_engine::session::Session;
use dayglass_events::BroadcastObserver;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "dayglass-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is unreadable or the clock cannot be
/// built from it.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("dayglass-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        seed = ?config.lottery.seed,
        real_seconds_per_minute = config.clock.real_seconds_per_minute,
        transition_seconds = config.ambient.transition_seconds,
        "Configuration summary"
    );

    // 3. Event logging task.
    let (events, rx) = BroadcastObserver::channel();
    let event_log = tokio::spawn(observer::log_events(rx));

    // 4. Session.
    let sink = |packed: u32| trace!(color = %format!("#{packed:06x}"), "Ambient color");
    let mut session = Session::new(&config, Box::new(SystemWallClock), Box::new(sink))?;
    session.subscribe(Box::new(events));

    // 5. Frame loop.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable, relying on configured bounds");
            std::future::pending::<()>().await;
        }
    };
    let result = runner::run_until(&mut session, &config.host, shutdown).await;

    // 6. Results. Dropping the session closes the event channel.
    runner::log_run_end(&result);
    drop(session);
    let tally = event_log.await?;
    info!(?tally, "dayglass-engine shutdown complete");

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load configuration.
///
/// A path in `DAYGLASS_CONFIG` must exist. Otherwise
/// `dayglass-config.yaml` in the working directory is read if present, and
/// defaults are used if not. Returns the path that was read, if any.
fn load_config() -> Result<(DayglassConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = std::env::var_os("DAYGLASS_CONFIG").map(PathBuf::from) {
        let config = DayglassConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = DayglassConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        let mut config = DayglassConfig::default();
        config.apply_env_overrides();
        Ok((config, None))
    }
}
