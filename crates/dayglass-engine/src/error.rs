//! Error types for the Dayglass host.
//!
//! [`EngineError`] wraps every failure that can surface while starting a
//! session or moving saves in and out of it.

/// Top-level error for the host binary and [`Session`](crate::session::Session).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: dayglass_core::config::ConfigError,
    },

    /// Clock construction or restore failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: dayglass_core::clock::ClockError,
    },

    /// A save could not be encoded or decoded.
    #[error("save error: {source}")]
    Save {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
