//! Host-side wiring for the Dayglass clock.
//!
//! # Modules
//!
//! - [`error`] -- [`EngineError`](error::EngineError), the host's error type
//! - [`observer`] -- Spawned task that logs and tallies clock events
//! - [`runner`] -- The `tokio` frame loop with frame, time, and shutdown bounds
//! - [`session`] -- [`Session`](session::Session): clock plus ambient driver

pub mod error;
pub mod observer;
pub mod runner;
pub mod session;
