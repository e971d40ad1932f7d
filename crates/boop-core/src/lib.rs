//! Core types and error definitions for Boop.
//!
//! This crate provides the types shared across all Boop crates: the error
//! type, the persisted event record, the event vocabulary, the clock used for
//! session timing, and the configuration surface.
//!
//! # Main types
//!
//! - [`BoopError`] — Unified error enum for all Boop crates.
//! - [`BoopResult`] — Convenience alias for `Result<T, BoopError>`.
//! - [`EventRecord`] — A single tracked event as handed to a sink.
//! - [`Environment`] — Production or development namespace selection.
//! - [`Clock`] — Time source; [`SystemClock`] and [`ManualClock`].
//! - [`TrackerConfig`] / [`BoopConfig`] — Tracker and file configuration.

/// Wall-clock abstraction for session timing.
pub mod clock;
/// Tracker and sink configuration, file loading and discovery.
pub mod config;
/// Production/development namespace selection.
pub mod environment;
/// Error type and result alias.
pub mod error;
/// Event records and the lifecycle event vocabulary.
pub mod event;

pub use clock::{seconds_between, Clock, ManualClock, SystemClock};
pub use config::{BoopConfig, SinkConfig, TrackerConfig};
pub use environment::Environment;
pub use error::{BoopError, BoopResult};
pub use event::{
    is_lifecycle_event, EventRecord, APP_LAUNCH, SESSION_DURATION_LABEL, SESSION_FLOP,
    SESSION_START, SESSION_START_LABEL, SESSION_STOP, TIMEOUT_SUFFIX,
};
