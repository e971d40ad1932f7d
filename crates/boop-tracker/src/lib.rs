//! Session lifecycle tracking for Boop.
//!
//! [`SessionTracker`] owns the session state machine: it opens sessions
//! implicitly ahead of the first user-driven event, tags every event with
//! the current session id, and classifies session ends as stops or flops.
//! Records are handed to an [`EventSink`](boop_sink::EventSink).

/// Session identity and timing.
pub mod session;
/// The tracker itself.
pub mod tracker;

pub use session::SessionState;
pub use tracker::{SessionTracker, SharedTracker};
