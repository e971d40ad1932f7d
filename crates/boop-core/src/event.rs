use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Emitted once per process start. Never carries a session id.
pub const APP_LAUNCH: &str = "App Launch";
/// Opens a session and rotates its id.
pub const SESSION_START: &str = "Session Start";
/// Closes a session that lasted at least the minimum viable duration.
pub const SESSION_STOP: &str = "Session Stop";
/// Closes a session shorter than the minimum viable duration.
pub const SESSION_FLOP: &str = "Session Flop";

/// Label attached to session start events.
pub const SESSION_START_LABEL: &str = "Minimum Session Timeout in Milliseconds";
/// Label attached to session stop and flop events.
pub const SESSION_DURATION_LABEL: &str = "Session Duration in Milliseconds";
/// Appended to [`SESSION_DURATION_LABEL`] when a timeout is subtracted.
pub const TIMEOUT_SUFFIX: &str = " (minus Timeout delay)";

/// Returns `true` for events that must never trigger an implicit session start.
pub fn is_lifecycle_event(name: &str) -> bool {
    matches!(name, SESSION_START | APP_LAUNCH | SESSION_STOP)
}

/// A single tracked event, as persisted by a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event name, e.g. `"Session Start"` or an application-defined name.
    pub event: String,
    /// Optional label payload; `null` when absent.
    pub label: serde_json::Value,
    /// Optional value payload; may be any nested JSON structure.
    pub value: serde_json::Value,
    /// Instance that produced the event.
    pub instance: String,
    /// Wall-clock time the record was built.
    pub timestamp: DateTime<Utc>,
    /// `None` omits the field entirely; `Some(None)` writes `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub session_id: Option<Option<Uuid>>,
}

impl EventRecord {
    /// Creates a record without a `sessionId` field.
    pub fn new(
        event: impl Into<String>,
        label: Option<serde_json::Value>,
        value: Option<serde_json::Value>,
        instance: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event: event.into(),
            label: label.unwrap_or(serde_json::Value::Null),
            value: value.unwrap_or(serde_json::Value::Null),
            instance: instance.into(),
            timestamp,
            session_id: None,
        }
    }

    /// Adds the `sessionId` field, writing `null` when `session_id` is `None`.
    pub fn with_session(mut self, session_id: Option<Uuid>) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Whether the record carries a `sessionId` field (possibly `null`).
    pub fn has_session_field(&self) -> bool {
        self.session_id.is_some()
    }

    /// The session id, if the field is present and non-null.
    pub fn session(&self) -> Option<Uuid> {
        self.session_id.flatten()
    }
}

// A present `null` must stay distinguishable from a missing field.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}
