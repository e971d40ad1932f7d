use boop_core::{
    is_lifecycle_event, BoopResult, Clock, EventRecord, SystemClock, TrackerConfig, APP_LAUNCH,
    SESSION_DURATION_LABEL, SESSION_FLOP, SESSION_START, SESSION_START_LABEL, SESSION_STOP,
    TIMEOUT_SUFFIX,
};
use boop_sink::{EventHandle, EventSink};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::session::SessionState;

/// A tracker shared between threads. Every call holds the lock for its
/// whole duration, so implicit session starts cannot race.
pub type SharedTracker = Arc<Mutex<SessionTracker>>;

/// Decides which events are emitted and tags them with session identity.
///
/// All state changes happen synchronously on the caller's thread before the
/// record is handed to the sink. Methods take `&mut self`: callers that
/// track from several threads must serialize access themselves, e.g. through
/// [`SessionTracker::into_shared`].
pub struct SessionTracker {
    config: TrackerConfig,
    namespace: String,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    session: SessionState,
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("namespace", &self.namespace)
            .field("sink", &self.sink.name())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl SessionTracker {
    /// Creates a tracker timed by the system clock.
    pub fn new(config: TrackerConfig, sink: Arc<dyn EventSink>) -> BoopResult<Self> {
        Self::with_clock(config, sink, Arc::new(SystemClock))
    }

    /// Creates a tracker timed by `clock`.
    pub fn with_clock(
        config: TrackerConfig,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> BoopResult<Self> {
        config.validate()?;
        let namespace = config.namespace();
        let session = SessionState::initial(config.session_tracking_disabled);
        debug!(
            namespace = %namespace,
            instance = %config.instance_id,
            sink = sink.name(),
            disabled = config.disabled,
            session_tracking_disabled = config.session_tracking_disabled,
            "Tracker created"
        );
        Ok(Self {
            config,
            namespace,
            sink,
            clock,
            session,
        })
    }

    /// Wraps the tracker for use from several threads.
    pub fn into_shared(self) -> SharedTracker {
        Arc::new(Mutex::new(self))
    }

    /// Tracks a user-initiated event.
    ///
    /// The first such event while no session is open is preceded by an
    /// implicit session start.
    pub fn track_event(
        &mut self,
        event: &str,
        label: Option<Value>,
        value: Option<Value>,
    ) -> Option<EventHandle> {
        self.track_event_with(event, label, value, true)
    }

    /// Tracks an event, stating whether the user caused it.
    pub fn track_event_with(
        &mut self,
        event: &str,
        label: Option<Value>,
        value: Option<Value>,
        user_initiated: bool,
    ) -> Option<EventHandle> {
        if self.config.disabled {
            return None;
        }
        if user_initiated && !is_lifecycle_event(event) {
            self.ensure_session_open(event);
        }
        self.emit(event, label, value)
    }

    /// Records the application launch.
    ///
    /// Clears the session id and restarts the session timer. The started
    /// flag is kept, so a session that was open before the launch does not
    /// trigger a new implicit start.
    pub fn track_app_launch(
        &mut self,
        label: Option<Value>,
        value: Option<Value>,
    ) -> Option<EventHandle> {
        self.session.relaunch(self.clock.now());
        self.track_event_with(APP_LAUNCH, label, value, false)
    }

    /// Opens a new session with a fresh id.
    ///
    /// Session state changes even when start events are suppressed or the
    /// tracker is disabled; only the write is skipped.
    pub fn track_session_start(&mut self) -> Option<EventHandle> {
        if self.config.session_tracking_disabled {
            warn!("Session tracking is disabled; track_session_start() will not run");
            return None;
        }
        self.open_session()
    }

    /// Reports the duration of the open session as a stop or a flop.
    ///
    /// The session stays open afterwards: a second stop reports again
    /// against the same start, and only the next start rotates the id.
    pub fn track_session_stop(&mut self) -> Option<EventHandle> {
        if self.config.session_tracking_disabled {
            warn!("Session tracking is disabled; track_session_stop() will not run");
            return None;
        }
        if !self.session.started {
            return None;
        }

        let timeout = self.config.session_timeout_seconds;
        let mut label = SESSION_DURATION_LABEL.to_string();
        if timeout > 0.0 {
            label.push_str(TIMEOUT_SUFFIX);
        }
        let duration = self.session.elapsed(self.clock.now()) - timeout;
        let millis = (duration * 1000.0).round() as i64;

        let kind = match self.config.minimum_viable_session_duration_seconds {
            Some(minimum) if duration < minimum => SESSION_FLOP,
            _ => SESSION_STOP,
        };
        if kind == SESSION_FLOP && !self.config.send_session_flop_events {
            debug!(duration_ms = millis, "Session flop not sent");
            return None;
        }
        self.emit_if_enabled(kind, Some(Value::from(label)), Some(Value::from(millis)))
    }

    /// Seconds the open session has lasted, minus the timeout. Zero when
    /// no session is open.
    pub fn current_session_duration(&self) -> f64 {
        if !self.is_session_open() {
            return 0.0;
        }
        self.session.elapsed(self.clock.now()) - self.config.session_timeout_seconds
    }

    /// Whether a session is open and session tracking is on.
    pub fn is_session_open(&self) -> bool {
        self.session.started && !self.config.session_tracking_disabled
    }

    /// The raw started flag.
    pub fn is_session_started(&self) -> bool {
        self.session.started
    }

    /// Id of the current session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.id
    }

    /// When the session timer was last restarted.
    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session.started_at
    }

    /// Namespace events are written to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The configuration the tracker was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn ensure_session_open(&mut self, trigger: &str) {
        if self.config.session_tracking_disabled || self.session.started {
            return;
        }
        debug!(trigger = %trigger, "Opening implicit session");
        let _ = self.open_session();
    }

    fn open_session(&mut self) -> Option<EventHandle> {
        let timeout_ms = (self.config.session_timeout_seconds * 1000.0) as i64;
        let id = self.session.open(self.clock.now());
        if !self.config.send_session_start_events {
            debug!(session_id = %id, "Session start not sent");
            return None;
        }
        self.emit_if_enabled(
            SESSION_START,
            Some(Value::from(SESSION_START_LABEL)),
            Some(Value::from(timeout_ms)),
        )
    }

    fn emit_if_enabled(
        &self,
        event: &str,
        label: Option<Value>,
        value: Option<Value>,
    ) -> Option<EventHandle> {
        if self.config.disabled {
            return None;
        }
        self.emit(event, label, value)
    }

    fn emit(&self, event: &str, label: Option<Value>, value: Option<Value>) -> Option<EventHandle> {
        let mut record = EventRecord::new(
            event,
            label,
            value,
            self.config.instance_id.as_str(),
            self.clock.now(),
        );
        if !self.config.session_tracking_disabled && event != APP_LAUNCH {
            record = record.with_session(self.session.id);
        }
        self.sink.write(&self.namespace, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boop_core::ManualClock;
    use boop_sink::MemorySink;

    fn tracker(config: TrackerConfig) -> (SessionTracker, MemorySink, ManualClock) {
        let sink = MemorySink::new();
        let clock = ManualClock::default();
        let tracker =
            SessionTracker::with_clock(config, Arc::new(sink.clone()), Arc::new(clock.clone()))
                .unwrap();
        (tracker, sink, clock)
    }

    #[test]
    fn invalid_config_fails_construction() {
        let result = SessionTracker::new(TrackerConfig::new(""), Arc::new(MemorySink::new()));
        assert!(result.is_err());
    }

    #[test]
    fn config_is_kept_as_given() {
        let config = TrackerConfig::new("app").with_instance("kiosk").with_session_timeout(5.0);
        let (t, _, _) = tracker(config.clone());
        assert_eq!(t.config(), &config);
        assert_eq!(t.config().instance_id, "kiosk");
    }

    #[test]
    fn namespace_follows_environment() {
        let (t, _, _) = tracker(TrackerConfig::new("app"));
        assert_eq!(t.namespace(), "app-dev");
        let (t, _, _) = tracker(
            TrackerConfig::new("app").with_environment(boop_core::Environment::Production),
        );
        assert_eq!(t.namespace(), "app");
    }

    #[test]
    fn session_start_value_is_truncated_millis() {
        let config = TrackerConfig::new("app").enabled().with_session_timeout(1.2345);
        let (mut t, sink, _) = tracker(config);
        t.track_session_start().unwrap();
        let record = &sink.records()[0].record;
        assert_eq!(record.event, SESSION_START);
        assert_eq!(record.label, Value::from(SESSION_START_LABEL));
        assert_eq!(record.value, Value::from(1234));
    }

    #[test]
    fn stop_label_mentions_timeout_only_when_set() {
        let (mut t, sink, clock) = tracker(TrackerConfig::new("app").enabled());
        t.track_session_start();
        clock.advance_secs(2.0);
        t.track_session_stop().unwrap();
        assert_eq!(sink.records()[1].record.label, Value::from(SESSION_DURATION_LABEL));
        assert_eq!(sink.records()[1].record.value, Value::from(2000));

        let config = TrackerConfig::new("app").enabled().with_session_timeout(0.5);
        let (mut t, sink, clock) = tracker(config);
        t.track_session_start();
        clock.advance_secs(2.0);
        t.track_session_stop().unwrap();
        assert_eq!(
            sink.records()[1].record.label,
            Value::from(format!("{SESSION_DURATION_LABEL}{TIMEOUT_SUFFIX}"))
        );
        assert_eq!(sink.records()[1].record.value, Value::from(1500));
    }

    #[test]
    fn stop_duration_can_be_negative() {
        let config = TrackerConfig::new("app").enabled().with_session_timeout(30.0);
        let (mut t, sink, clock) = tracker(config);
        t.track_session_start();
        clock.advance_secs(10.0);
        t.track_session_stop().unwrap();
        assert_eq!(sink.records()[1].record.value, Value::from(-20_000));
        assert_eq!(sink.records()[1].record.event, SESSION_STOP);
    }

    #[test]
    fn stop_without_session_is_none() {
        let (mut t, sink, _) = tracker(TrackerConfig::new("app").enabled());
        assert!(t.track_session_stop().is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn app_launch_resets_identity_but_not_started_flag() {
        let (mut t, sink, _) = tracker(TrackerConfig::new("app").enabled());
        t.track_session_start();
        t.track_app_launch(None, None).unwrap();
        assert!(t.is_session_started());
        assert_eq!(t.session_id(), None);

        // No implicit start: the flag survived the launch.
        t.track_event("Tap", None, None).unwrap();
        let names = sink.event_names();
        assert_eq!(names, vec![SESSION_START, APP_LAUNCH, "Tap"]);
        assert_eq!(sink.records()[2].record.session_id, Some(None));
    }

    #[test]
    fn non_user_events_do_not_open_sessions() {
        let (mut t, sink, _) = tracker(TrackerConfig::new("app").enabled());
        t.track_event_with("Background Sync", None, None, false).unwrap();
        assert_eq!(sink.event_names(), vec!["Background Sync"]);
        assert!(!t.is_session_started());
        assert_eq!(sink.records()[0].record.session_id, Some(None));
    }

    #[test]
    fn zero_threshold_never_flops() {
        let (mut t, sink, _) = tracker(
            TrackerConfig::new("app")
                .enabled()
                .with_minimum_viable_session_duration(0.0),
        );
        t.track_session_start();
        t.track_session_stop().unwrap();
        // Zero elapsed is not below a zero threshold.
        assert_eq!(sink.event_names()[1], SESSION_STOP);
    }

    #[test]
    fn suppressed_flop_writes_nothing() {
        let (mut t, sink, clock) = tracker(
            TrackerConfig::new("app")
                .enabled()
                .with_minimum_viable_session_duration(5.0)
                .with_session_flop_events(false),
        );
        t.track_session_start();
        clock.advance_secs(1.0);
        assert!(t.track_session_stop().is_none());
        assert_eq!(sink.event_names(), vec![SESSION_START]);
    }

    #[test]
    fn disabled_tracker_still_moves_session_state() {
        let (mut t, sink, _) = tracker(TrackerConfig::new("app"));
        assert!(t.track_session_start().is_none());
        assert!(t.is_session_open());
        assert!(t.session_id().is_some());
        assert!(sink.is_empty());
    }

    #[test]
    fn debug_output_names_sink() {
        let (t, _, _) = tracker(TrackerConfig::new("app"));
        let out = format!("{t:?}");
        assert!(out.contains("memory"));
        assert!(out.contains("app-dev"));
    }
}
