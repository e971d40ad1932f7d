use boop_core::seconds_between;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity and timing of the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Whether a session has been opened. Only a stop would ever clear it,
    /// and stops leave it set.
    pub started: bool,
    /// Correlates every event of the open session.
    pub id: Option<Uuid>,
    /// Mark that durations are measured from.
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// State for a fresh tracker. With session tracking disabled the session
    /// counts as already started so no implicit start ever fires.
    pub fn initial(session_tracking_disabled: bool) -> Self {
        Self {
            started: session_tracking_disabled,
            id: None,
            started_at: None,
        }
    }

    /// Opens a session with a fresh id and returns that id.
    pub fn open(&mut self, now: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.started = true;
        self.id = Some(id);
        self.started_at = Some(now);
        id
    }

    /// Drops the identity and restarts the timer. `started` is left alone.
    pub fn relaunch(&mut self, now: DateTime<Utc>) {
        self.id = None;
        self.started_at = Some(now);
    }

    /// Seconds since `started_at`, or zero if the timer was never set.
    pub fn elapsed(&self, now: DateTime<Utc>) -> f64 {
        self.started_at
            .map(|start| seconds_between(start, now))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn initial_state_follows_tracking_flag() {
        assert!(!SessionState::initial(false).started);
        assert!(SessionState::initial(true).started);
        assert_eq!(SessionState::initial(true).id, None);
    }

    #[test]
    fn open_rotates_identity() {
        let now = Utc::now();
        let mut state = SessionState::default();
        let first = state.open(now);
        let second = state.open(now);
        assert_ne!(first, second);
        assert_eq!(state.id, Some(second));
        assert!(state.started);
    }

    #[test]
    fn relaunch_keeps_started_flag() {
        let now = Utc::now();
        let mut state = SessionState::default();
        state.open(now);
        state.relaunch(now + Duration::seconds(5));
        assert!(state.started);
        assert_eq!(state.id, None);
        assert_eq!(state.elapsed(now + Duration::seconds(6)), 1.0);
    }

    #[test]
    fn elapsed_without_timer_is_zero() {
        assert_eq!(SessionState::default().elapsed(Utc::now()), 0.0);
    }
}
