use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of wall-clock time for session timing.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Starts the clock at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward (or backward, for negative durations).
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Convenience for [`advance`](Self::advance) with fractional seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::microseconds((secs * 1_000_000.0).round() as i64));
    }

    /// Jumps to `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Seconds elapsed from `from` to `to` with microsecond precision.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_shared_state() {
        let clock = ManualClock::default();
        let other = clock.clone();
        let start = clock.now();

        other.advance_secs(1.5);
        assert_eq!(seconds_between(start, clock.now()), 1.5);
    }

    #[test]
    fn manual_clock_jumps_to_instant() {
        let clock = ManualClock::default();
        let start = clock.now();
        let later = start + Duration::hours(3);

        clock.set(later);
        assert_eq!(clock.now(), later);
        assert_eq!(seconds_between(start, clock.now()), 10_800.0);
    }

    #[test]
    fn seconds_between_can_be_negative() {
        let clock = ManualClock::default();
        let start = clock.now();
        clock.advance(Duration::milliseconds(-250));
        assert_eq!(seconds_between(start, clock.now()), -0.25);
    }

    #[test]
    fn system_clock_is_monotone_enough() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }
}
