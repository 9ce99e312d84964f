//! Connection inactivity policy.
//!
//! The tracker only reports a timeout; the connection manager owns the
//! actual disconnect, the advertising restart and forcing the LED off.

use crate::clock::Timestamp;
use crate::config::CONNECTION_TIMEOUT_MS;

/// Tracks the last characteristic write / connect.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActivityTracker {
    last_activity: Timestamp,
    timeout_ms: u32,
}

impl ActivityTracker {
    /// Tracker with the firmware's fixed timeout, counting from `now`.
    pub const fn new(now: Timestamp) -> Self {
        Self::with_timeout(now, CONNECTION_TIMEOUT_MS)
    }

    pub const fn with_timeout(now: Timestamp, timeout_ms: u32) -> Self {
        Self {
            last_activity: now,
            timeout_ms,
        }
    }

    /// Record activity (characteristic write, central connect).
    pub fn reset(&mut self, now: Timestamp) {
        self.last_activity = now;
    }

    pub fn last_activity(&self) -> Timestamp {
        self.last_activity
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Strictly more than the timeout has passed since the last activity.
    pub fn is_timed_out(&self, now: Timestamp) -> bool {
        now.elapsed_since(self.last_activity) > self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_is_not_timed_out() {
        let t0 = Timestamp::from_millis(5_000);
        let tracker = ActivityTracker::new(t0);
        assert!(!tracker.is_timed_out(t0));
        assert_eq!(tracker.timeout_ms(), 60_000);
    }

    #[test]
    fn timeout_boundary_is_exclusive() {
        let tracker = ActivityTracker::new(Timestamp::ZERO);
        assert!(!tracker.is_timed_out(Timestamp::from_millis(60_000)));
        assert!(tracker.is_timed_out(Timestamp::from_millis(60_001)));
    }

    #[test]
    fn reset_restarts_the_window() {
        let mut tracker = ActivityTracker::new(Timestamp::ZERO);
        tracker.reset(Timestamp::from_millis(50_000));
        assert!(!tracker.is_timed_out(Timestamp::from_millis(100_000)));
        assert!(tracker.is_timed_out(Timestamp::from_millis(110_001)));
    }

    #[test]
    fn rollover_does_not_fake_a_timeout() {
        let tracker = ActivityTracker::new(Timestamp::from_millis(u32::MAX - 999));
        // 1 s after the activity, counter already wrapped.
        assert!(!tracker.is_timed_out(Timestamp::from_millis(0)));
        assert!(!tracker.is_timed_out(Timestamp::from_millis(59_000)));
        assert!(tracker.is_timed_out(Timestamp::from_millis(59_001)));
    }
}
