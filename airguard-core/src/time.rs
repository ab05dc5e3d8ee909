//! Time sources for stamping measurements
//!
//! Readers only need monotonic sleeps, but every published measurement carries
//! a wall-clock timestamp so that debug logs can be plotted against time.
//! Tests swap in [`FixedTime`] to get deterministic stamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::constants::time::MS_PER_SECOND;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Source of time for the station
pub trait TimeSource: Send {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Current timestamp in whole seconds
    fn now_secs(&self) -> u64 {
        self.now() / MS_PER_SECOND
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Settable time source for testing
///
/// Clones share the same clock, so a test can keep one handle and advance
/// the time seen by a station that owns the other.
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Arc<AtomicU64>,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp: Arc::new(AtomicU64::new(timestamp)) }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);
        assert_eq!(time.now_secs(), 1);
    }

    #[test]
    fn clones_share_the_clock() {
        let time = FixedTime::new(0);
        let shared = time.clone();
        time.set(42_000);
        assert_eq!(shared.now_secs(), 42);
    }

    #[test]
    fn system_time_is_after_2020() {
        assert!(SystemTime.now_secs() > 1_577_836_800);
    }
}
