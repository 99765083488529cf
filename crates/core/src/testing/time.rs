//! Controllable clock and sleeper

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::time::{Clock, Sleeper};

/// Clock frozen at a given instant, advanced by hand
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Clock frozen at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(now)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().expect("mutex poisoned");
        *now += chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().expect("mutex poisoned") = instant;
    }
}

impl Default for MockClock {
    /// 2024-03-01 10:00:00 UTC.
    fn default() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).single().unwrap_or_default())
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("mutex poisoned")
    }
}

/// Records requested pauses and returns immediately
///
/// When built with [`RecordingSleeper::with_clock`], each pause also advances
/// the clock.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    pauses: Arc<Mutex<Vec<Duration>>>,
    clock: Option<MockClock>,
}

impl RecordingSleeper {
    /// Sleeper that only records pauses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeper that also advances `clock` by each pause.
    pub fn with_clock(clock: MockClock) -> Self {
        Self { pauses: Arc::default(), clock: Some(clock) }
    }

    /// Every pause requested so far.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().expect("mutex poisoned").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.pauses.lock().expect("mutex poisoned").push(duration);
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
    }
}
