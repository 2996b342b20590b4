//! Injectable time, id and latency sources for the action layer.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::Id;

/// Source of "now" for record timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to (for tests).
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Time-based id generator.
///
/// Ids are the creation time in milliseconds, bumped by one whenever two
/// ids would otherwise collide, so they are unique and strictly increasing
/// within a process even under rapid creation.
#[derive(Debug, Default)]
pub struct IdSource {
    last: AtomicI64,
}

impl IdSource {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> Id {
        let candidate = now.timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return Id::from(next),
                Err(actual) => last = actual,
            }
        }
    }
}

/// Simulated network latency awaited by every async action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency(Duration);

impl Latency {
    pub const NONE: Self = Self(Duration::ZERO);

    pub const fn new(delay: Duration) -> Self {
        Self(delay)
    }

    pub const fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub const fn duration(&self) -> Duration {
        self.0
    }

    /// Suspend for the configured delay. Zero still yields once so the
    /// action remains a genuine suspension point.
    pub async fn wait(&self) {
        if self.0.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.0).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn ids_increase_when_clock_stands_still() {
        let source = IdSource::new();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let a = source.next_id(now);
        let b = source.next_id(now);
        let c = source.next_id(now);
        let parsed: Vec<i64> = [a, b, c].iter().map(|id| id.as_str().parse().unwrap()).collect();
        assert_eq!(parsed[0], now.timestamp_millis());
        assert_eq!(parsed[1], parsed[0] + 1);
        assert_eq!(parsed[2], parsed[0] + 2);
    }

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(TimeDelta::minutes(5));
        assert_eq!(clock.now(), start + TimeDelta::minutes(5));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_waits_for_configured_delay() {
        let latency = Latency::from_millis(1000);
        let before = tokio::time::Instant::now();
        latency.wait().await;
        assert!(before.elapsed() >= Duration::from_millis(1000));
    }
}
