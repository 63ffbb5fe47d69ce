//! Rolling per-processor statistics.
//!
//! Fed by the client on every forwarding attempt and by the background
//! health monitor; read by `/metrics`. Latency uses a 10-sample exponential
//! moving average so one slow call does not dominate.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Inner {
    success_count: u64,
    failure_count: u64,
    latency_avg_ms: u64,
}

/// Point-in-time copy of a processor's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub success_count: u64,
    pub failure_count: u64,
    pub latency_avg_ms: u64,
}

impl StatsSnapshot {
    /// Success fraction over all attempts; a processor with no history
    /// counts as fully healthy.
    pub fn success_rate(&self) -> f64 {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            return 1.0;
        }
        self.success_count as f64 / total as f64
    }

    /// A processor is considered healthy above a 50% success rate.
    pub fn is_healthy(&self) -> bool {
        self.success_rate() > 0.5
    }
}

/// Thread-safe rolling stats for one processor.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    inner: Mutex<Inner>,
}

impl ProcessorStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a successful attempt and fold its latency into the average.
    pub fn record_success(&self, latency: Duration) {
        let mut inner = self.lock();
        inner.success_count += 1;
        let sample = latency.as_millis() as u64;
        inner.latency_avg_ms = if inner.success_count == 1 {
            sample
        } else {
            (inner.latency_avg_ms * 9 + sample) / 10
        };
    }

    /// Record a failed attempt.
    pub fn record_failure(&self) {
        self.lock().failure_count += 1;
    }

    /// Copy out the current numbers.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.lock();
        StatsSnapshot {
            success_count: inner.success_count,
            failure_count: inner.failure_count,
            latency_avg_ms: inner.latency_avg_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_are_healthy() {
        let s = ProcessorStats::new().snapshot();
        assert_eq!(s.success_rate(), 1.0);
        assert!(s.is_healthy());
    }

    #[test]
    fn success_rate_mixes_counts() {
        let stats = ProcessorStats::new();
        stats.record_success(Duration::from_millis(10));
        stats.record_failure();
        stats.record_failure();
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.success_count, 1);
        assert_eq!(snap.failure_count, 3);
        assert_eq!(snap.success_rate(), 0.25);
        assert!(!snap.is_healthy());
    }

    #[test]
    fn first_latency_sample_is_taken_verbatim() {
        let stats = ProcessorStats::new();
        stats.record_success(Duration::from_millis(40));
        assert_eq!(stats.snapshot().latency_avg_ms, 40);
    }

    #[test]
    fn latency_average_smooths() {
        let stats = ProcessorStats::new();
        stats.record_success(Duration::from_millis(100));
        stats.record_success(Duration::from_millis(0));
        // (100 * 9 + 0) / 10
        assert_eq!(stats.snapshot().latency_avg_ms, 90);
    }
}
