//! Lock-free service counters, incremented on the hot path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for payment flow: submitted at the API, then either
/// processed or failed by the worker.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    submitted: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Fraction of submitted payments that completed successfully, as a
    /// percentage. Zero submissions reads as 0.0.
    pub fn success_rate(&self) -> f64 {
        let submitted = self.submitted();
        if submitted == 0 {
            return 0.0;
        }
        (self.processed() as f64 / submitted as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let m = ServiceMetrics::new();
        assert_eq!(m.submitted(), 0);
        assert_eq!(m.processed(), 0);
        assert_eq!(m.failed(), 0);
        assert_eq!(m.success_rate(), 0.0);
    }

    #[test]
    fn counters_accumulate() {
        let m = ServiceMetrics::new();
        for _ in 0..4 {
            m.record_submitted();
        }
        m.record_processed();
        m.record_processed();
        m.record_processed();
        m.record_failed();

        assert_eq!(m.submitted(), 4);
        assert_eq!(m.processed(), 3);
        assert_eq!(m.failed(), 1);
        assert_eq!(m.success_rate(), 75.0);
    }
}
