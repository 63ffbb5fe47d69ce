//! Per-processor circuit breaker.
//!
//! State machine:
//! - `Closed` — requests flow; consecutive failures are counted.
//! - `Open` — requests are short-circuited until the cooldown elapses.
//! - `HalfOpen` — one probe request is allowed through; success closes the
//!   breaker, failure reopens it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Thread-safe circuit breaker.
///
/// The critical sections are a few loads and stores, so a plain [`Mutex`] is
/// fine even on the async request path.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    /// A breaker that opens after `threshold` consecutive failures and allows
    /// a half-open probe once `cooldown` has elapsed.
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
            threshold,
            cooldown,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded data cannot be left inconsistent, so a poisoned lock
        // is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may be attempted right now.
    ///
    /// An open breaker whose cooldown has elapsed transitions to half-open
    /// and admits the caller as the probe.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.cooldown {
                    inner.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful attempt; closes the breaker.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed attempt.
    ///
    /// A half-open probe failure reopens immediately; in closed state the
    /// breaker opens once the failure count reaches the threshold.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
            }
            _ => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.threshold {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
        }
    }

    /// Current state, without side effects.
    pub fn state(&self) -> BreakerState {
        self.lock().state
    }
}
