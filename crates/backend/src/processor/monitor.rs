//! Background health monitor for the upstream processors.
//!
//! Probes both health endpoints on a fixed interval and logs transitions,
//! together with the current breaker state. Routing does not depend on the
//! probe result — the breakers react to real payment traffic — so this task
//! is purely observational.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ProcessorClient, ProcessorKind};

/// Periodic prober over both processors.
pub struct HealthMonitor {
    client: Arc<ProcessorClient>,
    interval: Duration,
    last_seen: [Option<bool>; 2],
}

impl HealthMonitor {
    pub fn new(client: Arc<ProcessorClient>, interval: Duration) -> Self {
        Self {
            client,
            interval,
            last_seen: [None, None],
        }
    }

    /// Spawn the monitor loop onto the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Probe both processors once, logging any health transition.
    async fn tick(&mut self) -> [bool; 2] {
        let mut healthy = [false; 2];
        for (i, kind) in ProcessorKind::ALL.into_iter().enumerate() {
            healthy[i] = self.client.probe_health(kind).await;
            let breaker = self.client.breaker_state(kind);

            match self.last_seen[i] {
                Some(prev) if prev == healthy[i] => {
                    debug!(processor = %kind, healthy = healthy[i], breaker = breaker.as_str(), "health probe");
                }
                _ if healthy[i] => {
                    info!(processor = %kind, breaker = breaker.as_str(), "processor healthy");
                }
                _ => {
                    warn!(processor = %kind, breaker = breaker.as_str(), "processor unhealthy");
                }
            }
            self.last_seen[i] = Some(healthy[i]);
        }
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn unroutable_client() -> Arc<ProcessorClient> {
        let cfg = Config {
            port: 0,
            token: "test".into(),
            default_processor_url: "http://127.0.0.1:1".into(),
            fallback_processor_url: "http://127.0.0.1:1".into(),
            batch_size: 10,
            batch_flush_interval_ms: 50,
            queue_buffer_size: 10,
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout_secs: 60,
            health_check_interval_secs: 1,
            request_timeout_ms: 500,
            default_fee_bps: 500,
            fallback_fee_bps: 500,
            log_level: "error".into(),
        };
        Arc::new(ProcessorClient::new(&cfg).unwrap())
    }

    #[tokio::test]
    async fn tick_reports_unreachable_processors() {
        let mut monitor = HealthMonitor::new(unroutable_client(), Duration::from_secs(1));
        assert_eq!(monitor.tick().await, [false, false]);
        // Second tick exercises the no-transition path.
        assert_eq!(monitor.tick().await, [false, false]);
        assert_eq!(monitor.last_seen, [Some(false), Some(false)]);
    }
}
