//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::ledger::PaymentLedger;
use crate::metrics::ServiceMetrics;
use crate::processor::ProcessorClient;
use crate::queue::PaymentQueue;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed)
/// so that Axum can clone the state per request without copying anything
/// expensive.
#[derive(Clone)]
pub struct AppState {
    /// In-memory record of every payment this instance has seen.
    pub ledger: Arc<PaymentLedger>,
    /// Client over both upstream processors; exposes breaker state and stats.
    pub client: Arc<ProcessorClient>,
    /// Hot-path counters.
    pub metrics: Arc<ServiceMetrics>,
    /// Sending side of the worker queue.
    pub queue: PaymentQueue,
}

impl AppState {
    pub fn new(
        ledger: Arc<PaymentLedger>,
        client: Arc<ProcessorClient>,
        metrics: Arc<ServiceMetrics>,
        queue: PaymentQueue,
    ) -> Self {
        Self {
            ledger,
            client,
            metrics,
            queue,
        }
    }

    /// State wired to unreachable processors and a queue whose receiver is
    /// handed back to the test.
    #[cfg(test)]
    pub fn for_tests(
        queue_capacity: usize,
    ) -> (
        Self,
        tokio::sync::mpsc::Receiver<common::protocol::PaymentRequest>,
    ) {
        use crate::config::Config;

        let cfg = Config {
            port: 0,
            token: "test".into(),
            default_processor_url: "http://127.0.0.1:1".into(),
            fallback_processor_url: "http://127.0.0.1:1".into(),
            batch_size: 10,
            batch_flush_interval_ms: 50,
            queue_buffer_size: queue_capacity,
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout_secs: 60,
            health_check_interval_secs: 30,
            request_timeout_ms: 500,
            default_fee_bps: 500,
            fallback_fee_bps: 500,
            log_level: "error".into(),
        };
        let (queue, rx) = PaymentQueue::bounded(queue_capacity);
        let state = Self::new(
            Arc::new(PaymentLedger::new()),
            Arc::new(ProcessorClient::new(&cfg).expect("test client")),
            Arc::new(ServiceMetrics::new()),
            queue,
        );
        (state, rx)
    }
}
