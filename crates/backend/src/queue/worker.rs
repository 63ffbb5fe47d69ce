//! Batch worker: drains the payment queue and fans batches out to the
//! processors concurrently.
//!
//! A batch is flushed when it reaches the configured size or when the flush
//! interval ticks with work pending, whichever comes first. Every payment in
//! a batch ends up with a terminal ledger record.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info};

use common::protocol::PaymentRequest;

use crate::ledger::PaymentLedger;
use crate::metrics::ServiceMetrics;
use crate::processor::ProcessorClient;

/// Owns the consuming side of the payment pipeline.
pub struct BatchWorker {
    client: Arc<ProcessorClient>,
    ledger: Arc<PaymentLedger>,
    metrics: Arc<ServiceMetrics>,
    batch_size: usize,
    flush_interval: Duration,
}

impl BatchWorker {
    pub fn new(
        client: Arc<ProcessorClient>,
        ledger: Arc<PaymentLedger>,
        metrics: Arc<ServiceMetrics>,
        batch_size: usize,
        flush_interval: Duration,
    ) -> Self {
        Self {
            client,
            ledger,
            metrics,
            batch_size,
            flush_interval,
        }
    }

    /// Consume `rx` until the sending side closes, flushing the final
    /// partial batch before returning.
    pub async fn run(self, mut rx: mpsc::Receiver<PaymentRequest>) {
        info!(
            batch_size = self.batch_size,
            flush_interval_ms = self.flush_interval.as_millis() as u64,
            "payment worker started"
        );

        let mut batch: Vec<PaymentRequest> = Vec::with_capacity(self.batch_size);
        let mut ticker = tokio::time::interval(self.flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                received = rx.recv() => {
                    match received {
                        Some(request) => {
                            batch.push(request);
                            if batch.len() >= self.batch_size {
                                self.flush(&mut batch).await;
                            }
                        }
                        None => {
                            self.flush(&mut batch).await;
                            info!("payment queue closed, worker stopping");
                            return;
                        }
                    }
                }
                _ = ticker.tick() => {
                    if !batch.is_empty() {
                        self.flush(&mut batch).await;
                    }
                }
            }
        }
    }

    /// Forward every payment in `batch` concurrently and record outcomes.
    async fn flush(&self, batch: &mut Vec<PaymentRequest>) {
        if batch.is_empty() {
            return;
        }
        debug!(size = batch.len(), "flushing payment batch");

        let attempts = batch.drain(..).map(|request| {
            let client = Arc::clone(&self.client);
            async move {
                let settlement = client.forward(&request).await;
                (request, settlement)
            }
        });

        for (request, settlement) in join_all(attempts).await {
            match settlement {
                Some(s) => {
                    self.ledger.record_processed(
                        request.correlation_id,
                        request.amount_cents,
                        s.processor,
                        s.fee_cents,
                        s.processed_at,
                    );
                    self.metrics.record_processed();
                }
                None => {
                    self.ledger.record_failed(
                        request.correlation_id,
                        request.amount_cents,
                        Utc::now(),
                    );
                    self.metrics.record_failed();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ledger::Outcome;
    use crate::queue::PaymentQueue;
    use uuid::Uuid;

    fn unroutable_client() -> Arc<ProcessorClient> {
        let cfg = Config {
            port: 0,
            token: "test".into(),
            default_processor_url: "http://127.0.0.1:1".into(),
            fallback_processor_url: "http://127.0.0.1:1".into(),
            batch_size: 10,
            batch_flush_interval_ms: 20,
            queue_buffer_size: 10,
            circuit_breaker_threshold: 100,
            circuit_breaker_timeout_secs: 60,
            health_check_interval_secs: 30,
            request_timeout_ms: 500,
            default_fee_bps: 500,
            fallback_fee_bps: 500,
            log_level: "error".into(),
        };
        Arc::new(ProcessorClient::new(&cfg).unwrap())
    }

    fn request(amount_cents: u64) -> PaymentRequest {
        PaymentRequest {
            correlation_id: Uuid::new_v4(),
            amount_cents,
        }
    }

    #[tokio::test]
    async fn worker_drains_queue_and_records_outcomes() {
        let ledger = Arc::new(PaymentLedger::new());
        let metrics = Arc::new(ServiceMetrics::new());
        let worker = BatchWorker::new(
            unroutable_client(),
            Arc::clone(&ledger),
            Arc::clone(&metrics),
            2,
            Duration::from_millis(20),
        );

        let (queue, rx) = PaymentQueue::bounded(10);
        let handle = tokio::spawn(worker.run(rx));

        let requests = [request(100), request(200), request(300)];
        for req in &requests {
            ledger.record_pending(req);
            queue.enqueue(req.clone()).unwrap();
        }
        drop(queue);

        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("worker should stop once the queue closes")
            .unwrap();

        // Processors are unreachable, so every payment fails terminally.
        assert_eq!(metrics.failed(), 3);
        assert_eq!(metrics.processed(), 0);
        for req in &requests {
            let record = ledger.get(&req.correlation_id).unwrap();
            assert!(matches!(record.outcome, Outcome::Failed { .. }));
        }
    }

    #[tokio::test]
    async fn partial_batch_is_flushed_on_tick() {
        let ledger = Arc::new(PaymentLedger::new());
        let metrics = Arc::new(ServiceMetrics::new());
        let worker = BatchWorker::new(
            unroutable_client(),
            Arc::clone(&ledger),
            Arc::clone(&metrics),
            100, // never reached by size
            Duration::from_millis(20),
        );

        let (queue, rx) = PaymentQueue::bounded(10);
        let _handle = tokio::spawn(worker.run(rx));

        let req = request(100);
        ledger.record_pending(&req);
        queue.enqueue(req.clone()).unwrap();

        // Wait for a flush tick plus the (fast) connection-refused attempts.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            if metrics.failed() == 1 {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "partial batch was never flushed"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let record = ledger.get(&req.correlation_id).unwrap();
        assert!(matches!(record.outcome, Outcome::Failed { .. }));
    }
}
