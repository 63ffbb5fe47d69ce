//! HTTP client for the upstream payment processors.
//!
//! Attempts go default-first, each gated by that processor's circuit
//! breaker. A 2xx from either processor settles the payment; anything else
//! counts as a failure for the breaker and the stats.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, warn};

use common::protocol::{PaymentRequest, ProcessorPayload};

use crate::config::Config;
use crate::money;

use super::breaker::{BreakerState, CircuitBreaker};
use super::stats::{ProcessorStats, StatsSnapshot};
use super::ProcessorKind;

/// Header carrying the competition token to the processors.
const TOKEN_HEADER: &str = "X-Rinha-Token";

/// Health probes tolerate slower responses than payment calls.
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a successfully forwarded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Processor that accepted the payment.
    pub processor: ProcessorKind,
    /// Fee charged, in cents.
    pub fee_cents: u64,
    /// When the processor accepted it.
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug)]
struct Endpoint {
    kind: ProcessorKind,
    base_url: String,
    fee_bps: u32,
    breaker: CircuitBreaker,
    stats: ProcessorStats,
}

/// Client over both upstream processors.
#[derive(Debug)]
pub struct ProcessorClient {
    http: reqwest::Client,
    token: String,
    endpoints: [Endpoint; 2],
}

impl ProcessorClient {
    /// Build the client and both endpoints from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .context("failed to build processor HTTP client")?;

        let cooldown = Duration::from_secs(cfg.circuit_breaker_timeout_secs);
        let endpoint = |kind: ProcessorKind, base_url: &str, fee_bps: u32| Endpoint {
            kind,
            base_url: base_url.trim_end_matches('/').to_owned(),
            fee_bps,
            breaker: CircuitBreaker::new(cfg.circuit_breaker_threshold, cooldown),
            stats: ProcessorStats::new(),
        };

        Ok(Self {
            http,
            token: cfg.token.clone(),
            endpoints: [
                endpoint(
                    ProcessorKind::Default,
                    &cfg.default_processor_url,
                    cfg.default_fee_bps,
                ),
                endpoint(
                    ProcessorKind::Fallback,
                    &cfg.fallback_processor_url,
                    cfg.fallback_fee_bps,
                ),
            ],
        })
    }

    /// Forward `request` to the first processor that accepts it.
    ///
    /// Returns `None` when both processors are gated or failing; the caller
    /// records the payment as failed.
    pub async fn forward(&self, request: &PaymentRequest) -> Option<Settlement> {
        for endpoint in &self.endpoints {
            if let Some(settlement) = self.attempt(endpoint, request).await {
                return Some(settlement);
            }
        }
        error!(
            correlation_id = %request.correlation_id,
            "both processors failed to settle payment"
        );
        None
    }

    async fn attempt(&self, endpoint: &Endpoint, request: &PaymentRequest) -> Option<Settlement> {
        if !endpoint.breaker.try_acquire() {
            warn!(processor = %endpoint.kind, "circuit breaker open, skipping attempt");
            return None;
        }

        let started = Instant::now();
        match self.send_payment(endpoint, request).await {
            Ok(()) => {
                endpoint.breaker.record_success();
                endpoint.stats.record_success(started.elapsed());
                Some(Settlement {
                    processor: endpoint.kind,
                    fee_cents: money::fee_cents(request.amount_cents, endpoint.fee_bps),
                    processed_at: Utc::now(),
                })
            }
            Err(e) => {
                endpoint.breaker.record_failure();
                endpoint.stats.record_failure();
                warn!(
                    processor = %endpoint.kind,
                    correlation_id = %request.correlation_id,
                    error = %e,
                    "payment attempt failed"
                );
                None
            }
        }
    }

    async fn send_payment(
        &self,
        endpoint: &Endpoint,
        request: &PaymentRequest,
    ) -> Result<(), AttemptError> {
        let payload = ProcessorPayload::for_request(request);
        let response = self
            .http
            .post(format!("{}/payments", endpoint.base_url))
            .header(TOKEN_HEADER, &self.token)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AttemptError::Status(response.status()))
        }
    }

    /// Probe `GET {base}/health`; any 2xx counts as healthy.
    pub async fn probe_health(&self, kind: ProcessorKind) -> bool {
        let endpoint = self.endpoint(kind);
        match self
            .http
            .get(format!("{}/health", endpoint.base_url))
            .timeout(HEALTH_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(processor = %kind, error = %e, "health probe failed");
                false
            }
        }
    }

    /// Current breaker state for `kind`.
    pub fn breaker_state(&self, kind: ProcessorKind) -> BreakerState {
        self.endpoint(kind).breaker.state()
    }

    /// Rolling stats snapshot for `kind`.
    pub fn stats(&self, kind: ProcessorKind) -> StatsSnapshot {
        self.endpoint(kind).stats.snapshot()
    }

    fn endpoint(&self, kind: ProcessorKind) -> &Endpoint {
        match kind {
            ProcessorKind::Default => &self.endpoints[0],
            ProcessorKind::Fallback => &self.endpoints[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Config pointing both processors at a port nothing listens on, so
    /// every attempt fails fast with connection refused.
    fn unroutable_config(threshold: u32) -> Config {
        Config {
            port: 0,
            token: "test".into(),
            default_processor_url: "http://127.0.0.1:1".into(),
            fallback_processor_url: "http://127.0.0.1:1".into(),
            batch_size: 10,
            batch_flush_interval_ms: 50,
            queue_buffer_size: 10,
            circuit_breaker_threshold: threshold,
            circuit_breaker_timeout_secs: 60,
            health_check_interval_secs: 30,
            request_timeout_ms: 500,
            default_fee_bps: 500,
            fallback_fee_bps: 500,
            log_level: "error".into(),
        }
    }

    fn request() -> PaymentRequest {
        PaymentRequest {
            correlation_id: Uuid::new_v4(),
            amount_cents: 1000,
        }
    }

    #[tokio::test]
    async fn forward_returns_none_when_both_unreachable() {
        let client = ProcessorClient::new(&unroutable_config(5)).unwrap();
        assert!(client.forward(&request()).await.is_none());

        let snap = client.stats(ProcessorKind::Default);
        assert_eq!(snap.failure_count, 1);
        assert_eq!(client.stats(ProcessorKind::Fallback).failure_count, 1);
    }

    #[tokio::test]
    async fn breaker_opens_after_threshold_and_short_circuits() {
        let client = ProcessorClient::new(&unroutable_config(2)).unwrap();
        client.forward(&request()).await;
        client.forward(&request()).await;
        assert_eq!(
            client.breaker_state(ProcessorKind::Default),
            BreakerState::Open
        );
        assert_eq!(
            client.breaker_state(ProcessorKind::Fallback),
            BreakerState::Open
        );

        // Third call is gated: no new failures are recorded.
        client.forward(&request()).await;
        assert_eq!(client.stats(ProcessorKind::Default).failure_count, 2);
    }

    #[tokio::test]
    async fn health_probe_reports_unreachable() {
        let client = ProcessorClient::new(&unroutable_config(5)).unwrap();
        assert!(!client.probe_health(ProcessorKind::Default).await);
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let mut cfg = unroutable_config(5);
        cfg.default_processor_url = "http://127.0.0.1:1/".into();
        let client = ProcessorClient::new(&cfg).unwrap();
        assert_eq!(
            client.endpoint(ProcessorKind::Default).base_url,
            "http://127.0.0.1:1"
        );
    }
}
