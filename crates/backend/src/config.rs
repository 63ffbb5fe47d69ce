//! Configuration loading and validation for the backend service.
//!
//! All values are read from environment variables at startup. Every key has a
//! competition-ready default, but the process still exits with a clear error
//! message if a provided value cannot be parsed or fails validation.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated backend service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Token forwarded to the upstream processors in `X-Rinha-Token`.
    #[serde(default = "default_token")]
    pub token: String,

    /// Base URL of the default (cheaper) payment processor.
    #[serde(default = "default_processor_url")]
    pub default_processor_url: String,

    /// Base URL of the fallback payment processor.
    #[serde(default = "fallback_processor_url")]
    pub fallback_processor_url: String,

    /// Maximum number of payments forwarded per worker batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How often (milliseconds) a partial batch is flushed.
    #[serde(default = "default_batch_flush_interval_ms")]
    pub batch_flush_interval_ms: u64,

    /// Capacity of the bounded queue between the HTTP handler and the worker.
    #[serde(default = "default_queue_buffer_size")]
    pub queue_buffer_size: usize,

    /// Consecutive upstream failures before a circuit breaker opens.
    #[serde(default = "default_circuit_breaker_threshold")]
    pub circuit_breaker_threshold: u32,

    /// Seconds an open breaker waits before allowing a half-open probe.
    #[serde(default = "default_circuit_breaker_timeout_secs")]
    pub circuit_breaker_timeout_secs: u64,

    /// Interval (seconds) between background health probes of the processors.
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,

    /// Per-request timeout (milliseconds) for upstream payment calls.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Fee charged by the default processor, in basis points of the amount.
    #[serde(default = "default_fee_bps")]
    pub default_fee_bps: u32,

    /// Fee charged by the fallback processor, in basis points of the amount.
    #[serde(default = "default_fee_bps")]
    pub fallback_fee_bps: u32,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    9999
}
fn default_token() -> String {
    "123".into()
}
fn default_processor_url() -> String {
    "http://payment-processor-default:8080".into()
}
fn fallback_processor_url() -> String {
    "http://payment-processor-fallback:8080".into()
}
fn default_batch_size() -> usize {
    50
}
fn default_batch_flush_interval_ms() -> u64 {
    100
}
fn default_queue_buffer_size() -> usize {
    1000
}
fn default_circuit_breaker_threshold() -> u32 {
    5
}
fn default_circuit_breaker_timeout_secs() -> u64 {
    30
}
fn default_health_check_interval_secs() -> u64 {
    30
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_fee_bps() -> u32 {
    500
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any provided variable cannot be parsed or fails
    /// validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.token, "TOKEN")?;
        ensure_non_empty(&self.default_processor_url, "DEFAULT_PROCESSOR_URL")?;
        ensure_non_empty(&self.fallback_processor_url, "FALLBACK_PROCESSOR_URL")?;

        if self.batch_size == 0 {
            anyhow::bail!("BATCH_SIZE must be > 0");
        }
        if self.batch_flush_interval_ms == 0 {
            anyhow::bail!("BATCH_FLUSH_INTERVAL_MS must be > 0");
        }
        if self.queue_buffer_size == 0 {
            anyhow::bail!("QUEUE_BUFFER_SIZE must be > 0");
        }
        if self.circuit_breaker_threshold == 0 {
            anyhow::bail!("CIRCUIT_BREAKER_THRESHOLD must be > 0");
        }
        if self.circuit_breaker_timeout_secs == 0 {
            anyhow::bail!("CIRCUIT_BREAKER_TIMEOUT_SECS must be > 0");
        }
        if self.request_timeout_ms == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_MS must be > 0");
        }
        if self.default_fee_bps > 10_000 || self.fallback_fee_bps > 10_000 {
            anyhow::bail!("fee basis points must not exceed 10000 (100%)");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            port: default_port(),
            token: default_token(),
            default_processor_url: default_processor_url(),
            fallback_processor_url: fallback_processor_url(),
            batch_size: default_batch_size(),
            batch_flush_interval_ms: default_batch_flush_interval_ms(),
            queue_buffer_size: default_queue_buffer_size(),
            circuit_breaker_threshold: default_circuit_breaker_threshold(),
            circuit_breaker_timeout_secs: default_circuit_breaker_timeout_secs(),
            health_check_interval_secs: default_health_check_interval_secs(),
            request_timeout_ms: default_request_timeout_ms(),
            default_fee_bps: default_fee_bps(),
            fallback_fee_bps: default_fee_bps(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_port(), 9999);
        assert_eq!(default_batch_size(), 50);
        assert_eq!(default_queue_buffer_size(), 1000);
        assert_eq!(default_circuit_breaker_threshold(), 5);
        assert_eq!(default_circuit_breaker_timeout_secs(), 30);
        assert_eq!(default_fee_bps(), 500);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn valid_defaults_pass_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_processor_url() {
        let cfg = Config {
            default_processor_url: "  ".into(),
            ..base_config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let cfg = Config {
            batch_size: 0,
            ..base_config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_fee_above_full_amount() {
        let cfg = Config {
            fallback_fee_bps: 10_001,
            ..base_config()
        };
        assert!(cfg.validate().is_err());
    }
}
