//! `rinha-backend-2025` — backend binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build shared state: ledger, metrics, processor client.
//! 4. Spawn the batch worker on the bounded payment queue.
//! 5. Spawn the background processor health monitor.
//! 6. Build the Axum router and start the server on the configured port.

mod config;
mod ledger;
mod metrics;
mod money;
mod processor;
mod queue;
mod server;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use config::Config;
use ledger::PaymentLedger;
use metrics::ServiceMetrics;
use processor::{monitor::HealthMonitor, ProcessorClient};
use queue::{BatchWorker, PaymentQueue};
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "rinha-backend-2025 starting"
    );

    // -----------------------------------------------------------------------
    // 3. Shared state
    // -----------------------------------------------------------------------
    let ledger = Arc::new(PaymentLedger::new());
    let metrics = Arc::new(ServiceMetrics::new());
    let client = Arc::new(ProcessorClient::new(&cfg)?);

    // -----------------------------------------------------------------------
    // 4. Payment queue and batch worker
    // -----------------------------------------------------------------------
    let (payment_queue, receiver) = PaymentQueue::bounded(cfg.queue_buffer_size);
    let worker = BatchWorker::new(
        Arc::clone(&client),
        Arc::clone(&ledger),
        Arc::clone(&metrics),
        cfg.batch_size,
        Duration::from_millis(cfg.batch_flush_interval_ms),
    );
    tokio::spawn(worker.run(receiver));

    // -----------------------------------------------------------------------
    // 5. Processor health monitor
    // -----------------------------------------------------------------------
    let monitor = HealthMonitor::new(
        Arc::clone(&client),
        Duration::from_secs(cfg.health_check_interval_secs),
    );
    monitor.spawn();

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(ledger, client, metrics, payment_queue);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
