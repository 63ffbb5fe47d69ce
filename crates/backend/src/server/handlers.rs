//! Axum request handlers for all service endpoints.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{debug, warn};

use common::protocol::{AcceptedResponse, ErrorResponse, HealthResponse, PaymentRequest};
use common::ServiceError;

use crate::ledger::SummaryWindow;
use crate::processor::ProcessorKind;
use super::state::AppState;

/// `POST /payments` — accept a payment for asynchronous processing.
///
/// The payment is recorded as pending and queued before the `200` is sent;
/// settlement happens later in the batch worker.
pub async fn create_payment(State(state): State<AppState>, body: Bytes) -> Response {
    // Parse the raw body by hand so malformed JSON gets a 400 with the
    // standard error shape instead of axum's plain-text rejection.
    let request: PaymentRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return error_response(&ServiceError::BadRequest(e.to_string())),
    };

    state.metrics.record_submitted();
    let displaced = state.ledger.record_pending(&request);

    let correlation_id = request.correlation_id;
    if let Err(e) = state.queue.enqueue(request) {
        // The payment was never queued; put the ledger back the way it was.
        state.ledger.rollback_pending(&correlation_id, displaced);
        warn!(%correlation_id, error = %e, "payment rejected");
        return error_response(&e);
    }

    debug!(%correlation_id, "payment accepted");
    (StatusCode::OK, Json(AcceptedResponse::accepted())).into_response()
}

/// Query parameters for `GET /payments-summary`.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Window start, RFC 3339.
    pub de: Option<String>,
    /// Window end, RFC 3339.
    pub ate: Option<String>,
}

/// `GET /payments-summary` — aggregate the ledger over an optional window.
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let window = match SummaryWindow::parse(query.de.as_deref(), query.ate.as_deref()) {
        Ok(w) => w,
        Err(e) => return error_response(&ServiceError::BadRequest(e.to_string())),
    };

    Json(state.ledger.summary(&window)).into_response()
}

/// `GET /metrics` — operational counters and per-processor health.
pub async fn get_metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let processors: serde_json::Map<String, serde_json::Value> = ProcessorKind::ALL
        .into_iter()
        .map(|kind| {
            let snap = state.client.stats(kind);
            let body = serde_json::json!({
                "healthy": snap.is_healthy(),
                "circuit_breaker": state.client.breaker_state(kind).as_str(),
                "success_count": snap.success_count,
                "failure_count": snap.failure_count,
                "success_rate": snap.success_rate(),
                "latency_avg_ms": snap.latency_avg_ms,
            });
            (kind.to_string(), body)
        })
        .collect();

    Json(serde_json::json!({
        "submitted": state.metrics.submitted(),
        "processed": state.metrics.processed(),
        "failed": state.metrics.failed(),
        "success_rate": state.metrics.success_rate(),
        "queue_depth": state.queue.depth(),
        "ledger": {
            "count": state.ledger.len(),
            "total_amount_cents": state.ledger.total_amount_cents(),
            "total_fee_cents": state.ledger.total_fee_cents(),
        },
        "processors": processors,
    }))
}

/// `GET /health` — liveness check.
///
/// Always `200` while the process serves traffic; upstream health is
/// reported via `/metrics`, not here, so a processor outage never makes the
/// load balancer eject this instance.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        queue_depth: state.queue.depth(),
        queue_capacity: state.queue.capacity(),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> impl IntoResponse {
    let err = ErrorResponse::new(
        "method_not_allowed",
        "the requested method is not supported on this route",
    );
    (StatusCode::METHOD_NOT_ALLOWED, Json(err))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
