//! Request and response types exchanged over the public HTTP API and with the
//! upstream payment processors.
//!
//! All amounts are integer cents. Field names follow the competition wire
//! format: camelCase for `correlationId` / `requestedAt`, and the summary
//! window query parameters are `de` / `ate`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ServiceError;

// ---------------------------------------------------------------------------
// Payments endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Caller-supplied id used to correlate the payment end to end.
    #[serde(rename = "correlationId")]
    pub correlation_id: Uuid,

    /// Payment amount in integer cents.
    #[serde(rename = "amount")]
    pub amount_cents: u64,
}

/// Successful response body for `POST /payments`.
///
/// The payment is acknowledged before it reaches an upstream processor; the
/// body only confirms it was recorded and queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    /// Always `"accepted"`.
    pub status: String,
    /// Human-readable confirmation.
    pub message: String,
}

impl AcceptedResponse {
    /// The standard acknowledgement body.
    pub fn accepted() -> Self {
        Self {
            status: "accepted".into(),
            message: "Payment submitted for processing".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary endpoint
// ---------------------------------------------------------------------------

/// Response body for `GET /payments-summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Sum of amounts over processed payments inside the window.
    pub total_amount_cents: u64,
    /// Sum of fees charged by the processors inside the window.
    pub total_fee_cents: u64,
    /// Every payment ever recorded, including still-pending ones.
    pub count: u64,
    /// Payments a processor accepted, inside the window.
    pub count_processed: u64,
    /// Payments both processors rejected, inside the window.
    pub count_failed: u64,
}

// ---------------------------------------------------------------------------
// Upstream processor wire format
// ---------------------------------------------------------------------------

/// Body sent to `POST {processor}/payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorPayload {
    #[serde(rename = "correlationId")]
    pub correlation_id: Uuid,

    #[serde(rename = "amount")]
    pub amount_cents: u64,

    /// Submission time in epoch milliseconds.
    #[serde(rename = "requestedAt")]
    pub requested_at_ms: u64,
}

impl ProcessorPayload {
    /// Build a payload for `request`, stamped with the current time.
    pub fn for_request(request: &PaymentRequest) -> Self {
        Self {
            correlation_id: request.correlation_id,
            amount_cents: request.amount_cents,
            requested_at_ms: Utc::now().timestamp_millis() as u64,
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"queue_full"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` while the process is serving.
    pub status: String,
    /// Payments currently waiting in the processing queue.
    pub queue_depth: usize,
    /// Configured queue capacity.
    pub queue_capacity: usize,
}
