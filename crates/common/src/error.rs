//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::QueueFull`] → 503
/// - [`ServiceError::Upstream`] → 502
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed — invalid JSON, bad correlation id, or an
    /// unparseable summary window bound.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The processing queue is at capacity and cannot accept more payments.
    #[error("payment queue is full")]
    QueueFull,

    /// Both upstream payment processors refused or failed the request.
    #[error("upstream processors unavailable: {0}")]
    Upstream(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::QueueFull => 503,
            ServiceError::Upstream(_) => 502,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::QueueFull => "queue_full",
            ServiceError::Upstream(_) => "upstream_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::QueueFull.http_status(), 503);
        assert_eq!(ServiceError::Upstream("x".into()).http_status(), 502);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("amount must be positive".into());
        assert!(e.to_string().contains("amount must be positive"));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ServiceError::QueueFull.code(), "queue_full");
        assert_eq!(ServiceError::BadRequest("x".into()).code(), "bad_request");
    }
}
