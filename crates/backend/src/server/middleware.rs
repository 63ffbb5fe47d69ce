//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, and response compression.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
///
/// Generous relative to the upstream call timeout so a slow processor shows
/// up as a failed payment, not a severed client connection.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
