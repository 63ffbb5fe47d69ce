//! Upstream payment-processor integration.
//!
//! # Responsibilities
//! - Forward payments to the default / fallback processors over HTTP.
//! - Gate every attempt through a per-processor circuit breaker.
//! - Keep rolling per-processor stats for `/metrics` and the health monitor.
//! - Probe processor health on a background interval.

pub mod breaker;
pub mod client;
pub mod monitor;
pub mod stats;

pub use client::ProcessorClient;

use std::fmt;

/// Identity of an upstream processor.
///
/// `Default` is cheaper and always tried first; `Fallback` only sees traffic
/// when the default is gated or failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorKind {
    Default,
    Fallback,
}

impl ProcessorKind {
    /// Both processors, in attempt order.
    pub const ALL: [ProcessorKind; 2] = [ProcessorKind::Default, ProcessorKind::Fallback];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorKind::Default => "default",
            ProcessorKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
