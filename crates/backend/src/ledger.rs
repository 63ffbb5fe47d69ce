//! In-memory payment ledger.
//!
//! Every submitted payment gets a record here before it is acknowledged; the
//! batch worker later flips the record to its terminal state. Backed by a
//! [`DashMap`] keyed by correlation id so handler reads and worker writes
//! never contend on a single lock.
//!
//! Resubmitting a correlation id overwrites the previous record — dedup is
//! the caller's problem, per the competition rules.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use common::protocol::{PaymentRequest, SummaryResponse};

use crate::processor::ProcessorKind;

/// Terminal (or pending) state of one payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Queued, not yet attempted upstream.
    Pending,
    /// A processor accepted the payment.
    Processed {
        processor: ProcessorKind,
        fee_cents: u64,
        processed_at: DateTime<Utc>,
    },
    /// Both processors rejected or failed the payment.
    Failed { failed_at: DateTime<Utc> },
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub correlation_id: Uuid,
    pub amount_cents: u64,
    pub outcome: Outcome,
}

/// Errors from parsing a summary window.
#[derive(Debug, Error)]
pub enum WindowError {
    /// A bound was present but not an RFC 3339 timestamp.
    #[error("invalid timestamp for `{param}`: {value}")]
    InvalidBound { param: &'static str, value: String },
}

/// Half-open-optional time window over processing timestamps.
///
/// Both bounds are inclusive; either may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SummaryWindow {
    /// Parse the `de` / `ate` query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidBound`] if a present bound is not
    /// RFC 3339.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, WindowError> {
        Ok(Self {
            from: parse_bound(from, "de")?,
            to: parse_bound(to, "ate")?,
        })
    }

    fn contains(&self, t: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| t >= from) && self.to.map_or(true, |to| t <= to)
    }
}

fn parse_bound(
    value: Option<&str>,
    param: &'static str,
) -> Result<Option<DateTime<Utc>>, WindowError> {
    match value {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| WindowError::InvalidBound {
                param,
                value: raw.to_owned(),
            }),
    }
}

/// Concurrent ledger of all payments seen by this instance.
#[derive(Debug, Default)]
pub struct PaymentLedger {
    records: DashMap<Uuid, PaymentRecord>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly accepted payment as pending.
    ///
    /// Returns the record this insert displaced, if the correlation id was
    /// already present; callers that fail to enqueue afterwards hand it back
    /// to [`PaymentLedger::rollback_pending`].
    pub fn record_pending(&self, request: &PaymentRequest) -> Option<PaymentRecord> {
        self.records.insert(
            request.correlation_id,
            PaymentRecord {
                correlation_id: request.correlation_id,
                amount_cents: request.amount_cents,
                outcome: Outcome::Pending,
            },
        )
    }

    /// Mark a payment as processed by `processor`.
    pub fn record_processed(
        &self,
        correlation_id: Uuid,
        amount_cents: u64,
        processor: ProcessorKind,
        fee_cents: u64,
        processed_at: DateTime<Utc>,
    ) {
        self.records.insert(
            correlation_id,
            PaymentRecord {
                correlation_id,
                amount_cents,
                outcome: Outcome::Processed {
                    processor,
                    fee_cents,
                    processed_at,
                },
            },
        );
    }

    /// Mark a payment as failed on both processors.
    pub fn record_failed(&self, correlation_id: Uuid, amount_cents: u64, failed_at: DateTime<Utc>) {
        self.records.insert(
            correlation_id,
            PaymentRecord {
                correlation_id,
                amount_cents,
                outcome: Outcome::Failed { failed_at },
            },
        );
    }

    /// Undo a pending insert after a failed enqueue.
    ///
    /// Restores the record the pending insert displaced, if any; otherwise
    /// removes the entry, but only while it is still pending, so a terminal
    /// record written by a concurrent resubmission is never erased.
    pub fn rollback_pending(&self, correlation_id: &Uuid, displaced: Option<PaymentRecord>) {
        match displaced {
            Some(previous) => {
                self.records.insert(*correlation_id, previous);
            }
            None => {
                self.records
                    .remove_if(correlation_id, |_, r| r.outcome == Outcome::Pending);
            }
        }
    }

    /// Point lookup by correlation id.
    pub fn get(&self, correlation_id: &Uuid) -> Option<PaymentRecord> {
        self.records.get(correlation_id).map(|r| r.clone())
    }

    /// Total number of records, including pending ones.
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate the ledger over `window`.
    ///
    /// `count` spans the whole ledger; amounts, fees, and the
    /// processed/failed counts only include terminal records whose timestamp
    /// falls inside the window.
    pub fn summary(&self, window: &SummaryWindow) -> SummaryResponse {
        let mut out = SummaryResponse::default();

        for record in self.records.iter() {
            out.count += 1;
            match &record.outcome {
                Outcome::Pending => {}
                Outcome::Processed {
                    fee_cents,
                    processed_at,
                    ..
                } => {
                    if window.contains(*processed_at) {
                        out.total_amount_cents += record.amount_cents;
                        out.total_fee_cents += fee_cents;
                        out.count_processed += 1;
                    }
                }
                Outcome::Failed { failed_at } => {
                    if window.contains(*failed_at) {
                        out.count_failed += 1;
                    }
                }
            }
        }

        out
    }

    /// Sum of all recorded amounts, pending included.
    pub fn total_amount_cents(&self) -> u64 {
        self.records.iter().map(|r| r.amount_cents).sum()
    }

    /// Sum of fees over processed records.
    pub fn total_fee_cents(&self) -> u64 {
        self.records
            .iter()
            .filter_map(|r| match &r.outcome {
                Outcome::Processed { fee_cents, .. } => Some(*fee_cents),
                _ => None,
            })
            .sum()
    }
}
