//! Counters for ledger operations
//!
//! `LedgerService` reports through a [`MetricsRecorder`]; [`LedgerMetrics`]
//! is the in-process implementation and [`NoOpMetrics`] the default.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use ol_02_utxo_ledger::metrics::LedgerMetrics;
//!
//! let metrics = Arc::new(LedgerMetrics::new());
//! let service = LedgerService::new(store, &identity, config)?
//!     .with_metrics(metrics.clone());
//!
//! // ... submit transactions ...
//! println!("{:?}", metrics.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::RejectReason;

/// Thread-safe counters for one ledger
#[derive(Default)]
pub struct LedgerMetrics {
    /// Transactions that reached the filter
    pub transactions_committed: AtomicU64,
    /// Input identifiers added to the filter by commits
    pub inputs_committed: AtomicU64,
    /// Rejected by a filter hit
    pub rejected_double_spend: AtomicU64,
    /// Rejected by the authoritative store check
    pub rejected_input_unavailable: AtomicU64,
    /// Rejected as malformed or not value conserving
    pub rejected_invalid: AtomicU64,
    /// Rejected after the store gave up
    pub rejected_store_failed: AtomicU64,
    /// Store attempts beyond the first
    pub store_retries: AtomicU64,
    /// Peer filters merged
    pub filters_merged: AtomicU64,
    /// Filter lookups performed
    pub lookups_performed: AtomicU64,
    /// Filter lookups that hit
    pub lookups_positive: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
}

impl LedgerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_committed(&self, inputs: usize) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
        self.inputs_committed
            .fetch_add(inputs as u64, Ordering::Relaxed);
    }

    pub fn record_rejected(&self, reason: &RejectReason) {
        let counter = match reason {
            RejectReason::DoubleSpendDetected { .. } => &self.rejected_double_spend,
            RejectReason::InputUnavailable { .. } => &self.rejected_input_unavailable,
            RejectReason::ValueNotConserved { .. } | RejectReason::Malformed(_) => {
                &self.rejected_invalid
            }
            RejectReason::StoreFailed { .. } => &self.rejected_store_failed,
            // Decided by the counterparty, not by this ledger
            RejectReason::PeerRejected => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// `attempts` is the total number of store calls made, successful or not
    pub fn record_store_attempts(&self, attempts: u32) {
        let retries = attempts.saturating_sub(1) as u64;
        self.store_retries.fetch_add(retries, Ordering::Relaxed);
    }

    pub fn record_merge(&self) {
        self.filters_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
            inputs_committed: self.inputs_committed.load(Ordering::Relaxed),
            rejected_double_spend: self.rejected_double_spend.load(Ordering::Relaxed),
            rejected_input_unavailable: self.rejected_input_unavailable.load(Ordering::Relaxed),
            rejected_invalid: self.rejected_invalid.load(Ordering::Relaxed),
            rejected_store_failed: self.rejected_store_failed.load(Ordering::Relaxed),
            store_retries: self.store_retries.load(Ordering::Relaxed),
            filters_merged: self.filters_merged.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            avg_lookup_ns: self.avg_lookup_time_ns(),
        }
    }

    pub fn avg_lookup_time_ns(&self) -> u64 {
        let total = self.lookup_time_ns.load(Ordering::Relaxed);
        let count = self.lookups_performed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Share of lookups that hit, true and false positives alike
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.transactions_committed,
            &self.inputs_committed,
            &self.rejected_double_spend,
            &self.rejected_input_unavailable,
            &self.rejected_invalid,
            &self.rejected_store_failed,
            &self.store_retries,
            &self.filters_merged,
            &self.lookups_performed,
            &self.lookups_positive,
            &self.lookup_time_ns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub transactions_committed: u64,
    pub inputs_committed: u64,
    pub rejected_double_spend: u64,
    pub rejected_input_unavailable: u64,
    pub rejected_invalid: u64,
    pub rejected_store_failed: u64,
    pub store_retries: u64,
    pub filters_merged: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub avg_lookup_ns: u64,
}

impl MetricsSnapshot {
    pub fn total_rejected(&self) -> u64 {
        self.rejected_double_spend
            + self.rejected_input_unavailable
            + self.rejected_invalid
            + self.rejected_store_failed
    }
}

/// Sink for ledger events
///
/// Implement this to forward into an external metrics system.
pub trait MetricsRecorder: Send + Sync {
    fn record_committed(&self, inputs: usize);

    fn record_rejected(&self, reason: &RejectReason);

    fn record_store_attempts(&self, attempts: u32);

    fn record_merge(&self);

    fn record_lookup(&self, duration: Duration, found: bool);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_committed(&self, _: usize) {}
    fn record_rejected(&self, _: &RejectReason) {}
    fn record_store_attempts(&self, _: u32) {}
    fn record_merge(&self) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
}

impl MetricsRecorder for LedgerMetrics {
    fn record_committed(&self, inputs: usize) {
        LedgerMetrics::record_committed(self, inputs);
    }

    fn record_rejected(&self, reason: &RejectReason) {
        LedgerMetrics::record_rejected(self, reason);
    }

    fn record_store_attempts(&self, attempts: u32) {
        LedgerMetrics::record_store_attempts(self, attempts);
    }

    fn record_merge(&self) {
        LedgerMetrics::record_merge(self);
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        LedgerMetrics::record_lookup(self, duration, found);
    }
}
