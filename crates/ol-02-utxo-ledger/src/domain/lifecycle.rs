//! # Type-State Transaction Lifecycle
//!
//! Each state of a transaction being applied is a distinct type. Transitions
//! consume `self`, so a transaction cannot reach the filter without passing
//! the double-spend check and a successful store application first.
//!
//! ## State Machine
//!
//! ```text
//! [Proposed] ──check──→ [DoubleSpendChecked] ──store ok──→ [StoreApplied] ──commit──→ [FilterCommitted]
//!      │                        │
//!      └──────── reject ────────┴────────────────────────────────────────────→ [Rejected]
//! ```
//!
//! `Rejected` and `FilterCommitted` are terminal and are represented by
//! `ApplyOutcome` rather than by a further type.

use ol_01_spent_filter::BloomFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::marker::PhantomData;

use super::entities::{checked_sum, Transaction, TxId};

// =============================================================================
// STATE MARKERS (Zero-Sized Types)
// =============================================================================

/// Marker: built, nothing checked yet.
#[derive(Debug, Clone, Copy)]
pub struct Proposed;

/// Marker: structure, conservation and filter checks passed.
#[derive(Debug, Clone, Copy)]
pub struct DoubleSpendChecked;

/// Marker: the store accepted the transaction.
#[derive(Debug, Clone, Copy)]
pub struct StoreApplied;

/// Observable lifecycle state, for logging and outcome reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    Proposed,
    DoubleSpendChecked,
    Rejected,
    StoreApplied,
    FilterCommitted,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Rejected | TransactionState::FilterCommitted
        )
    }
}

/// Why a transaction was not applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// An input identifier is (possibly) in the spent filter
    DoubleSpendDetected { input: String },
    /// The authoritative store says an input is missing, spent or not the sender's
    InputUnavailable { input: String, detail: String },
    /// Outputs are worth more than inputs
    ValueNotConserved { inputs: u64, outputs: u64 },
    /// Empty inputs/outputs, zero amounts, repeated inputs or overflow
    Malformed(String),
    /// Every store attempt failed
    StoreFailed { attempts: u32, last_error: String },
    /// The counterparty refused the transfer
    PeerRejected,
}

/// Terminal result of applying one transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Committed {
        tx_id: TxId,
        inputs_committed: usize,
    },
    Rejected {
        tx_id: TxId,
        reason: RejectReason,
    },
}

impl ApplyOutcome {
    pub fn rejected(tx_id: &str, reason: RejectReason) -> Self {
        ApplyOutcome::Rejected {
            tx_id: tx_id.to_string(),
            reason,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, ApplyOutcome::Committed { .. })
    }

    pub fn state(&self) -> TransactionState {
        match self {
            ApplyOutcome::Committed { .. } => TransactionState::FilterCommitted,
            ApplyOutcome::Rejected { .. } => TransactionState::Rejected,
        }
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            ApplyOutcome::Rejected { reason, .. } => Some(reason),
            ApplyOutcome::Committed { .. } => None,
        }
    }

    pub fn tx_id(&self) -> &str {
        match self {
            ApplyOutcome::Committed { tx_id, .. } | ApplyOutcome::Rejected { tx_id, .. } => tx_id,
        }
    }
}

// =============================================================================
// TYPE-STATE TRANSACTION
// =============================================================================

/// A transaction moving through the apply pipeline
#[derive(Debug)]
pub struct PendingTx<S> {
    tx: Transaction,
    _state: PhantomData<S>,
}

impl<S> PendingTx<S> {
    /// The wrapped transaction
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    fn transition<T>(self) -> PendingTx<T> {
        PendingTx {
            tx: self.tx,
            _state: PhantomData,
        }
    }
}

impl PendingTx<Proposed> {
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            _state: PhantomData,
        }
    }

    pub fn state(&self) -> TransactionState {
        TransactionState::Proposed
    }

    /// Structural and conservation checks, then the filter lookup
    ///
    /// The filter check is advisory: a hit rejects, a miss only means the
    /// inputs were not seen spent by anyone this peer has synced with.
    pub fn check_double_spend(
        self,
        filter: &BloomFilter,
    ) -> Result<PendingTx<DoubleSpendChecked>, RejectReason> {
        self.check_double_spend_with(|id| filter.contains(id.as_bytes()))
    }

    /// Same as `check_double_spend`, with `seen` answering each lookup
    ///
    /// Inputs are looked up in order, stopping at the first hit.
    pub fn check_double_spend_with(
        self,
        seen: impl FnMut(&str) -> bool,
    ) -> Result<PendingTx<DoubleSpendChecked>, RejectReason> {
        validate_structure(&self.tx)?;

        if let Some(input) = first_seen_input(&self.tx, seen) {
            return Err(RejectReason::DoubleSpendDetected { input });
        }

        Ok(self.transition())
    }
}

impl PendingTx<DoubleSpendChecked> {
    pub fn state(&self) -> TransactionState {
        TransactionState::DoubleSpendChecked
    }

    /// Run the store mutation; only success advances the state
    pub fn apply<E>(
        self,
        op: impl FnOnce(&Transaction) -> Result<(), E>,
    ) -> Result<PendingTx<StoreApplied>, E> {
        op(&self.tx)?;
        Ok(self.transition())
    }
}

impl PendingTx<StoreApplied> {
    pub fn state(&self) -> TransactionState {
        TransactionState::StoreApplied
    }

    /// Record every input identifier in the filter
    pub fn commit(self, filter: &mut BloomFilter) -> ApplyOutcome {
        for input in &self.tx.inputs {
            filter.add(input.identifier().as_bytes());
        }
        ApplyOutcome::Committed {
            inputs_committed: self.tx.inputs.len(),
            tx_id: self.tx.id,
        }
    }
}

/// First input whose identifier `seen` reports as spent
pub fn first_seen_input(tx: &Transaction, mut seen: impl FnMut(&str) -> bool) -> Option<String> {
    tx.inputs
        .iter()
        .map(|input| input.identifier())
        .find(|id| seen(id))
}

/// Reject malformed transactions and enforce `sum(outputs) <= sum(inputs)`
pub fn validate_structure(tx: &Transaction) -> Result<(), RejectReason> {
    if tx.inputs.is_empty() {
        return Err(RejectReason::Malformed("no inputs".into()));
    }
    if tx.outputs.is_empty() {
        return Err(RejectReason::Malformed("no outputs".into()));
    }

    let mut seen = HashSet::with_capacity(tx.inputs.len());
    for input in &tx.inputs {
        if !seen.insert(input.id()) {
            return Err(RejectReason::Malformed(format!(
                "input {} appears twice",
                input.identifier()
            )));
        }
    }

    for (index, output) in tx.outputs.iter().enumerate() {
        if output.amount == 0 {
            return Err(RejectReason::Malformed(format!("output {} has zero amount", index)));
        }
        if output.origin_tx_id != tx.id || output.output_index != index as u32 {
            return Err(RejectReason::Malformed(format!(
                "output {} is keyed {} instead of {}:{}",
                index,
                output.identifier(),
                tx.id,
                index
            )));
        }
    }

    let inputs = checked_sum(tx.inputs.iter().map(|u| u.amount))
        .map_err(|_| RejectReason::Malformed("input sum overflows".into()))?;
    let outputs = checked_sum(tx.outputs.iter().map(|u| u.amount))
        .map_err(|_| RejectReason::Malformed("output sum overflows".into()))?;
    if outputs > inputs {
        return Err(RejectReason::ValueNotConserved { inputs, outputs });
    }

    Ok(())
}
