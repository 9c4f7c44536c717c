//! Error types for the UTXO ledger
//!
//! Business outcomes (double spend, rejected transactions) are not errors;
//! they are reported through `ApplyOutcome`.

use ol_01_spent_filter::FilterError;
use thiserror::Error;

use crate::domain::entities::{TxId, UtxoId};

/// Errors raised by a `LedgerStore` implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("UTXO already exists: {0}")]
    DuplicateKey(UtxoId),

    #[error("UTXO not found: {0}")]
    NotFound(UtxoId),

    #[error("UTXO {utxo} already spent in {spent_in}")]
    AlreadySpent { utxo: UtxoId, spent_in: TxId },

    #[error("Duplicate input in transaction: {0}")]
    DuplicateInput(UtxoId),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the ledger service
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from a peer transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Peer channel closed")]
    Closed,

    #[error("Timed out waiting for peer")]
    Timeout,

    #[error("Unexpected message: expected {expected}, got {got}")]
    UnexpectedMessage { expected: &'static str, got: &'static str },
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
