//! Domain Layer - Ledger business rules
//!
//! This layer contains:
//! - UTXO and transaction entities
//! - Type-state apply lifecycle and outcomes
//! - Bounded retry policy
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod entities;
pub mod lifecycle;
pub mod retry;

pub use config::{LedgerConfig, LedgerConfigBuilder};
pub use entities::{
    checked_sum, genesis_origin_id, generate_tx_id, PublicKey, Transaction, TxId, Utxo, UtxoId,
    GENESIS_PREFIX, GENESIS_SENDER,
};
pub use lifecycle::{
    ApplyOutcome, DoubleSpendChecked, PendingTx, Proposed, RejectReason, StoreApplied,
    TransactionState,
};
pub use retry::{RetryError, RetryPolicy, Retryable};
