//! # OL-02 UTXO Ledger
//!
//! Offline e-cash ledger: each identity holds unspent transaction outputs in
//! a local store and detects double spends through a spent-output filter
//! that peers exchange and merge whenever they transact.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure business logic, no I/O
//!   - `Utxo`, `Transaction`: ledger entities and canonical identifiers
//!   - `PendingTx`: type-state apply lifecycle, `ApplyOutcome`
//!   - `RetryPolicy`: bounded retry for store mutations
//!   - `LedgerConfig` / `LedgerConfigBuilder`: validated configuration
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `LedgerApi`: Driving port (inbound API)
//!   - `LedgerStore`, `PeerTransport`, `IdentityProvider`: Driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `LedgerService`: Implements `LedgerApi`
//!   - `send_payment` / `receive_payment`: two-party exchange
//!
//! - **Adapters Layer** (`adapters/`): Port implementations
//!   - `InMemoryLedgerStore`: `RwLock`-guarded store
//!   - `ChannelTransport`: tokio channel pair
//!   - `StaticIdentity`: fixed public key
//!
//! ## Invariants
//!
//! - The store is the source of truth; the filter is a rebuildable cache
//! - An input reaches the filter only after the store applied its transaction
//! - A failed store application changes neither the store nor the filter
//! - `sum(outputs) <= sum(inputs)` for every applied transaction
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ol_02_utxo_ledger::{
//!     InMemoryLedgerStore, LedgerApi, LedgerConfig, LedgerService, StaticIdentity,
//! };
//!
//! let identity = StaticIdentity::new(b"alice-pk".to_vec());
//! let store = Arc::new(InMemoryLedgerStore::new());
//! let mut ledger = LedgerService::new(store, &identity, LedgerConfig::default())?;
//!
//! ledger.mint_genesis(b"alice-pk");
//! let selection = ledger.select_inputs(100)?;
//! let tx = ledger.build_transaction(b"bob-pk", 100, selection)?;
//! assert!(ledger.apply_transaction(&tx));
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{ChannelTransport, InMemoryLedgerStore, StaticIdentity};
pub use domain::{
    ApplyOutcome, LedgerConfig, LedgerConfigBuilder, PendingTx, PublicKey, RejectReason,
    RetryError, RetryPolicy, Transaction, TransactionState, TxId, Utxo, UtxoId, GENESIS_SENDER,
};
pub use error::{LedgerError, LedgerResult, StoreError, TransportError};
pub use metrics::{LedgerMetrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{
    CoinSelection, IdentityProvider, LedgerApi, LedgerStore, PeerMessage, PeerTransport,
};
pub use service::{receive_payment, send_payment, LedgerService};

// Filter crate types used in this crate's public API
pub use ol_01_spent_filter::{BloomFilter, FilterConfig, FilterError};
