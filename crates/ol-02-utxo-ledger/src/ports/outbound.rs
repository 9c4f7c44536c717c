//! Outbound Ports (Driven Ports)
//!
//! Dependencies the ledger needs from its collaborators: a durable UTXO
//! store, a transport to the counterparty, and the local identity.

use async_trait::async_trait;

use crate::domain::{PublicKey, Transaction, Utxo};
use crate::error::{StoreError, TransportError};

/// UTXO persistence contract (Driven Port)
///
/// Keys are `(origin_tx_id, output_index)`. Spent outputs stay queryable so
/// the spent filter can always be rebuilt from durable state.
pub trait LedgerStore: Send + Sync {
    /// Look up one output, spent or not
    fn get_utxo(&self, origin_tx_id: &str, output_index: u32) -> Result<Option<Utxo>, StoreError>;

    /// Unspent outputs held by `owner`, in store order
    fn get_utxos_by_owner(&self, owner: &[u8]) -> Result<Vec<Utxo>, StoreError>;

    /// Every output created by `origin_tx_id`, ordered by output index
    fn get_utxos_by_origin_tx(&self, origin_tx_id: &str) -> Result<Vec<Utxo>, StoreError>;

    /// `originTxId:outputIndex` of every output marked spent
    fn get_spent_utxo_identifiers(&self) -> Result<Vec<String>, StoreError>;

    /// Insert a new output; `DuplicateKey` if the key exists
    fn add_utxo(&self, utxo: Utxo) -> Result<(), StoreError>;

    /// Mark an output spent
    ///
    /// `NotFound` if absent, a no-op if already spent by `spending_tx_id`,
    /// `AlreadySpent` if spent by any other transaction.
    fn mark_spent(
        &self,
        origin_tx_id: &str,
        output_index: u32,
        spending_tx_id: &str,
    ) -> Result<(), StoreError>;

    /// Atomically mark every input spent and insert every output
    ///
    /// All-or-nothing. Re-applying an already applied transaction is a
    /// no-op, so the call is safe to retry.
    fn apply_transaction(&self, tx: &Transaction) -> Result<(), StoreError>;

    /// Atomically record a counterparty's transaction
    ///
    /// Unlike `apply_transaction`, inputs need not exist locally: unknown
    /// inputs are inserted as already spent by `tx`, known ones are marked.
    /// Outputs are inserted as usual.
    fn import_transaction(&self, tx: &Transaction) -> Result<(), StoreError>;
}

/// Messages exchanged with a counterparty during a transfer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerMessage {
    /// Serialized spent filter
    Filter(Vec<u8>),
    /// Serialized transaction
    Transaction(Vec<u8>),
    /// Receiver's verdict on a transaction
    Ack { tx_id: String, accepted: bool },
    /// Either side abandoning the exchange
    Cancel { reason: String },
}

impl PeerMessage {
    /// Short name for error reporting
    pub fn kind(&self) -> &'static str {
        match self {
            PeerMessage::Filter(_) => "filter",
            PeerMessage::Transaction(_) => "transaction",
            PeerMessage::Ack { .. } => "ack",
            PeerMessage::Cancel { .. } => "cancel",
        }
    }
}

/// Byte transport between two peers (Driven Port)
///
/// Near-field, network or anything else; only ordered delivery of whole
/// messages is assumed.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send(&self, message: PeerMessage) -> Result<(), TransportError>;

    async fn recv(&self) -> Result<PeerMessage, TransportError>;
}

/// Supplier of the local public key (Driven Port)
pub trait IdentityProvider: Send + Sync {
    fn public_key(&self) -> PublicKey;
}
