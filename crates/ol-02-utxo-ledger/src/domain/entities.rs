//! Ledger entities: UTXOs and transactions
//!
//! Both are plain value types. A UTXO changes exactly once, from unspent to
//! spent, and that change is made by the store, never in place here.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

use crate::error::LedgerError;

/// Raw public-key bytes of an identity
pub type PublicKey = Vec<u8>;

/// Hex-encoded transaction identifier (or a genesis marker)
pub type TxId = String;

/// Sender used for genesis mints; no real key ever equals it
pub const GENESIS_SENDER: &[u8] = b"GENESIS";

/// Prefix of the origin id of every genesis UTXO
pub const GENESIS_PREFIX: &str = "GENESIS-";

/// Primary key of a UTXO: `(originTxId, outputIndex)`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    /// Transaction that created the output
    pub origin_tx_id: TxId,
    /// Position in that transaction's output list
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(origin_tx_id: impl Into<TxId>, output_index: u32) -> Self {
        Self {
            origin_tx_id: origin_tx_id.into(),
            output_index,
        }
    }

    /// Canonical `originTxId:outputIndex` string, the filter key
    pub fn identifier(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin_tx_id, self.output_index)
    }
}

/// An unspent (or historically spent) transaction output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction that created this output
    pub origin_tx_id: TxId,
    /// Index within the creating transaction's outputs
    pub output_index: u32,
    /// Value in minor currency units
    pub amount: u64,
    /// Public key of the current holder
    pub owner: PublicKey,
    /// Transaction that consumed this output, if any
    pub spent_in_tx_id: Option<TxId>,
}

impl Utxo {
    /// Create an unspent output
    pub fn new(
        origin_tx_id: impl Into<TxId>,
        output_index: u32,
        amount: u64,
        owner: impl Into<PublicKey>,
    ) -> Self {
        Self {
            origin_tx_id: origin_tx_id.into(),
            output_index,
            amount,
            owner: owner.into(),
            spent_in_tx_id: None,
        }
    }

    /// Primary key of this output
    pub fn id(&self) -> UtxoId {
        UtxoId::new(self.origin_tx_id.clone(), self.output_index)
    }

    /// Canonical `originTxId:outputIndex` string
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.origin_tx_id, self.output_index)
    }

    pub fn is_spent(&self) -> bool {
        self.spent_in_tx_id.is_some()
    }

    /// Copy of this output marked as consumed by `tx_id`
    pub fn spent_by(&self, tx_id: &str) -> Utxo {
        Utxo {
            spent_in_tx_id: Some(tx_id.to_string()),
            ..self.clone()
        }
    }
}

/// A fully formed transfer proposal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TxId,
    /// Public key of the party giving up the inputs
    pub sender: PublicKey,
    /// Public key of the party receiving output 0
    pub recipient: PublicKey,
    /// Outputs being consumed, in selection order
    pub inputs: Vec<Utxo>,
    /// Outputs being created: recipient first, then optional change
    pub outputs: Vec<Utxo>,
}

impl Transaction {
    /// Checked sum of input amounts
    pub fn input_sum(&self) -> Result<u64, LedgerError> {
        checked_sum(self.inputs.iter().map(|u| u.amount))
    }

    /// Checked sum of output amounts
    pub fn output_sum(&self) -> Result<u64, LedgerError> {
        checked_sum(self.outputs.iter().map(|u| u.amount))
    }

    /// Canonical identifiers of every input
    pub fn input_identifiers(&self) -> Vec<String> {
        self.inputs.iter().map(Utxo::identifier).collect()
    }

    /// Whether this is a genesis mint
    pub fn is_genesis(&self) -> bool {
        self.sender == GENESIS_SENDER
    }

    /// Serialize for transmission to a peer
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Deserialize a transaction received from a peer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}

/// Sum amounts, failing on overflow
pub fn checked_sum(amounts: impl IntoIterator<Item = u64>) -> Result<u64, LedgerError> {
    amounts
        .into_iter()
        .try_fold(0u64, |acc, amount| acc.checked_add(amount))
        .ok_or(LedgerError::Overflow)
}

/// Derive a fresh transaction id
///
/// SHA-256 over a random UUID followed by every input identifier, so two
/// builders spending the same inputs still get distinct ids.
pub fn generate_tx_id(inputs: &[Utxo]) -> TxId {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    for input in inputs {
        hasher.update(input.identifier().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Origin id of the genesis UTXO minted for `owner`
pub fn genesis_origin_id(owner: &[u8]) -> TxId {
    let digest = Sha256::digest(owner);
    format!("{}{}", GENESIS_PREFIX, hex::encode(digest))
}
