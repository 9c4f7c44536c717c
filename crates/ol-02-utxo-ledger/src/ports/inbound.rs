//! Inbound Ports (Driving Ports)
//!
//! The API that wallets and transport handlers use to drive the ledger.

use ol_01_spent_filter::BloomFilter;

use crate::domain::{ApplyOutcome, Transaction, Utxo};
use crate::error::LedgerError;

/// Inputs picked by first-fit selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoinSelection {
    /// Selected unspent outputs, in store order
    pub inputs: Vec<Utxo>,
    /// Sum of the selected amounts, at least the requested target
    pub selected_sum: u64,
}

/// Primary ledger API (Driving Port)
pub trait LedgerApi {
    /// Sum of unspent amounts held by `owner`
    fn get_balance(&self, owner: &[u8]) -> Result<u64, LedgerError>;

    /// First-fit selection over the local identity's unspent outputs
    fn select_inputs(&self, target_amount: u64) -> Result<CoinSelection, LedgerError>;

    /// Build a transfer of `amount` to `recipient`, with change back to self
    fn build_transaction(
        &self,
        recipient: &[u8],
        amount: u64,
        selection: CoinSelection,
    ) -> Result<Transaction, LedgerError>;

    /// Whether any input is (possibly) already in the spent filter
    fn check_double_spend(&self, inputs: &[Utxo]) -> bool;

    /// Check, store and commit a transaction, reporting the terminal state
    fn submit(&mut self, tx: &Transaction) -> ApplyOutcome;

    /// `submit` reduced to committed / not committed
    fn apply_transaction(&mut self, tx: &Transaction) -> bool {
        self.submit(tx).is_committed()
    }

    /// Union a peer's serialized filter into the local one
    fn merge_filter(&mut self, peer_filter_bytes: &[u8]) -> Result<(), LedgerError>;

    /// One-time bootstrap of `owner`'s initial balance
    fn mint_genesis(&mut self, owner: &[u8]) -> bool;

    /// Fresh filter built only from the store's spent identifiers
    fn rebuild_filter(&self) -> Result<BloomFilter, LedgerError>;
}
