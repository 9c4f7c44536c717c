//! Ledger Service
//!
//! Orchestrates the spent filter, the store and the apply lifecycle for one
//! local identity.

use ol_01_spent_filter::{BloomFilter, FilterConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{
    checked_sum, generate_tx_id, genesis_origin_id, ApplyOutcome, LedgerConfig, PendingTx,
    PublicKey, RejectReason, RetryError, Transaction, Utxo, GENESIS_SENDER,
};
use crate::error::{LedgerError, LedgerResult, StoreError};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{CoinSelection, IdentityProvider, LedgerApi, LedgerStore};

/// How the store records a transaction that passed the filter check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ApplyMode {
    /// Spend local outputs; every input must exist here
    Local,
    /// Record a counterparty's transaction; inputs may be foreign
    Import,
}

/// Ledger Service implementation
///
/// Implements the `LedgerApi` port over an injected `LedgerStore`. The
/// spent filter is owned here and rebuilt from the store on construction.
pub struct LedgerService<S: LedgerStore> {
    /// UTXO store (driven port)
    store: Arc<S>,
    /// Local identity
    public_key: PublicKey,
    /// Spent-identifier cache, merged with peers
    filter: BloomFilter,
    config: LedgerConfig,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Create a service for `identity`, rebuilding the filter from `store`
    pub fn new(
        store: Arc<S>,
        identity: &dyn IdentityProvider,
        config: LedgerConfig,
    ) -> LedgerResult<Self> {
        config.validate()?;
        let filter = build_filter(store.as_ref(), &config.filter)?;

        debug!(
            filter_bits = filter.size_bits(),
            hash_count = filter.hash_count(),
            bits_set = filter.bits_set(),
            "Ledger service initialized"
        );

        Ok(Self {
            store,
            public_key: identity.public_key(),
            filter,
            config,
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Report into `metrics` instead of discarding
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Current spent filter
    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record a transaction received from a counterparty
    ///
    /// The transaction must name this identity as recipient and pay it
    /// through output 0. Its inputs are checked
    /// against the (merged) filter and then recorded as spent history in
    /// the local store, together with the outputs.
    pub fn accept_transaction(&mut self, tx: &Transaction) -> ApplyOutcome {
        debug!(tx_id = %tx.id, inputs = tx.inputs.len(), "Accepting peer transaction");

        if tx.recipient != self.public_key {
            return self.reject(
                &tx.id,
                RejectReason::Malformed("transaction pays another identity".into()),
            );
        }
        if tx.outputs.first().map(|o| &o.owner) != Some(&self.public_key) {
            return self.reject(
                &tx.id,
                RejectReason::Malformed("first output does not pay recipient".into()),
            );
        }
        if let Some(input) = tx.inputs.iter().find(|u| u.owner != tx.sender) {
            return self.reject(
                &tx.id,
                RejectReason::InputUnavailable {
                    input: input.identifier(),
                    detail: "not owned by sender".into(),
                },
            );
        }

        self.process(tx, ApplyMode::Import)
    }

    /// Filter check, store application under retry, filter commit
    fn process(&mut self, tx: &Transaction, mode: ApplyMode) -> ApplyOutcome {
        let checked = PendingTx::new(tx.clone()).check_double_spend_with(|id| self.lookup(id));
        let checked = match checked {
            Ok(checked) => checked,
            Err(reason) => return self.reject(&tx.id, reason),
        };

        if mode == ApplyMode::Local {
            if let Err(reason) = self.verify_inputs(tx) {
                return self.reject(&tx.id, reason);
            }
        }

        let store = Arc::clone(&self.store);
        let policy = self.config.retry.clone();
        let mut attempts = 0;
        let applied = checked.apply(|tx| {
            policy.run(|attempt| {
                attempts = attempt;
                debug!(tx_id = %tx.id, attempt, "Applying transaction to store");
                match mode {
                    ApplyMode::Local => store.apply_transaction(tx),
                    ApplyMode::Import => store.import_transaction(tx),
                }
            })
        });
        self.metrics.record_store_attempts(attempts);

        let applied = match applied {
            Ok(applied) => applied,
            Err(err) => return self.reject(&tx.id, store_failure(err)),
        };

        let outcome = applied.commit(&mut self.filter);
        self.metrics.record_committed(tx.inputs.len());
        info!(
            tx_id = %tx.id,
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            attempts,
            bits_set = self.filter.bits_set(),
            "Transaction committed"
        );
        outcome
    }

    /// Authoritative double-spend check against the store
    ///
    /// Every input must exist, be unspent, be owned by the sender and carry
    /// the amount the store holds for it.
    fn verify_inputs(&self, tx: &Transaction) -> Result<(), RejectReason> {
        for input in &tx.inputs {
            let unavailable = |detail: String| RejectReason::InputUnavailable {
                input: input.identifier(),
                detail,
            };

            let stored = self
                .store
                .get_utxo(&input.origin_tx_id, input.output_index)
                .map_err(|e| RejectReason::StoreFailed {
                    attempts: 1,
                    last_error: e.to_string(),
                })?
                .ok_or_else(|| unavailable("not found".into()))?;

            if let Some(spender) = &stored.spent_in_tx_id {
                return Err(unavailable(format!("already spent in {}", spender)));
            }
            if stored.owner != tx.sender {
                return Err(unavailable("not owned by sender".into()));
            }
            if stored.amount != input.amount {
                return Err(unavailable(format!(
                    "amount {} does not match stored {}",
                    input.amount, stored.amount
                )));
            }
        }
        Ok(())
    }

    /// One timed filter lookup
    fn lookup(&self, id: &str) -> bool {
        let start = Instant::now();
        let found = self.filter.contains(id.as_bytes());
        self.metrics.record_lookup(start.elapsed(), found);
        found
    }

    fn reject(&self, tx_id: &str, reason: RejectReason) -> ApplyOutcome {
        warn!(tx_id, reason = ?reason, "Transaction rejected");
        self.metrics.record_rejected(&reason);
        ApplyOutcome::rejected(tx_id, reason)
    }
}

impl<S: LedgerStore> LedgerApi for LedgerService<S> {
    fn get_balance(&self, owner: &[u8]) -> Result<u64, LedgerError> {
        let utxos = self.store.get_utxos_by_owner(owner)?;
        checked_sum(utxos.iter().map(|u| u.amount))
    }

    fn select_inputs(&self, target_amount: u64) -> Result<CoinSelection, LedgerError> {
        if target_amount == 0 {
            return Err(LedgerError::InvalidAmount("target amount must be positive".into()));
        }

        let utxos = self.store.get_utxos_by_owner(&self.public_key)?;
        let available = checked_sum(utxos.iter().map(|u| u.amount))?;
        if available < target_amount {
            return Err(LedgerError::InsufficientFunds {
                required: target_amount,
                available,
            });
        }

        let mut inputs = Vec::new();
        let mut selected_sum = 0u64;
        for utxo in utxos {
            if selected_sum >= target_amount {
                break;
            }
            // Cannot overflow: bounded by `available`
            selected_sum += utxo.amount;
            inputs.push(utxo);
        }

        debug!(
            target = target_amount,
            selected = inputs.len(),
            selected_sum,
            "Inputs selected"
        );
        Ok(CoinSelection {
            inputs,
            selected_sum,
        })
    }

    fn build_transaction(
        &self,
        recipient: &[u8],
        amount: u64,
        selection: CoinSelection,
    ) -> Result<Transaction, LedgerError> {
        let balance = self.get_balance(&self.public_key)?;
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: balance,
            });
        }
        build_transfer(&self.public_key, recipient, amount, selection.inputs)
    }

    fn check_double_spend(&self, inputs: &[Utxo]) -> bool {
        inputs.iter().any(|input| self.lookup(&input.identifier()))
    }

    fn submit(&mut self, tx: &Transaction) -> ApplyOutcome {
        debug!(tx_id = %tx.id, inputs = tx.inputs.len(), "Submitting transaction");
        self.process(tx, ApplyMode::Local)
    }

    fn merge_filter(&mut self, peer_filter_bytes: &[u8]) -> Result<(), LedgerError> {
        let peer = BloomFilter::from_bytes(peer_filter_bytes)?;
        self.filter.merge(&peer)?;
        self.metrics.record_merge();

        info!(
            filter_bits = self.filter.size_bits(),
            bits_set = self.filter.bits_set(),
            "Peer filter merged"
        );
        Ok(())
    }

    fn mint_genesis(&mut self, owner: &[u8]) -> bool {
        let genesis = Utxo::new(
            genesis_origin_id(owner),
            0,
            self.config.genesis_amount,
            GENESIS_SENDER.to_vec(),
        );

        match self.store.add_utxo(genesis.clone()) {
            Ok(()) => {}
            // An earlier mint may have stopped between insert and transfer
            Err(StoreError::DuplicateKey(_)) => {
                match self.store.get_utxo(&genesis.origin_tx_id, 0) {
                    Ok(Some(existing)) if !existing.is_spent() => {}
                    Ok(_) => {
                        debug!(origin = %genesis.origin_tx_id, "Genesis already minted");
                        return false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Genesis lookup failed");
                        return false;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Genesis insert failed");
                return false;
            }
        }

        let amount = genesis.amount;
        let tx = match build_transfer(GENESIS_SENDER, owner, amount, vec![genesis]) {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %e, "Genesis transaction could not be built");
                return false;
            }
        };

        let committed = self.submit(&tx).is_committed();
        if committed {
            info!(tx_id = %tx.id, amount, "Genesis minted");
        }
        committed
    }

    fn rebuild_filter(&self) -> Result<BloomFilter, LedgerError> {
        build_filter(self.store.as_ref(), &self.config.filter)
    }
}

/// Fresh filter holding every spent identifier in `store`
fn build_filter<S: LedgerStore + ?Sized>(
    store: &S,
    config: &FilterConfig,
) -> LedgerResult<BloomFilter> {
    let mut filter = BloomFilter::from_config(config)?;
    filter.extend(store.get_spent_utxo_identifiers()?);
    Ok(filter)
}

/// Output 0 pays `recipient`, output 1 returns change to `sender` if any
fn build_transfer(
    sender: &[u8],
    recipient: &[u8],
    amount: u64,
    inputs: Vec<Utxo>,
) -> LedgerResult<Transaction> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount("amount must be positive".into()));
    }

    let selected_sum = checked_sum(inputs.iter().map(|u| u.amount))?;
    if selected_sum < amount {
        return Err(LedgerError::InsufficientFunds {
            required: amount,
            available: selected_sum,
        });
    }

    let id = generate_tx_id(&inputs);
    let change = selected_sum - amount;

    let mut outputs = vec![Utxo::new(id.clone(), 0, amount, recipient.to_vec())];
    if change > 0 {
        outputs.push(Utxo::new(id.clone(), 1, change, sender.to_vec()));
    }

    Ok(Transaction {
        id,
        sender: sender.to_vec(),
        recipient: recipient.to_vec(),
        inputs,
        outputs,
    })
}

fn store_failure(err: RetryError<StoreError>) -> RejectReason {
    match err {
        RetryError::Aborted {
            error: StoreError::AlreadySpent { utxo, spent_in },
            ..
        } => RejectReason::InputUnavailable {
            input: utxo.identifier(),
            detail: format!("already spent in {}", spent_in),
        },
        err => RejectReason::StoreFailed {
            attempts: err.attempts(),
            last_error: err.last_error().to_string(),
        },
    }
}
