//! In-memory UTXO store
//!
//! Suitable for tests and single-process peers. Nothing survives a restart.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::domain::{Transaction, Utxo, UtxoId};
use crate::error::StoreError;
use crate::ports::LedgerStore;

/// In-memory `LedgerStore`
///
/// Rows are kept in insertion order, which is the "store order" seen by
/// coin selection. Every mutating call validates first and writes second
/// under one write guard, so a failed call changes nothing.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    rows: Vec<Utxo>,
    index: HashMap<UtxoId, usize>,
}

enum InputAction {
    Mark(usize),
    Insert(Utxo),
    Nothing,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, spent or not
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StoreState {
    fn get(&self, id: &UtxoId) -> Option<&Utxo> {
        self.index.get(id).map(|&row| &self.rows[row])
    }

    fn insert(&mut self, utxo: Utxo) {
        self.index.insert(utxo.id(), self.rows.len());
        self.rows.push(utxo);
    }

    /// Validate the inputs of `tx`, returning what to do with each
    ///
    /// With `allow_missing`, unknown inputs become spent history rows
    /// instead of `NotFound`.
    fn plan_inputs(
        &self,
        tx: &Transaction,
        allow_missing: bool,
    ) -> Result<Vec<InputAction>, StoreError> {
        let mut seen = HashSet::with_capacity(tx.inputs.len());
        let mut actions = Vec::with_capacity(tx.inputs.len());

        for input in &tx.inputs {
            let id = input.id();
            if !seen.insert(id.clone()) {
                return Err(StoreError::DuplicateInput(id));
            }

            let action = match self.index.get(&id) {
                Some(&row) => match &self.rows[row].spent_in_tx_id {
                    None => InputAction::Mark(row),
                    Some(spender) if *spender == tx.id => InputAction::Nothing,
                    Some(spender) => {
                        return Err(StoreError::AlreadySpent {
                            utxo: id,
                            spent_in: spender.clone(),
                        })
                    }
                },
                None if allow_missing => InputAction::Insert(input.spent_by(&tx.id)),
                None => return Err(StoreError::NotFound(id)),
            };
            actions.push(action);
        }

        Ok(actions)
    }

    /// Validate the outputs of `tx`, returning the ones still to insert
    ///
    /// An output already present with the same owner and amount was written
    /// by an earlier application of the same transaction and is skipped.
    fn plan_outputs(&self, tx: &Transaction) -> Result<Vec<Utxo>, StoreError> {
        let mut seen = HashSet::with_capacity(tx.outputs.len());
        let mut inserts = Vec::with_capacity(tx.outputs.len());

        for output in &tx.outputs {
            let id = output.id();
            if !seen.insert(id.clone()) {
                return Err(StoreError::DuplicateKey(id));
            }

            match self.get(&id) {
                None => inserts.push(Utxo {
                    spent_in_tx_id: None,
                    ..output.clone()
                }),
                Some(existing)
                    if existing.owner == output.owner && existing.amount == output.amount => {}
                Some(_) => return Err(StoreError::DuplicateKey(id)),
            }
        }

        Ok(inserts)
    }

    fn write(&mut self, tx: &Transaction, inputs: Vec<InputAction>, outputs: Vec<Utxo>) {
        for action in inputs {
            match action {
                InputAction::Mark(row) => self.rows[row].spent_in_tx_id = Some(tx.id.clone()),
                InputAction::Insert(utxo) => self.insert(utxo),
                InputAction::Nothing => {}
            }
        }
        for output in outputs {
            self.insert(output);
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn get_utxo(&self, origin_tx_id: &str, output_index: u32) -> Result<Option<Utxo>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.get(&UtxoId::new(origin_tx_id, output_index)).cloned())
    }

    fn get_utxos_by_owner(&self, owner: &[u8]) -> Result<Vec<Utxo>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state
            .rows
            .iter()
            .filter(|u| !u.is_spent() && u.owner == owner)
            .cloned()
            .collect())
    }

    fn get_utxos_by_origin_tx(&self, origin_tx_id: &str) -> Result<Vec<Utxo>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut utxos: Vec<Utxo> = state
            .rows
            .iter()
            .filter(|u| u.origin_tx_id == origin_tx_id)
            .cloned()
            .collect();
        utxos.sort_by_key(|u| u.output_index);
        Ok(utxos)
    }

    fn get_spent_utxo_identifiers(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state
            .rows
            .iter()
            .filter(|u| u.is_spent())
            .map(Utxo::identifier)
            .collect())
    }

    fn add_utxo(&self, utxo: Utxo) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = utxo.id();
        if state.index.contains_key(&id) {
            return Err(StoreError::DuplicateKey(id));
        }
        state.insert(utxo);
        Ok(())
    }

    fn mark_spent(
        &self,
        origin_tx_id: &str,
        output_index: u32,
        spending_tx_id: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = UtxoId::new(origin_tx_id, output_index);
        let row = *state
            .index
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        match &state.rows[row].spent_in_tx_id {
            None => {
                state.rows[row].spent_in_tx_id = Some(spending_tx_id.to_string());
                Ok(())
            }
            Some(spender) if spender == spending_tx_id => Ok(()),
            Some(spender) => Err(StoreError::AlreadySpent {
                utxo: id,
                spent_in: spender.clone(),
            }),
        }
    }

    fn apply_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let inputs = state.plan_inputs(tx, false)?;
        let outputs = state.plan_outputs(tx)?;
        state.write(tx, inputs, outputs);
        Ok(())
    }

    fn import_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let inputs = state.plan_inputs(tx, true)?;
        let outputs = state.plan_outputs(tx)?;
        state.write(tx, inputs, outputs);
        Ok(())
    }
}
