//! Ledger service configuration
//!
//! # Example
//!
//! ```ignore
//! use ol_02_utxo_ledger::LedgerConfigBuilder;
//!
//! let config = LedgerConfigBuilder::new()
//!     .filter_capacity(50_000)
//!     .target_fpr(0.001)
//!     .genesis_amount(10_000)
//!     .max_store_attempts(3)
//!     .build()?;
//! ```

use ol_01_spent_filter::FilterConfig;
use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;
use crate::error::LedgerError;

/// Configuration for one `LedgerService` instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Spent-filter sizing; must match every peer this ledger syncs with
    pub filter: FilterConfig,
    /// Value minted by `mint_genesis`
    pub genesis_amount: u64,
    /// Retry policy for store mutations
    pub retry: RetryPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            genesis_amount: 10_000,
            retry: RetryPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), LedgerError> {
        self.filter.validate()?;

        if self.genesis_amount == 0 {
            return Err(LedgerError::Config("genesis_amount cannot be 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(LedgerError::Config("retry.max_attempts cannot be 0".into()));
        }

        Ok(())
    }

    /// Builder-style method to set the filter section
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Builder-style method to set the genesis amount
    pub fn with_genesis_amount(mut self, amount: u64) -> Self {
        self.genesis_amount = amount;
        self
    }

    /// Builder-style method to set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Builder for LedgerConfig with validation
#[derive(Default)]
pub struct LedgerConfigBuilder {
    filter_capacity: Option<usize>,
    target_fpr: Option<f64>,
    genesis_amount: Option<u64>,
    max_store_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
}

impl LedgerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expected spent identifiers before the filter saturates
    pub fn filter_capacity(mut self, capacity: usize) -> Self {
        self.filter_capacity = Some(capacity);
        self
    }

    /// Target false positive rate at capacity
    pub fn target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = Some(fpr);
        self
    }

    pub fn genesis_amount(mut self, amount: u64) -> Self {
        self.genesis_amount = Some(amount);
        self
    }

    /// Attempt ceiling for store mutations
    pub fn max_store_attempts(mut self, attempts: u32) -> Self {
        self.max_store_attempts = Some(attempts);
        self
    }

    pub fn retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = Some(delay_ms);
        self
    }

    /// Build the LedgerConfig, validating all parameters
    pub fn build(self) -> Result<LedgerConfig, LedgerError> {
        let defaults = LedgerConfig::default();

        let config = LedgerConfig {
            filter: FilterConfig {
                capacity: self.filter_capacity.unwrap_or(defaults.filter.capacity),
                target_fpr: self.target_fpr.unwrap_or(defaults.filter.target_fpr),
            },
            genesis_amount: self.genesis_amount.unwrap_or(defaults.genesis_amount),
            retry: RetryPolicy {
                max_attempts: self
                    .max_store_attempts
                    .unwrap_or(defaults.retry.max_attempts),
                base_delay_ms: self.retry_delay_ms.unwrap_or(defaults.retry.base_delay_ms),
            },
        };

        config.validate()?;
        Ok(config)
    }
}
