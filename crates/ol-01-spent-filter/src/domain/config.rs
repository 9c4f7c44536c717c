//! Spent-filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use ol_01_spent_filter::FilterConfigBuilder;
//!
//! let config = FilterConfigBuilder::new()
//!     .capacity(50_000)
//!     .target_fpr(0.001)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::{calculate_optimal_parameters, BloomFilterParams};
use crate::error::FilterError;

/// Filter configuration shared by every peer that exchanges filters
///
/// Peers can only merge filters built from the same configuration, since
/// `capacity` and `target_fpr` fix the bit-array size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Expected number of spent identifiers before saturation
    pub capacity: usize,
    /// Target false positive rate at `capacity`
    pub target_fpr: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            target_fpr: 0.001,
        }
    }
}

impl FilterConfig {
    /// Create a new configuration with validation
    pub fn new(capacity: usize, target_fpr: f64) -> Result<Self, FilterError> {
        let config = Self {
            capacity,
            target_fpr,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FilterError> {
        self.parameters().map(|_| ())
    }

    /// Derived filter parameters (m, k)
    pub fn parameters(&self) -> Result<BloomFilterParams, FilterError> {
        calculate_optimal_parameters(self.capacity, self.target_fpr)
    }

    /// Builder-style method to set capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style method to set target FPR
    pub fn with_target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = fpr;
        self
    }
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    capacity: Option<usize>,
    target_fpr: Option<f64>,
}

impl FilterConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set expected number of spent identifiers
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set target false positive rate (exclusive range 0..1)
    pub fn target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = Some(fpr);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let defaults = FilterConfig::default();

        let config = FilterConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            target_fpr: self.target_fpr.unwrap_or(defaults.target_fpr),
        };

        config.validate()?;
        Ok(config)
    }
}
