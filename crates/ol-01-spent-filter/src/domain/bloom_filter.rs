//! Core Bloom filter implementation
//!
//! INVARIANTS:
//! - No false negatives: once added, `contains()` MUST return true
//! - Monotone: neither `add` nor `merge` ever clears a bit
//! - `merge` is commutative, associative and idempotent (bitwise OR)

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bit_vector::BitVector;
use super::config::FilterConfig;
use super::hash_functions::compute_hash_positions;
use super::parameters::{calculate_fpr, calculate_optimal_parameters};
use crate::error::FilterError;

/// Bloom filter for probabilistic membership testing
///
/// Parameters (`m`, `k`) are derived once at construction and never change.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter {
    /// Bit array storing the filter state (m bits)
    bits: BitVector,
    /// Number of hash functions (k)
    k: usize,
    /// Capacity the filter was sized for (n)
    capacity: usize,
    /// False positive rate targeted at `capacity`
    target_fpr: f64,
}

/// Wire form of a filter exchanged between peers
#[derive(Serialize, Deserialize)]
struct FilterEnvelope {
    size_bits: u64,
    hash_count: u32,
    capacity: u64,
    target_fpr: f64,
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Create an empty filter sized for `capacity` items at `target_fpr`
    pub fn create(capacity: usize, target_fpr: f64) -> Result<Self, FilterError> {
        let params = calculate_optimal_parameters(capacity, target_fpr)?;
        Ok(Self {
            bits: BitVector::new(params.size_bits),
            k: params.hash_count,
            capacity,
            target_fpr,
        })
    }

    /// Create an empty filter from a validated configuration
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        Self::create(config.capacity, config.target_fpr)
    }

    /// Add an item to the filter
    ///
    /// After insertion, `contains(item)` is guaranteed to return true.
    pub fn add(&mut self, item: &[u8]) {
        let m = self.bits.len();
        for pos in compute_hash_positions(item, self.k, m) {
            self.bits.set_in_range(pos);
        }
    }

    /// Add every item of an iterator
    pub fn extend<I, T>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        for item in items {
            self.add(item.as_ref());
        }
    }

    /// Test if an item might be in the filter
    ///
    /// Returns:
    /// - `true` if the item might be in the set (could be false positive)
    /// - `false` if the item is definitely NOT in the set
    pub fn contains(&self, item: &[u8]) -> bool {
        let m = self.bits.len();
        compute_hash_positions(item, self.k, m).all(|pos| self.bits.test_in_range(pos))
    }

    /// Whether `other` can be merged into this filter
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.bits.len() == other.bits.len() && self.k == other.k
    }

    /// Merge another filter into this one (OR operation)
    ///
    /// After merge, this filter matches every item either filter matched.
    /// Filters with a different `m` or `k` are rejected with `SizeMismatch`
    /// and this filter is left untouched.
    pub fn merge(&mut self, other: &BloomFilter) -> Result<(), FilterError> {
        if !self.is_compatible(other) {
            return Err(FilterError::SizeMismatch {
                local_bits: self.bits.len(),
                local_hashes: self.k,
                peer_bits: other.bits.len(),
                peer_hashes: other.k,
            });
        }

        let before = self.bits.count_ones();
        self.bits.union_with(&other.bits)?;
        debug!(
            bits_before = before,
            bits_after = self.bits.count_ones(),
            "Merged peer filter"
        );
        Ok(())
    }

    /// Serialize the filter for transmission to a peer
    pub fn to_bytes(&self) -> Vec<u8> {
        let envelope = FilterEnvelope {
            size_bits: self.bits.len() as u64,
            hash_count: self.k as u32,
            capacity: self.capacity as u64,
            target_fpr: self.target_fpr,
            bits: self.bits.to_bytes(),
        };
        bincode::serialize(&envelope).unwrap_or_default()
    }

    /// Deserialize a filter received from a peer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FilterError> {
        let envelope: FilterEnvelope = bincode::deserialize(bytes)
            .map_err(|e| FilterError::MalformedFilter(e.to_string()))?;

        if envelope.size_bits == 0 || envelope.hash_count == 0 {
            return Err(FilterError::MalformedFilter(format!(
                "degenerate parameters m={} k={}",
                envelope.size_bits, envelope.hash_count
            )));
        }
        let size_bits = usize::try_from(envelope.size_bits)
            .map_err(|e| FilterError::MalformedFilter(e.to_string()))?;
        let capacity = usize::try_from(envelope.capacity)
            .map_err(|e| FilterError::MalformedFilter(e.to_string()))?;

        Ok(Self {
            bits: BitVector::from_bytes(&envelope.bits, size_bits)?,
            k: envelope.hash_count as usize,
            capacity,
            target_fpr: envelope.target_fpr,
        })
    }

    /// Raw bit array, exposed for inspection and equivalence checks
    pub fn bits(&self) -> &BitVector {
        &self.bits
    }

    /// Get the filter size in bits (m)
    pub fn size_bits(&self) -> usize {
        self.bits.len()
    }

    /// Get the number of hash functions (k)
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Capacity the filter was sized for
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// False positive rate targeted at capacity
    pub fn target_fpr(&self) -> f64 {
        self.target_fpr
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Estimated current false positive rate from the fill ratio
    ///
    /// Works after merges too, where the insertion count is unknown.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let fill = self.bits_set() as f64 / self.size_bits() as f64;
        fill.powi(self.k as i32)
    }

    /// Expected false positive rate after `n` distinct insertions
    pub fn expected_false_positive_rate(&self, n: usize) -> f64 {
        calculate_fpr(self.size_bits(), n, self.k)
    }
}
