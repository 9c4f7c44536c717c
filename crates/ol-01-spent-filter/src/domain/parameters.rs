//! Optimal Bloom filter parameter calculation
//!
//! Formulas:
//! - m = ceil(n * ln(p) / ln(1 / 2^ln(2)))  -- bits, equivalently -n*ln(p) / ln(2)^2
//! - k = round(ln(2) * m / n)               -- hash functions
//! - FPR = (1 - e^(-kn/m))^k                -- expected rate after n insertions

use std::f64::consts::LN_2;

use crate::error::FilterError;

/// Bloom filter parameters
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilterParams {
    /// Number of bits in the filter (m)
    pub size_bits: usize,
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Expected false positive rate once `capacity` items are inserted
    pub expected_fpr: f64,
}

/// Calculate optimal parameters for `capacity` items at `target_fpr`
///
/// Fails when `capacity` is zero or `target_fpr` is outside (0, 1).
pub fn calculate_optimal_parameters(
    capacity: usize,
    target_fpr: f64,
) -> Result<BloomFilterParams, FilterError> {
    if capacity == 0 {
        return Err(FilterError::InvalidCapacity(capacity));
    }
    if !(target_fpr > 0.0 && target_fpr < 1.0) {
        return Err(FilterError::InvalidFPR { fpr: target_fpr });
    }

    let n = capacity as f64;

    // ln(1 / 2^ln2) == -(ln2)^2
    let denominator = (1.0 / 2f64.powf(LN_2)).ln();
    let m = (n * target_fpr.ln() / denominator).ceil();
    if !m.is_finite() || m > usize::MAX as f64 {
        return Err(FilterError::InvalidParameters(format!(
            "filter size overflows for capacity {} at fpr {}",
            capacity, target_fpr
        )));
    }
    let m = (m as usize).max(1);

    let k = ((LN_2 * m as f64 / n).round() as usize).max(1);

    Ok(BloomFilterParams {
        size_bits: m,
        hash_count: k,
        expected_fpr: calculate_fpr(m, capacity, k),
    })
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
