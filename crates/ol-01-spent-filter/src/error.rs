//! Error types for the spent-output filter

use thiserror::Error;

/// Errors that can occur while building, querying or exchanging filters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Bit index out of range: {index} >= {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid capacity: {0} (must be greater than 0)")]
    InvalidCapacity(usize),

    #[error("Invalid false positive rate: {fpr} (must be between 0 and 1, exclusive)")]
    InvalidFPR { fpr: f64 },

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Filter size mismatch: local {local_bits} bits / k={local_hashes}, peer {peer_bits} bits / k={peer_hashes}")]
    SizeMismatch {
        local_bits: usize,
        local_hashes: usize,
        peer_bits: usize,
        peer_hashes: usize,
    },

    #[error("Malformed filter payload: {0}")]
    MalformedFilter(String),
}
