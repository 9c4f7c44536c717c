//! # OL-01 Spent Filter
//!
//! Probabilistic set of spent-output identifiers, exchanged between peers
//! that cannot reach a shared chain at spend time.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `BitVector`: Fixed-size bit array with checked access
//!   - `BloomFilter`: Probabilistic set over a `BitVector`
//!   - `FilterConfig`: Capacity and target false positive rate
//!
//! ## Invariants
//!
//! - **No false negatives**: if added, `contains()` MUST return true
//! - **Monotone**: `add` and `merge` never clear bits
//! - **Merge is a join**: commutative, associative, idempotent
//!
//! ## Usage Example
//!
//! ```ignore
//! use ol_01_spent_filter::BloomFilter;
//!
//! let mut filter = BloomFilter::create(10_000, 0.001)?;
//! filter.add(b"9f86d081884c7d65:0");
//! assert!(filter.contains(b"9f86d081884c7d65:0"));
//!
//! // Ship to a peer and merge on the other side
//! let bytes = filter.to_bytes();
//! let mut peer = BloomFilter::create(10_000, 0.001)?;
//! peer.merge(&BloomFilter::from_bytes(&bytes)?)?;
//! ```

pub mod domain;
pub mod error;

// Re-exports for convenience
pub use domain::{BitVector, BloomFilter, FilterConfig, FilterConfigBuilder};
pub use error::FilterError;
