//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Fixed-size bit vector
//! - Core Bloom filter implementation
//! - Hash functions (single 128-bit digest, double hashing)
//! - Parameter calculations
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod bit_vector;
pub mod bloom_filter;
pub mod config;
pub mod hash_functions;
pub mod parameters;

pub use bit_vector::BitVector;
pub use bloom_filter::BloomFilter;
pub use config::{FilterConfig, FilterConfigBuilder};
pub use hash_functions::{compute_hash_positions, digest, HashPair};
pub use parameters::{calculate_fpr, calculate_optimal_parameters, BloomFilterParams};
