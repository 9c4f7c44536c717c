//! # Offline Ledger Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Peers, telemetry and helpers shared by all tests
//! ├── integration/      # End-to-end ledger flows
//! │   ├── scenarios.rs  # Single-ledger scenarios
//! │   └── exchange.rs   # Two-peer payments over a transport
//! │
//! └── exploits/         # Double-spend attack simulations
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ledger-tests
//!
//! # By category
//! cargo test -p ledger-tests integration::
//! cargo test -p ledger-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p ledger-tests
//! ```

#![allow(dead_code)]

pub mod exploits;
pub mod fixtures;
pub mod integration;
