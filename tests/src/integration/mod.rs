//! # Integration Tests
//!
//! End-to-end flows across the filter, the ledger service, the in-memory
//! store and the channel transport.

pub mod exchange;
pub mod scenarios;
