//! Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod identity;
pub mod memory_store;
pub mod peer_channel;

pub use identity::StaticIdentity;
pub use memory_store::InMemoryLedgerStore;
pub use peer_channel::ChannelTransport;
