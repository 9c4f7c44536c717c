//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for wallets and transport handlers
//! - Driven Ports (outbound) - Store, transport and identity collaborators

pub mod inbound;
pub mod outbound;

pub use inbound::{CoinSelection, LedgerApi};
pub use outbound::{IdentityProvider, LedgerStore, PeerMessage, PeerTransport};
