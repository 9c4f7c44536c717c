//! Service Layer
//!
//! `LedgerService` implements the `LedgerApi` port; `exchange` drives it
//! over a `PeerTransport`.

pub mod exchange;
pub mod ledger_service;

pub use exchange::{receive_payment, send_payment};
pub use ledger_service::LedgerService;
