//! Shared test fixtures

use std::sync::{Arc, Once};

use ledger_telemetry::{init_telemetry, log_filter_event, log_tx_event, TelemetryConfig};
use ol_01_spent_filter::BloomFilter;
use ol_02_utxo_ledger::{
    InMemoryLedgerStore, LedgerApi, LedgerConfig, LedgerConfigBuilder, LedgerService,
    StaticIdentity, Transaction,
};

pub type Ledger = LedgerService<InMemoryLedgerStore>;

static TELEMETRY: Once = Once::new();

/// Install the subscriber once per test binary
///
/// Quiet by default; `RUST_LOG=debug cargo test -p ledger-tests` to watch.
pub fn init_test_telemetry() {
    TELEMETRY.call_once(|| {
        let config = TelemetryConfig::from_env();
        let config = if std::env::var("RUST_LOG").is_ok() {
            config
        } else {
            TelemetryConfig {
                console_output: false,
                ..config
            }
        };
        // Another harness may already own the global subscriber
        let _ = init_telemetry(&config);
    });
}

pub fn test_config() -> LedgerConfig {
    LedgerConfigBuilder::new()
        .filter_capacity(1_000)
        .target_fpr(0.001)
        .build()
        .expect("valid test config")
}

/// A peer with its own store
pub fn peer(name: &str) -> Ledger {
    peer_with_config(name, test_config())
}

pub fn peer_with_config(name: &str, config: LedgerConfig) -> Ledger {
    init_test_telemetry();
    LedgerService::new(
        Arc::new(InMemoryLedgerStore::new()),
        &StaticIdentity::new(public_key(name)),
        config,
    )
    .expect("ledger service")
}

/// A peer that already minted its genesis balance
pub fn funded_peer(name: &str) -> Ledger {
    let mut ledger = peer(name);
    assert!(ledger.mint_genesis(&public_key(name)));
    ledger
}

pub fn public_key(name: &str) -> Vec<u8> {
    format!("{}-pk", name).into_bytes()
}

/// Select, build and return a transfer without applying it
pub fn build_payment(ledger: &Ledger, to: &str, amount: u64) -> Transaction {
    let selection = ledger.select_inputs(amount).expect("funds");
    ledger
        .build_transaction(&public_key(to), amount, selection)
        .expect("transaction")
}

/// Build and apply a transfer, panicking on rejection
pub fn pay(ledger: &mut Ledger, to: &str, amount: u64) -> Transaction {
    let tx = build_payment(ledger, to, amount);
    let outcome = ledger.submit(&tx);
    assert!(outcome.is_committed(), "payment rejected: {:?}", outcome);
    log_tx_event!(debug, "fixture", "Fixture payment applied", tx.id, amount);
    tx
}

/// Merge a peer's serialized filter into `ledger`
pub fn sync_filter(ledger: &mut Ledger, name: &str, peer_filter: &[u8]) {
    ledger.merge_filter(peer_filter).expect("filter merge");
    log_filter_event!(debug, name, "Fixture filter merged", ledger.filter());
}

/// Rebuild `ledger`'s filter from its store alone
pub fn rebuilt_filter(ledger: &Ledger, name: &str) -> BloomFilter {
    let filter = ledger.rebuild_filter().expect("filter rebuild");
    log_filter_event!(debug, name, "Fixture filter rebuilt", filter);
    filter
}

pub fn balance(ledger: &Ledger, name: &str) -> u64 {
    ledger.get_balance(&public_key(name)).expect("balance")
}
