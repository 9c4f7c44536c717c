//! Structured log helpers.
//!
//! Every ledger log line carries the same field names so output from two
//! peers can be correlated:
//! - `peer`: service or peer name
//! - `tx_id`: transaction id
//! - `filter_bits` / `bits_set`: filter size and saturation

/// Log a transaction-related event with standard fields.
///
/// ```rust,ignore
/// log_tx_event!(info, "alice", "Payment sent", tx.id, amount = 100);
/// ```
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $peer:expr, $msg:expr, $tx_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            peer = $peer,
            tx_id = %$tx_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a filter-related event with standard fields.
///
/// ```rust,ignore
/// log_filter_event!(debug, "bob", "Filter merged", filter);
/// ```
#[macro_export]
macro_rules! log_filter_event {
    ($level:ident, $peer:expr, $msg:expr, $filter:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            peer = $peer,
            filter_bits = $filter.size_bits(),
            bits_set = $filter.bits_set(),
            $($($field)*,)?
            $msg
        )
    };
}
