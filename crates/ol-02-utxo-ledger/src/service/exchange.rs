//! Two-party payment exchange
//!
//! Merge-then-check: both peers swap spent filters and merge before any
//! input is judged, so an output spent with a third party the counterparty
//! has synced with is caught offline.
//!
//! ```text
//! sender                                  receiver
//!   │ ── Filter(sender) ──────────────────→ │
//!   │ ←────────────────── Filter(receiver) ─│
//!   │ merge, select, build, check           │ merge
//!   │ ── Transaction ─────────────────────→ │ check, import, commit
//!   │ ←──────────────────────────── Ack ─── │
//!   │ submit (only if accepted)             │
//! ```
//!
//! Either side sends `Cancel` instead of its next message when it cannot
//! continue, so the other side never waits on a dead exchange.

use tracing::{debug, info, warn};

use super::LedgerService;
use crate::domain::{ApplyOutcome, RejectReason, Transaction};
use crate::error::{LedgerError, LedgerResult, TransportError};
use crate::ports::{LedgerApi, LedgerStore, PeerMessage, PeerTransport};

/// Pay `amount` to `recipient` over `transport`
///
/// Returns the local outcome: `Committed` once the receiver acknowledged
/// and the local store applied the transaction, `Rejected` when the merged
/// filter flags an input or the receiver refuses. Transport and filter
/// failures are errors.
pub async fn send_payment<S, T>(
    service: &mut LedgerService<S>,
    transport: &T,
    recipient: &[u8],
    amount: u64,
) -> LedgerResult<ApplyOutcome>
where
    S: LedgerStore,
    T: PeerTransport + ?Sized,
{
    transport
        .send(PeerMessage::Filter(service.filter().to_bytes()))
        .await?;
    let peer_filter = expect_filter(transport.recv().await?)?;

    let tx = match prepare_payment(service, &peer_filter, recipient, amount) {
        Ok(tx) => tx,
        Err(err) => {
            cancel(transport, &err.to_string()).await;
            return Err(err);
        }
    };

    if service.check_double_spend(&tx.inputs) {
        let input = tx
            .inputs
            .iter()
            .map(|u| u.identifier())
            .find(|id| service.filter().contains(id.as_bytes()))
            .unwrap_or_default();
        warn!(tx_id = %tx.id, input = %input, "Input flagged by merged filter");
        cancel(transport, "input already spent").await;
        return Ok(ApplyOutcome::rejected(
            &tx.id,
            RejectReason::DoubleSpendDetected { input },
        ));
    }

    debug!(tx_id = %tx.id, amount, "Sending transaction");
    transport
        .send(PeerMessage::Transaction(tx.to_bytes()?))
        .await?;

    match transport.recv().await? {
        PeerMessage::Ack { tx_id, accepted } if tx_id == tx.id && accepted => {
            let outcome = service.submit(&tx);
            if outcome.is_committed() {
                info!(tx_id = %tx.id, amount, "Payment sent");
            } else {
                warn!(tx_id = %tx.id, "Receiver accepted but local apply failed");
            }
            Ok(outcome)
        }
        PeerMessage::Ack { tx_id, .. } => {
            if tx_id == tx.id {
                warn!(tx_id = %tx.id, "Receiver rejected transaction");
            } else {
                warn!(tx_id = %tx.id, acked = %tx_id, "Receiver acknowledged another transaction");
            }
            Ok(ApplyOutcome::rejected(&tx.id, RejectReason::PeerRejected))
        }
        PeerMessage::Cancel { reason } => {
            warn!(tx_id = %tx.id, reason = %reason, "Receiver cancelled exchange");
            Ok(ApplyOutcome::rejected(&tx.id, RejectReason::PeerRejected))
        }
        other => Err(unexpected("ack", &other)),
    }
}

/// Receive one payment over `transport`
///
/// Returns `None` when the sender cancelled before sending a transaction.
pub async fn receive_payment<S, T>(
    service: &mut LedgerService<S>,
    transport: &T,
) -> LedgerResult<Option<ApplyOutcome>>
where
    S: LedgerStore,
    T: PeerTransport + ?Sized,
{
    transport
        .send(PeerMessage::Filter(service.filter().to_bytes()))
        .await?;

    let merged = match transport.recv().await? {
        PeerMessage::Filter(bytes) => service.merge_filter(&bytes),
        PeerMessage::Cancel { reason } => {
            debug!(reason = %reason, "Sender cancelled before filter exchange");
            return Ok(None);
        }
        other => Err(unexpected("filter", &other)),
    };
    if let Err(err) = merged {
        cancel(transport, &err.to_string()).await;
        return Err(err);
    }

    let tx = match transport.recv().await? {
        PeerMessage::Transaction(bytes) => match Transaction::from_bytes(&bytes) {
            Ok(tx) => tx,
            Err(err) => {
                cancel(transport, "undecodable transaction").await;
                return Err(err);
            }
        },
        PeerMessage::Cancel { reason } => {
            debug!(reason = %reason, "Sender cancelled exchange");
            return Ok(None);
        }
        other => return Err(unexpected("transaction", &other)),
    };

    let outcome = service.accept_transaction(&tx);
    transport
        .send(PeerMessage::Ack {
            tx_id: tx.id.clone(),
            accepted: outcome.is_committed(),
        })
        .await?;

    if outcome.is_committed() {
        info!(tx_id = %tx.id, "Payment received");
    }
    Ok(Some(outcome))
}

fn prepare_payment<S: LedgerStore>(
    service: &mut LedgerService<S>,
    peer_filter: &[u8],
    recipient: &[u8],
    amount: u64,
) -> LedgerResult<Transaction> {
    service.merge_filter(peer_filter)?;
    let selection = service.select_inputs(amount)?;
    service.build_transaction(recipient, amount, selection)
}

fn expect_filter(message: PeerMessage) -> LedgerResult<Vec<u8>> {
    match message {
        PeerMessage::Filter(bytes) => Ok(bytes),
        other => Err(unexpected("filter", &other)),
    }
}

fn unexpected(expected: &'static str, got: &PeerMessage) -> LedgerError {
    TransportError::UnexpectedMessage {
        expected,
        got: got.kind(),
    }
    .into()
}

/// Best effort; the exchange is already failing
async fn cancel<T: PeerTransport + ?Sized>(transport: &T, reason: &str) {
    let message = PeerMessage::Cancel {
        reason: reason.to_string(),
    };
    if let Err(err) = transport.send(message).await {
        debug!(error = %err, "Cancel not delivered");
    }
}
