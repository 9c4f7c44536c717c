//! # Two-Peer Exchange
//!
//! Payments between independent ledgers over `ChannelTransport`, following
//! the merge-then-check protocol.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::fixtures::{balance, funded_peer, peer, public_key, rebuilt_filter, Ledger};
    use ol_02_utxo_ledger::{receive_payment, send_payment, ApplyOutcome, ChannelTransport, LedgerStore};

    /// Run one payment between two ledgers over a fresh channel pair
    async fn exchange(
        sender: &mut Ledger,
        receiver: &mut Ledger,
        to: &str,
        amount: u64,
    ) -> (ApplyOutcome, Option<ApplyOutcome>) {
        let (a, b) = ChannelTransport::pair();
        let a = a.with_recv_timeout(Duration::from_secs(5));
        let b = b.with_recv_timeout(Duration::from_secs(5));

        let to_key = public_key(to);
        let (sent, received) = tokio::join!(
            send_payment(sender, &a, &to_key, amount),
            receive_payment(receiver, &b),
        );
        (sent.unwrap(), received.unwrap())
    }

    #[tokio::test]
    async fn test_payment_and_payment_back() {
        let mut alice = funded_peer("alice");
        let mut bob = peer("bob");

        let (sent, received) = exchange(&mut alice, &mut bob, "bob", 400).await;
        assert!(sent.is_committed());
        assert!(received.unwrap().is_committed());
        assert_eq!(balance(&alice, "alice"), 9_600);
        assert_eq!(balance(&bob, "bob"), 400);

        // Bob spends the output he received straight back
        let (sent, received) = exchange(&mut bob, &mut alice, "alice", 150).await;
        assert!(sent.is_committed());
        assert!(received.unwrap().is_committed());
        assert_eq!(balance(&bob, "bob"), 250);
        assert_eq!(balance(&alice, "alice"), 9_750);
    }

    #[tokio::test]
    async fn test_filters_converge_after_exchange() {
        let mut alice = funded_peer("alice");
        let mut bob = funded_peer("bob");

        exchange(&mut alice, &mut bob, "bob", 10).await;
        exchange(&mut bob, &mut alice, "alice", 20).await;

        for id in alice.store().get_spent_utxo_identifiers().unwrap() {
            assert!(bob.filter().contains(id.as_bytes()), "bob missing {}", id);
        }
        for id in bob.store().get_spent_utxo_identifiers().unwrap() {
            assert!(alice.filter().contains(id.as_bytes()), "alice missing {}", id);
        }
    }

    #[tokio::test]
    async fn test_receiver_rebuilds_what_it_learned() {
        let mut alice = funded_peer("alice");
        let mut bob = peer("bob");

        let (sent, _) = exchange(&mut alice, &mut bob, "bob", 75).await;
        assert!(sent.is_committed());

        let alice_spent = alice.store().get_spent_utxo_identifiers().unwrap();
        let bob_spent = bob.store().get_spent_utxo_identifiers().unwrap();
        assert_eq!(bob_spent.len(), 1);
        assert!(alice_spent.contains(&bob_spent[0]));

        // A filter rebuilt from Bob's store alone still knows the spent input
        let rebuilt = rebuilt_filter(&bob, "bob");
        assert!(rebuilt.contains(bob_spent[0].as_bytes()));
    }
}
