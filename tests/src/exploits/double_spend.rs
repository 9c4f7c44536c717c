//! # Offline Double Spend
//!
//! Mallory pays Bob, then replays the same input to another peer. Whether
//! the replay is caught depends only on whether the victim's filter has
//! (transitively) merged a filter that saw the first spend.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::fixtures::{funded_peer, peer, public_key, sync_filter, test_config, Ledger};
    use ol_01_spent_filter::BloomFilter;
    use ol_02_utxo_ledger::{
        receive_payment, send_payment, ApplyOutcome, ChannelTransport, LedgerApi, PeerMessage,
        PeerTransport, RejectReason, Transaction, Utxo,
    };

    /// A transaction moving `inputs` from `from` to `victim`
    fn replay_to(inputs: &[Utxo], from: &str, victim: &str, amount: u64) -> Transaction {
        let id = format!("{}-replay-{}", from, victim);
        Transaction {
            outputs: vec![Utxo::new(id.clone(), 0, amount, public_key(victim))],
            id,
            sender: public_key(from),
            recipient: public_key(victim),
            inputs: inputs.to_vec(),
        }
    }

    /// Offer `tx` to `victim` without any honest-sender checks
    async fn offer(victim: &mut Ledger, tx: &Transaction) -> ApplyOutcome {
        let (attacker, victim_end) = ChannelTransport::pair();
        let attacker = attacker.with_recv_timeout(Duration::from_secs(5));
        let empty = BloomFilter::from_config(&test_config().filter).unwrap();

        let attack = async {
            attacker.send(PeerMessage::Filter(empty.to_bytes())).await.unwrap();
            let _victim_filter = attacker.recv().await.unwrap();
            attacker
                .send(PeerMessage::Transaction(tx.to_bytes().unwrap()))
                .await
                .unwrap();
            attacker.recv().await.unwrap()
        };

        let (ack, outcome) = tokio::join!(attack, receive_payment(victim, &victim_end));
        let outcome = outcome.unwrap().unwrap();
        assert_eq!(
            ack,
            PeerMessage::Ack {
                tx_id: tx.id.clone(),
                accepted: outcome.is_committed()
            }
        );
        outcome
    }

    /// Honest payment over a fresh channel; returns the inputs it spent
    async fn pay(sender: &mut Ledger, receiver: &mut Ledger, to: &str, amount: u64) -> Vec<Utxo> {
        let coins = sender.select_inputs(amount).unwrap().inputs;

        let (a, b) = ChannelTransport::pair();
        let to_key = public_key(to);
        let (sent, received) = tokio::join!(
            send_payment(sender, &a, &to_key, amount),
            receive_payment(receiver, &b),
        );
        assert!(sent.unwrap().is_committed());
        assert!(received.unwrap().unwrap().is_committed());
        coins
    }

    #[tokio::test]
    async fn test_replay_caught_after_transitive_sync() {
        let mut mallory = funded_peer("mallory");
        let mut bob = peer("bob");
        let mut carol = peer("carol");

        let first = pay(&mut mallory, &mut bob, "bob", 10_000).await;

        // Bob later pays Carol; Carol merges Bob's filter along the way
        pay(&mut bob, &mut carol, "carol", 1_000).await;

        let outcome = offer(&mut carol, &replay_to(&first, "mallory", "carol", 10_000)).await;
        assert!(matches!(
            outcome.reject_reason(),
            Some(RejectReason::DoubleSpendDetected { .. })
        ));
        assert_eq!(carol.get_balance(&public_key("carol")).unwrap(), 1_000);
    }

    #[tokio::test]
    async fn test_replay_to_unsynced_peer_goes_through() {
        // Detection is only as good as the filters a peer has seen
        let mut mallory = funded_peer("mallory");
        let mut bob = peer("bob");
        let mut dave = peer("dave");

        let first = pay(&mut mallory, &mut bob, "bob", 10_000).await;

        let outcome = offer(&mut dave, &replay_to(&first, "mallory", "dave", 10_000)).await;
        assert!(outcome.is_committed());

        // Once Dave syncs with Bob, the conflicting input is visible to him
        let bob_filter = bob.filter().to_bytes();
        sync_filter(&mut dave, "dave", &bob_filter);
        assert!(dave.check_double_spend(&first));
    }

    #[tokio::test]
    async fn test_replay_back_to_first_receiver() {
        let mut mallory = funded_peer("mallory");
        let mut bob = peer("bob");

        let first = pay(&mut mallory, &mut bob, "bob", 10_000).await;

        let outcome = offer(&mut bob, &replay_to(&first, "mallory", "bob", 10_000)).await;
        assert!(matches!(
            outcome.reject_reason(),
            Some(RejectReason::DoubleSpendDetected { .. })
        ));
        assert_eq!(bob.get_balance(&public_key("bob")).unwrap(), 10_000);
    }

    #[tokio::test]
    async fn test_inflated_outputs_rejected() {
        let mallory = funded_peer("mallory");
        let mut bob = peer("bob");

        let selection = mallory.select_inputs(100).unwrap();
        let mut tx = mallory
            .build_transaction(&public_key("bob"), 100, selection)
            .unwrap();
        tx.outputs[0].amount = 1_000_000;

        let outcome = offer(&mut bob, &tx).await;
        assert!(matches!(
            outcome.reject_reason(),
            Some(RejectReason::ValueNotConserved { .. })
        ));
        assert_eq!(bob.get_balance(&public_key("bob")).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transfer_keeping_every_output_rejected() {
        let mallory = funded_peer("mallory");
        let mut bob = peer("bob");

        // Addressed to Bob, but the payment output goes back to Mallory
        let selection = mallory.select_inputs(100).unwrap();
        let mut tx = mallory
            .build_transaction(&public_key("bob"), 100, selection)
            .unwrap();
        tx.outputs[0].owner = public_key("mallory");

        let outcome = offer(&mut bob, &tx).await;
        assert!(!outcome.is_committed());
        assert!(matches!(outcome.reject_reason(), Some(RejectReason::Malformed(_))));
        assert_eq!(bob.get_balance(&public_key("bob")).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_spending_someone_elses_output_rejected() {
        let alice = funded_peer("alice");
        let mut bob = peer("bob");

        // Mallory claims Alice's output as her own input
        let selection = alice.select_inputs(100).unwrap();
        let mut tx = alice
            .build_transaction(&public_key("bob"), 100, selection)
            .unwrap();
        tx.sender = public_key("mallory");

        let outcome = offer(&mut bob, &tx).await;
        assert!(matches!(
            outcome.reject_reason(),
            Some(RejectReason::InputUnavailable { .. })
        ));
    }
}
