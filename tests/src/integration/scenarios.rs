//! # Single-Ledger Scenarios
//!
//! Balance, selection, genesis, re-submission and filter sync as seen by
//! one `LedgerService`.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        balance, build_payment, funded_peer, pay, peer, public_key, rebuilt_filter, sync_filter,
    };
    use ol_01_spent_filter::BloomFilter;
    use ol_02_utxo_ledger::{LedgerApi, LedgerError, LedgerStore, RejectReason, Utxo};

    // =============================================================================
    // BALANCE AND SELECTION
    // =============================================================================

    #[test]
    fn test_empty_ledger_has_insufficient_funds() {
        let alice = peer("alice");

        assert_eq!(balance(&alice, "alice"), 0);
        match alice.select_inputs(100) {
            Err(LedgerError::InsufficientFunds {
                required,
                available,
            }) => {
                assert_eq!(required, 100);
                assert_eq!(available, 0);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
    }

    #[test]
    fn test_first_fit_selection_stops_at_target() {
        let mut alice = funded_peer("alice");
        // Split the genesis output into 100 + 9900
        pay(&mut alice, "alice", 100);

        let owned = alice
            .store()
            .get_utxos_by_owner(&public_key("alice"))
            .unwrap();
        assert_eq!(owned.len(), 2);

        let selection = alice.select_inputs(50).unwrap();
        assert_eq!(selection.inputs, vec![owned[0].clone()]);
        assert_eq!(selection.selected_sum, owned[0].amount);

        let selection = alice.select_inputs(10_000).unwrap();
        assert_eq!(selection.inputs.len(), 2);
        assert_eq!(selection.selected_sum, 10_000);
    }

    // =============================================================================
    // GENESIS AND TRANSFER
    // =============================================================================

    #[test]
    fn test_genesis_transfer_outputs_and_spent_marker() {
        let mut alice = funded_peer("alice");
        let genesis_output = alice.select_inputs(100).unwrap().inputs[0].clone();

        let tx = pay(&mut alice, "bob", 100);

        let outputs: Vec<(Vec<u8>, u64)> = tx
            .outputs
            .iter()
            .map(|u| (u.owner.clone(), u.amount))
            .collect();
        assert_eq!(
            outputs,
            vec![(public_key("bob"), 100), (public_key("alice"), 9_900)]
        );

        let stored = alice
            .store()
            .get_utxo(&genesis_output.origin_tx_id, genesis_output.output_index)
            .unwrap()
            .unwrap();
        assert_eq!(stored.spent_in_tx_id, Some(tx.id.clone()));
        assert_eq!(balance(&alice, "alice"), 9_900);
        assert_eq!(balance(&alice, "bob"), 100);
    }

    #[test]
    fn test_chain_of_payments_conserves_value() {
        let mut alice = funded_peer("alice");
        for amount in [1, 10, 100, 1_000, 2_500] {
            pay(&mut alice, "bob", amount);
        }
        assert_eq!(balance(&alice, "alice") + balance(&alice, "bob"), 10_000);
        assert_eq!(balance(&alice, "bob"), 3_611);
    }

    // =============================================================================
    // DOUBLE SPEND
    // =============================================================================

    #[test]
    fn test_resubmitted_transaction_rejected_without_mutation() {
        let mut alice = funded_peer("alice");
        let tx = pay(&mut alice, "bob", 100);

        let spent_before = alice.store().get_spent_utxo_identifiers().unwrap();
        let bob_before = balance(&alice, "bob");

        let outcome = alice.submit(&tx);
        assert!(matches!(
            outcome.reject_reason(),
            Some(RejectReason::DoubleSpendDetected { .. })
        ));
        assert!(!alice.apply_transaction(&tx));

        assert_eq!(alice.store().get_spent_utxo_identifiers().unwrap(), spent_before);
        assert_eq!(balance(&alice, "bob"), bob_before);
    }

    #[test]
    fn test_two_transactions_over_same_input_only_first_applies() {
        let mut alice = funded_peer("alice");
        let first = build_payment(&alice, "bob", 100);
        let second = build_payment(&alice, "carol", 100);
        assert_eq!(first.inputs, second.inputs);
        assert_ne!(first.id, second.id);

        assert!(alice.apply_transaction(&first));
        assert!(!alice.apply_transaction(&second));
        assert_eq!(balance(&alice, "carol"), 0);
    }

    // =============================================================================
    // FILTER SYNC
    // =============================================================================

    #[test]
    fn test_merged_filter_flags_peer_spend() {
        let alice = peer("alice");
        let mut bob = peer("bob");

        let mut alice_filter = BloomFilter::from_config(&alice.config().filter).unwrap();
        alice_filter.add(b"tx1:0");

        sync_filter(&mut bob, "bob", &alice_filter.to_bytes());
        let foreign = Utxo::new("tx1", 0, 10, public_key("bob"));
        assert!(bob.check_double_spend(&[foreign]));
    }

    #[test]
    fn test_rebuild_matches_incremental_filter() {
        let mut alice = funded_peer("alice");
        for _ in 0..20 {
            pay(&mut alice, "alice", 7);
        }

        let rebuilt = rebuilt_filter(&alice, "alice");
        let spent = alice.store().get_spent_utxo_identifiers().unwrap();
        assert_eq!(spent.len(), 21);
        for id in &spent {
            assert_eq!(rebuilt.contains(id.as_bytes()), alice.filter().contains(id.as_bytes()));
            assert!(rebuilt.contains(id.as_bytes()));
        }
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn prop_direct_payments_conserve_value(
                amounts in prop::collection::vec(1u64..3_000, 1..10)
            ) {
                let mut alice = funded_peer("alice");
                let mut bob = peer("bob");

                for amount in amounts {
                    if balance(&alice, "alice") < amount {
                        continue;
                    }
                    let tx = pay(&mut alice, "bob", amount);
                    prop_assert!(bob.accept_transaction(&tx).is_committed());
                    // Bob now knows these inputs as spent
                    prop_assert!(bob.check_double_spend(&tx.inputs));
                }

                prop_assert_eq!(balance(&alice, "alice") + balance(&bob, "bob"), 10_000);
                for id in bob.store().get_spent_utxo_identifiers().unwrap() {
                    prop_assert!(alice.filter().contains(id.as_bytes()));
                }
            }
        }
    }
}
