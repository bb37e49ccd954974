//! # Invoke Flow
//!
//! Proposal → endorsement → reconciliation → ordering → commit watch, with
//! scripted peers and an ordering service that emits the commit event itself.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{config, coordinator, peers};
    use lg_tx_coordinator::test_utils::{MockEndorsingPeer, MockOrderer};
    use lg_tx_coordinator::{
        CommitOutcome, CoordinatorError, EndorsementPolicy, ReconciliationFailure, TransactionApi,
    };
    use serde_json::json;
    use shared_bus::{CommitEventPublisher, InMemoryEventHub};
    use shared_types::{CommitEvent, PeerId, TxId, ValidationCode};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_identical_endorsements_commit() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(
            MockOrderer::accepting().committing_to(Arc::clone(&hub), Duration::from_millis(100)),
        );
        let coordinator = coordinator(&peers(&[b"90", b"90", b"90"]), &orderer, &hub, config());

        let outcome = coordinator.submit_transaction(&json!(["a", "b", "10"])).await;

        assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
        let envelopes = orderer.received();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].endorsements.len(), 3);
        assert_eq!(envelopes[0].payload, b"90");
        assert_eq!(Some(&envelopes[0].tx_id), outcome.tx_id());

        assert_eq!(hub.registration_count(), 0);
        assert!(!hub.is_connected());
        let stats = coordinator.commit_watch_stats();
        assert_eq!(stats.committed, 1);
        assert_eq!(stats.pending, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_divergent_endorsements_never_reach_orderer() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let coordinator = coordinator(&peers(&[b"100", b"100", b"99"]), &orderer, &hub, config());

        let outcome = coordinator.submit_transaction(&json!(["a", "b", "10"])).await;

        match outcome {
            CommitOutcome::Error(CoordinatorError::ReconciliationFailure(
                ReconciliationFailure::InsufficientAgreement {
                    agreeing,
                    required,
                    divergent_peer,
                },
            )) => {
                assert_eq!(agreeing, 2);
                assert_eq!(required, 3);
                assert_eq!(divergent_peer, Some(PeerId("peer2".into())));
            }
            other => panic!("expected reconciliation failure, got {other:?}"),
        }
        assert_eq!(orderer.broadcast_count(), 0);
        assert_eq!(hub.registration_count(), 0);
        assert!(!hub.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_policy_tolerates_a_divergent_peer() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(
            MockOrderer::accepting().committing_to(Arc::clone(&hub), Duration::from_millis(10)),
        );
        let mut config = config();
        config.endorsement_policy = EndorsementPolicy::AtLeast(2);
        let coordinator = coordinator(&peers(&[b"100", b"99", b"100"]), &orderer, &hub, config);

        let outcome = coordinator.submit_transaction(&json!(["a"])).await;

        assert!(outcome.is_success());
        assert_eq!(orderer.received()[0].endorsements.len(), 2);
        assert_eq!(orderer.received()[0].payload, b"100");
    }

    #[tokio::test(start_paused = true)]
    async fn test_chaincode_error_aborts_before_ordering() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let peers = vec![
            Arc::new(MockEndorsingPeer::responding("peer0", b"v")),
            Arc::new(MockEndorsingPeer::with_status("peer1", 500, b"")),
        ];
        let coordinator = coordinator(&peers, &orderer, &hub, config());

        let outcome = coordinator.submit_transaction(&json!(["a"])).await;

        assert!(matches!(
            outcome,
            CommitOutcome::Error(CoordinatorError::ReconciliationFailure(
                ReconciliationFailure::ErrorStatus { status: 500, .. }
            ))
        ));
        assert_eq!(orderer.broadcast_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_peer_costs_one_request_timeout() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(
            MockOrderer::accepting().committing_to(Arc::clone(&hub), Duration::from_millis(10)),
        );
        let peers = vec![
            Arc::new(MockEndorsingPeer::responding("peer0", b"v")),
            Arc::new(MockEndorsingPeer::hanging("peer1")),
            Arc::new(MockEndorsingPeer::responding("peer2", b"v")),
        ];
        let coordinator = coordinator(&peers, &orderer, &hub, config());

        let start = Instant::now();
        let outcome = coordinator.submit_transaction(&json!(["a"])).await;
        let elapsed = start.elapsed();

        assert!(outcome.is_success());
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1500));
        assert_eq!(orderer.received()[0].endorsements.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_and_late_event_is_ignored() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(
            MockOrderer::accepting().committing_to(Arc::clone(&hub), Duration::from_secs(3)),
        );
        let coordinator = coordinator(&peers(&[b"v", b"v"]), &orderer, &hub, config());

        let start = Instant::now();
        let outcome = coordinator.submit_transaction(&json!(["a"])).await;

        assert!(matches!(outcome, CommitOutcome::TimedOut { .. }));
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(hub.registration_count(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;

        // the connection closed with the last watch, so the late event is dropped
        assert_eq!(hub.events_published(), 0);
        let stats = coordinator.commit_watch_stats();
        assert_eq!(stats.timed_out, 1);
        assert_eq!(stats.committed, 0);
        assert_eq!(stats.pending, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidated_transaction_is_not_success() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting().committing_with_code(
            Arc::clone(&hub),
            Duration::from_millis(10),
            ValidationCode::MvccReadConflict,
        ));
        let coordinator = coordinator(&peers(&[b"v"]), &orderer, &hub, config());

        let outcome = coordinator.submit_transaction(&json!(["a"])).await;

        assert!(matches!(
            outcome,
            CommitOutcome::Committed {
                validation_code: ValidationCode::MvccReadConflict,
                ..
            }
        ));
        assert!(!outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_invocations_share_one_connection() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(
            MockOrderer::accepting().committing_to(Arc::clone(&hub), Duration::from_millis(200)),
        );
        let coordinator = Arc::new(coordinator(&peers(&[b"v", b"v"]), &orderer, &hub, config()));

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let coordinator = Arc::clone(&coordinator);
                tokio::spawn(async move {
                    coordinator.submit_transaction(&json!(["a", i])).await
                })
            })
            .collect();

        let mut tx_ids = HashSet::new();
        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(outcome.is_success());
            tx_ids.insert(outcome.tx_id().cloned().unwrap());
        }

        assert_eq!(tx_ids.len(), 5);
        assert_eq!(orderer.broadcast_count(), 5);
        assert!(!hub.is_connected());
        assert_eq!(coordinator.commit_watch_stats().committed, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_commit_event_does_not_resolve_watch() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let coordinator = Arc::new(coordinator(&peers(&[b"v"]), &orderer, &hub, config()));

        let submit = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.submit_transaction(&json!(["a"])).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        let resolved = hub
            .publish(CommitEvent {
                tx_id: TxId::new("not-ours"),
                block_number: 9,
                validation_code: ValidationCode::Valid,
            })
            .await;
        assert_eq!(resolved, 0);

        let outcome = submit.await.unwrap();
        assert!(matches!(outcome, CommitOutcome::TimedOut { .. }));
    }
}
