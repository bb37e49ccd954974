//! # Query Flow
//!
//! Read-only proposals skip ordering entirely. Which peer's payload is
//! returned depends on the configured query policy.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{config, coordinator};
    use lg_tx_coordinator::test_utils::{MockEndorsingPeer, MockOrderer};
    use lg_tx_coordinator::{
        CoordinatorConfig, CoordinatorError, QueryPolicy, ReconciliationFailure, TransactionApi,
    };
    use serde_json::json;
    use shared_bus::InMemoryEventHub;
    use shared_types::PeerId;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn divergent_peers() -> Vec<Arc<MockEndorsingPeer>> {
        vec![
            Arc::new(MockEndorsingPeer::responding("peer0", b"100").with_delay(Duration::from_millis(10))),
            Arc::new(MockEndorsingPeer::responding("peer1", b"99").with_delay(Duration::from_millis(50))),
            Arc::new(MockEndorsingPeer::responding("peer2", b"100").with_delay(Duration::from_millis(30))),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_received_returns_latest_arrival() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let coordinator = coordinator(&divergent_peers(), &orderer, &hub, config());

        let response = coordinator.query(&json!(["a"])).await.unwrap();

        assert_eq!(response.payload, b"99");
        assert_eq!(response.peer, PeerId("peer1".into()));
        assert_eq!(response.responded, 3);
        assert_eq!(orderer.broadcast_count(), 0);
        assert!(!hub.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_agreement_rejects_divergence() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let config = CoordinatorConfig {
            query_policy: QueryPolicy::RequireAgreement,
            ..config()
        };
        let coordinator = coordinator(&divergent_peers(), &orderer, &hub, config);

        let result = coordinator.query(&json!(["a"])).await;

        assert!(matches!(
            result,
            Err(CoordinatorError::ReconciliationFailure(
                ReconciliationFailure::InsufficientAgreement { agreeing: 2, .. }
            ))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_agreement_with_matching_peers() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let config = CoordinatorConfig {
            query_policy: QueryPolicy::RequireAgreement,
            ..config()
        };
        let peers = vec![
            Arc::new(MockEndorsingPeer::responding("peer0", b"100")),
            Arc::new(MockEndorsingPeer::responding("peer1", b"100")),
        ];
        let coordinator = coordinator(&peers, &orderer, &hub, config);

        let response = coordinator.query(&json!(["a"])).await.unwrap();

        assert_eq!(response.payload, b"100");
        assert_eq!(response.peer, PeerId("peer0".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_survives_a_down_peer() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let peers = vec![
            Arc::new(MockEndorsingPeer::unreachable("peer0")),
            Arc::new(MockEndorsingPeer::responding("peer1", b"42")),
        ];
        let coordinator = coordinator(&peers, &orderer, &hub, config());

        let response = coordinator.query(&json!(["a"])).await.unwrap();

        assert_eq!(response.payload, b"42");
        assert_eq!(response.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_with_chaincode_error_only() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let peers = vec![Arc::new(MockEndorsingPeer::with_status("peer0", 404, b""))];
        let coordinator = coordinator(&peers, &orderer, &hub, config());

        let result = coordinator.query(&json!(["missing"])).await;

        assert!(matches!(
            result,
            Err(CoordinatorError::PeerRejected { status: 404, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_bounded_by_silent_peer() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let peers = vec![
            Arc::new(MockEndorsingPeer::responding("peer0", b"7")),
            Arc::new(MockEndorsingPeer::hanging("peer1")),
        ];
        let coordinator = coordinator(&peers, &orderer, &hub, config());

        let start = Instant::now();
        let response = coordinator.query(&json!(["a"])).await.unwrap();

        assert!(start.elapsed() < Duration::from_millis(1500));
        assert_eq!(response.payload, b"7");
        assert_eq!(response.responded, 1);
        assert_eq!(response.failed, 1);
    }
}
