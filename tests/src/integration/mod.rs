//! Cross-crate lifecycle tests.

pub mod deploy_flow;
pub mod http_flow;
pub mod invoke_flow;
pub mod query_flow;

#[cfg(test)]
pub(crate) mod fixtures {
    use lg_tx_coordinator::test_utils::{MockEndorsingPeer, MockOrderer, StaticIdentityProvider};
    use lg_tx_coordinator::{CoordinatorConfig, EndorsingPeer, TransactionCoordinator};
    use shared_bus::InMemoryEventHub;
    use std::sync::Arc;
    use std::time::Duration;

    pub type MockCoordinator =
        TransactionCoordinator<StaticIdentityProvider, MockOrderer, InMemoryEventHub>;

    /// Coordinator over mock peers with short deadlines.
    pub fn coordinator(
        peers: &[Arc<MockEndorsingPeer>],
        orderer: &Arc<MockOrderer>,
        hub: &Arc<InMemoryEventHub>,
        config: CoordinatorConfig,
    ) -> MockCoordinator {
        let peers = peers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn EndorsingPeer>)
            .collect();
        TransactionCoordinator::new(
            config,
            Arc::new(StaticIdentityProvider::generated()),
            peers,
            Arc::clone(orderer),
            Arc::clone(hub),
        )
    }

    pub fn config() -> CoordinatorConfig {
        CoordinatorConfig {
            peer_request_timeout: Duration::from_secs(1),
            commit_wait_time: Duration::from_secs(2),
            ..CoordinatorConfig::default()
        }
    }

    pub fn peers(payloads: &[&[u8]]) -> Vec<Arc<MockEndorsingPeer>> {
        payloads
            .iter()
            .enumerate()
            .map(|(i, payload)| Arc::new(MockEndorsingPeer::responding(&format!("peer{i}"), payload)))
            .collect()
    }
}
