//! # Deploy Flow
//!
//! Deployment proposals follow the invoke path with the chaincode package
//! attached. The ordering service's refusal code is surfaced as-is.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{config, coordinator, peers};
    use lg_tx_coordinator::test_utils::MockOrderer;
    use lg_tx_coordinator::{CommitOutcome, CoordinatorConfig, CoordinatorError, TransactionApi};
    use serde_json::json;
    use shared_bus::InMemoryEventHub;
    use shared_types::{DeploymentSpec, ProposalKind};
    use std::sync::Arc;
    use std::time::Duration;

    fn deploy_config() -> CoordinatorConfig {
        CoordinatorConfig {
            deployment: Some(DeploymentSpec {
                chaincode_path: "github.com/gochain".into(),
                dockerfile_contents: "FROM hyperledger/fabric-ccenv".into(),
            }),
            ..config()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploy_commits_with_package_attached() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(
            MockOrderer::accepting().committing_to(Arc::clone(&hub), Duration::from_millis(50)),
        );
        let coordinator = coordinator(&peers(&[b"", b""]), &orderer, &hub, deploy_config());

        let outcome = coordinator.submit_deployment(&json!(["a", "100", "b", "200"])).await;

        assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
        let proposal = &orderer.received()[0].proposal.proposal;
        assert_eq!(proposal.kind, ProposalKind::Deploy);
        assert_eq!(proposal.function, "init");
        assert_eq!(
            proposal.deployment.as_ref().map(|d| d.chaincode_path.as_str()),
            Some("github.com/gochain")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_deploy_reports_orderer_code() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::with_status(503));
        let coordinator = coordinator(&peers(&[b"", b""]), &orderer, &hub, deploy_config());

        let outcome = coordinator.submit_deployment(&json!(["a", "100"])).await;

        assert!(matches!(
            outcome,
            CommitOutcome::SubmissionRejected { code: 503, .. }
        ));
        assert_eq!(
            outcome.error(),
            Some(CoordinatorError::OrderingRejected { code: 503 })
        );
        assert_eq!(orderer.broadcast_count(), 1);
        assert_eq!(hub.registration_count(), 0);
        assert!(!hub.is_connected());
        assert_eq!(coordinator.commit_watch_stats().watches_started, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploy_without_package_contacts_nobody() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::accepting());
        let peers = peers(&[b""]);
        let coordinator = coordinator(&peers, &orderer, &hub, config());

        let outcome = coordinator.submit_deployment(&json!(["a"])).await;

        assert!(matches!(
            outcome,
            CommitOutcome::Error(CoordinatorError::InvalidArguments { .. })
        ));
        assert_eq!(peers[0].calls(), 0);
        assert_eq!(orderer.broadcast_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_orderer_is_an_error() {
        let hub = Arc::new(InMemoryEventHub::new());
        let orderer = Arc::new(MockOrderer::unreachable());
        let coordinator = coordinator(&peers(&[b""]), &orderer, &hub, deploy_config());

        let outcome = coordinator.submit_deployment(&json!([])).await;

        assert!(matches!(
            outcome,
            CommitOutcome::Error(CoordinatorError::OrdererUnreachable { .. })
        ));
        assert!(!hub.is_connected());
    }
}
