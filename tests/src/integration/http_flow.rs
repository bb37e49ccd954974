//! # HTTP Flow
//!
//! The gateway binary's wiring over real sockets: HTTP peers and an HTTP
//! ordering service that reports the commit back through `/events/commit`.

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use lg_gateway::{build_router, AppState};
    use lg_tx_coordinator::domain::endorsement_message;
    use lg_tx_coordinator::{
        CoordinatorConfig, EndorsingPeer, HttpEndorsingPeer, HttpOrderer, InMemoryKeyValueStore,
        KeyStoreIdentityProvider, TransactionCoordinator,
    };
    use serde_json::json;
    use shared_bus::InMemoryEventHub;
    use shared_crypto::Ed25519KeyPair;
    use shared_types::{
        BroadcastAck, CommitEvent, DeploymentSpec, Endorsement, EndorsementResponse, PeerId,
        SignedProposal, TransactionEnvelope, ValidationCode, STATUS_OK,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn serve(listener: TcpListener, router: Router) -> String {
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn bind() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    /// Peer that endorses every proposal with a fixed payload.
    async fn spawn_peer(payload: &'static [u8]) -> String {
        let keypair = Arc::new(Ed25519KeyPair::generate());
        let router = Router::new()
            .route(
                "/proposals",
                post(
                    move |State(keypair): State<Arc<Ed25519KeyPair>>,
                          Json(signed): Json<SignedProposal>| async move {
                        let message =
                            endorsement_message(&signed.proposal.tx_id, STATUS_OK, payload);
                        Json(EndorsementResponse {
                            peer: PeerId("remote".into()),
                            status: STATUS_OK,
                            message: String::new(),
                            payload: payload.to_vec(),
                            endorsement: Endorsement {
                                endorser: keypair.public_key(),
                                signature: keypair.sign(&message),
                            },
                        })
                    },
                ),
            )
            .with_state(keypair);
        serve(bind().await, router).await
    }

    /// Ordering service that answers `status` and, when accepting, posts the
    /// commit event to the gateway shortly after.
    async fn spawn_orderer(status: StatusCode, gateway_url: String) -> String {
        let router = Router::new().route(
            "/broadcast",
            post(move |Json(envelope): Json<TransactionEnvelope>| async move {
                if status != StatusCode::OK {
                    return (status, Json(json!({})));
                }
                let url = format!("{gateway_url}/events/commit");
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let event = CommitEvent {
                        tx_id: envelope.tx_id,
                        block_number: 1,
                        validation_code: ValidationCode::Valid,
                    };
                    let _ = reqwest::Client::new().post(url).json(&event).send().await;
                });
                let ack = BroadcastAck {
                    status: STATUS_OK,
                    info: "SUCCESS".into(),
                };
                (StatusCode::OK, Json(json!(ack)))
            }),
        );
        serve(bind().await, router).await
    }

    /// Start a gateway over two peers and an orderer answering `orderer_status`.
    async fn spawn_gateway(orderer_status: StatusCode) -> String {
        let listener = bind().await;
        let gateway_url = format!("http://{}", listener.local_addr().unwrap());

        let timeout = Duration::from_secs(2);
        let mut peers: Vec<Arc<dyn EndorsingPeer>> = Vec::new();
        for _ in 0..2 {
            let url = spawn_peer(b"90").await;
            peers.push(Arc::new(HttpEndorsingPeer::new(&url, timeout).unwrap()));
        }
        let orderer_url = spawn_orderer(orderer_status, gateway_url.clone()).await;

        let hub = Arc::new(InMemoryEventHub::new());
        let identity = Arc::new(KeyStoreIdentityProvider::new(
            Arc::new(InMemoryKeyValueStore::new()),
            "admin",
            "Org1MSP",
            true,
        ));
        let config = CoordinatorConfig {
            peer_request_timeout: timeout,
            commit_wait_time: Duration::from_secs(3),
            deployment: Some(DeploymentSpec {
                chaincode_path: "github.com/gochain".into(),
                dockerfile_contents: "FROM scratch".into(),
            }),
            ..CoordinatorConfig::default()
        };
        let coordinator = TransactionCoordinator::new(
            config,
            identity,
            peers,
            Arc::new(HttpOrderer::new(&orderer_url, timeout).unwrap()),
            Arc::clone(&hub),
        );

        serve(listener, build_router(AppState::new(Arc::new(coordinator), hub))).await
    }

    #[tokio::test]
    async fn test_invoke_round_trip_over_http() {
        let gateway = spawn_gateway(StatusCode::OK).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/invoke"))
            .json(&json!({ "data": ["a", "b", "10"] }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let health: serde_json::Value = reqwest::get(format!("{gateway}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["committed"], 1);
        assert_eq!(health["pending_watches"], 0);
    }

    #[tokio::test]
    async fn test_query_over_http() {
        let gateway = spawn_gateway(StatusCode::OK).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/query"))
            .json(&json!({ "data": ["a"] }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().await.unwrap(), "90");
    }

    #[tokio::test]
    async fn test_deploy_refusal_status_reaches_caller() {
        let gateway = spawn_gateway(StatusCode::SERVICE_UNAVAILABLE).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/deploy"))
            .json(&json!({ "data": ["a", "100", "b", "200"] }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 503);
    }
}
