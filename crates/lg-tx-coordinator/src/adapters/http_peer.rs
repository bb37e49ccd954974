//! Endorsing peer reached over HTTP/JSON.

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::ports::EndorsingPeer;
use async_trait::async_trait;
use reqwest::Client;
use shared_types::{EndorsementResponse, PeerId, SignedProposal};
use std::time::Duration;
use tracing::debug;

/// Peer endpoint accepting `POST {peer_url}/proposals`.
pub struct HttpEndorsingPeer {
    id: PeerId,
    endpoint: String,
    client: Client,
}

impl HttpEndorsingPeer {
    /// Create a peer client. `timeout` bounds the whole exchange.
    pub fn new(peer_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(2)))
            .build()?;

        Ok(Self {
            id: PeerId(peer_url.to_string()),
            endpoint: format!("{}/proposals", peer_url.trim_end_matches('/')),
            client,
        })
    }
}

#[async_trait]
impl EndorsingPeer for HttpEndorsingPeer {
    fn id(&self) -> &PeerId {
        &self.id
    }

    async fn process_proposal(
        &self,
        proposal: &SignedProposal,
    ) -> CoordinatorResult<EndorsementResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(proposal)
            .send()
            .await
            .map_err(|e| CoordinatorError::PeerUnreachable {
                peer: self.id.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(peer = %self.id, http_status = status.as_u16(), "Peer refused proposal");
            return Err(CoordinatorError::PeerRejected {
                peer: self.id.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<EndorsementResponse>()
            .await
            .map_err(|e| CoordinatorError::PeerUnreachable {
                peer: self.id.clone(),
                reason: format!("malformed response: {e}"),
            })
    }
}
