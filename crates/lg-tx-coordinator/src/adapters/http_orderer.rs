//! Ordering service reached over HTTP/JSON.

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::ports::OrderingService;
use async_trait::async_trait;
use reqwest::Client;
use shared_types::{BroadcastAck, TransactionEnvelope};
use std::time::Duration;
use tracing::debug;

/// Orderer endpoint accepting `POST {orderer_url}/broadcast`.
///
/// The acknowledgement body carries the ordering status. A bare non-2xx
/// reply without a parseable body is reported with the HTTP status as code.
pub struct HttpOrderer {
    endpoint: String,
    client: Client,
}

impl HttpOrderer {
    pub fn new(orderer_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(2)))
            .build()?;

        Ok(Self {
            endpoint: format!("{}/broadcast", orderer_url.trim_end_matches('/')),
            client,
        })
    }
}

#[async_trait]
impl OrderingService for HttpOrderer {
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> CoordinatorResult<BroadcastAck> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(envelope)
            .send()
            .await
            .map_err(|e| CoordinatorError::OrdererUnreachable {
                reason: e.to_string(),
            })?;

        let http_status = response.status();
        match response.json::<BroadcastAck>().await {
            Ok(ack) => {
                debug!(tx_id = %envelope.tx_id, status = ack.status, "Broadcast acknowledged");
                Ok(ack)
            }
            Err(_) if !http_status.is_success() => Ok(BroadcastAck {
                status: http_status.as_u16(),
                info: http_status
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string(),
            }),
            Err(e) => Err(CoordinatorError::OrdererUnreachable {
                reason: format!("malformed acknowledgement: {e}"),
            }),
        }
    }
}
