//! # Endorsement Collector
//!
//! Sends one signed proposal to every configured peer concurrently and
//! gathers what comes back. Each exchange is bounded by its own timeout, so
//! a silent peer costs at most one timeout and never blocks the others.
//!
//! Every response is signed over its status as well as its payload, so an
//! error status is checked like a success.
//!
//! Unreachable peers and endorsements that fail verification are recorded
//! as failures and excluded from the response set; the reconciler decides
//! whether what is left is enough.

use crate::domain::verify_endorsement;
use crate::error::CoordinatorError;
use crate::ports::EndorsingPeer;
use futures::future::join_all;
use shared_types::{EndorsementResponse, PeerId, SignedProposal};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A peer that produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerFailure {
    pub peer: PeerId,
    pub error: CoordinatorError,
}

/// Everything gathered for one proposal.
#[derive(Debug, Clone, Default)]
pub struct EndorsementCollection {
    /// Responses in fan-out (peer configuration) order.
    pub responses: Vec<EndorsementResponse>,
    /// Arrival rank of each entry in `responses` (0 = first to arrive).
    arrival: Vec<usize>,
    /// Peers that failed, in fan-out order.
    pub failures: Vec<PeerFailure>,
}

impl EndorsementCollection {
    pub fn responded(&self) -> usize {
        self.responses.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Responses ordered by when they arrived.
    pub fn in_arrival_order(&self) -> Vec<&EndorsementResponse> {
        let mut indexed: Vec<(usize, &EndorsementResponse)> = self
            .arrival
            .iter()
            .copied()
            .zip(self.responses.iter())
            .collect();
        indexed.sort_by_key(|(rank, _)| *rank);
        indexed.into_iter().map(|(_, r)| r).collect()
    }

    /// The successful response that arrived last.
    pub fn last_arrived_success(&self) -> Option<&EndorsementResponse> {
        self.in_arrival_order()
            .into_iter()
            .rev()
            .find(|r| r.is_success())
    }

    /// The response that arrived last, successful or not.
    pub fn last_arrived(&self) -> Option<&EndorsementResponse> {
        self.in_arrival_order().into_iter().last()
    }
}

/// Concurrent fan-out to the configured endorsing peers.
pub struct EndorsementCollector {
    peers: Vec<Arc<dyn EndorsingPeer>>,
    per_call_timeout: Duration,
    verify_endorsements: bool,
}

impl EndorsementCollector {
    pub fn new(
        peers: Vec<Arc<dyn EndorsingPeer>>,
        per_call_timeout: Duration,
        verify_endorsements: bool,
    ) -> Self {
        Self {
            peers,
            per_call_timeout,
            verify_endorsements,
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Dispatch `signed` to every peer and wait for all of them to answer,
    /// fail or time out.
    pub async fn collect(&self, signed: &SignedProposal) -> EndorsementCollection {
        let tx_id = &signed.proposal.tx_id;
        let arrivals = AtomicUsize::new(0);

        let calls = self.peers.iter().map(|peer| {
            let arrivals = &arrivals;
            async move {
                let peer_id = peer.id().clone();
                let result =
                    match tokio::time::timeout(self.per_call_timeout, peer.process_proposal(signed))
                        .await
                    {
                        Ok(Ok(mut response)) => {
                            response.peer = peer_id.clone();
                            if self.verify_endorsements && !verify_endorsement(&response, tx_id)
                            {
                                Err(CoordinatorError::InvalidEndorsement {
                                    peer: peer_id.clone(),
                                })
                            } else {
                                Ok(response)
                            }
                        }
                        Ok(Err(e)) => Err(e),
                        Err(_) => Err(CoordinatorError::PeerUnreachable {
                            peer: peer_id.clone(),
                            reason: format!(
                                "no response within {}ms",
                                self.per_call_timeout.as_millis()
                            ),
                        }),
                    };
                let rank = arrivals.fetch_add(1, Ordering::SeqCst);
                (peer_id, rank, result)
            }
        });

        let mut collection = EndorsementCollection::default();
        for (peer, rank, result) in join_all(calls).await {
            match result {
                Ok(response) => {
                    debug!(
                        tx_id = %tx_id,
                        peer = %peer,
                        status = response.status,
                        arrival = rank,
                        "Endorsement received"
                    );
                    collection.responses.push(response);
                    collection.arrival.push(rank);
                }
                Err(error) => {
                    warn!(tx_id = %tx_id, peer = %peer, error = %error, "Peer produced no endorsement");
                    collection.failures.push(PeerFailure { peer, error });
                }
            }
        }
        collection
    }
}
