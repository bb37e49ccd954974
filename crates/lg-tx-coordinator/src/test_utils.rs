//! Test utilities for the transaction coordinator.
//!
//! Scriptable stand-ins for the outbound ports: endorsing peers, an ordering
//! service that can emit the commit event itself, and a fixed submitter.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use lg_tx_coordinator::test_utils::MockEndorsingPeer;
//!
//! let peer = MockEndorsingPeer::responding("peer0", b"value");
//! assert_eq!(peer.calls(), 0);
//! ```

use crate::domain::{endorsement_message, Principal};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::ports::outbound::{EndorsingPeer, IdentityProvider, OrderingService};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{CommitEventPublisher, InMemoryEventHub};
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    BroadcastAck, CommitEvent, Endorsement, EndorsementResponse, PeerId, SignedProposal,
    TransactionEnvelope, ValidationCode, STATUS_OK,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a mock peer answers.
#[derive(Debug, Clone)]
pub enum PeerBehaviour {
    /// Answer with this status and payload.
    Respond { status: u16, payload: Vec<u8> },
    /// Fail at the transport level.
    Unreachable,
    /// Never answer.
    Hang,
}

/// Endorsing peer with scripted answers and a real signing key.
pub struct MockEndorsingPeer {
    id: PeerId,
    keypair: Ed25519KeyPair,
    behaviour: Mutex<PeerBehaviour>,
    delay: Duration,
    forge: bool,
    calls: AtomicUsize,
}

impl MockEndorsingPeer {
    pub fn new(id: &str, behaviour: PeerBehaviour) -> Self {
        Self {
            id: PeerId(id.to_string()),
            keypair: Ed25519KeyPair::generate(),
            behaviour: Mutex::new(behaviour),
            delay: Duration::ZERO,
            forge: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Peer that endorses `payload` with status 200.
    pub fn responding(id: &str, payload: &[u8]) -> Self {
        Self::with_status(id, STATUS_OK, payload)
    }

    pub fn with_status(id: &str, status: u16, payload: &[u8]) -> Self {
        Self::new(
            id,
            PeerBehaviour::Respond {
                status,
                payload: payload.to_vec(),
            },
        )
    }

    pub fn unreachable(id: &str) -> Self {
        Self::new(id, PeerBehaviour::Unreachable)
    }

    pub fn hanging(id: &str) -> Self {
        Self::new(id, PeerBehaviour::Hang)
    }

    /// Answer only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sign something other than the response, so verification fails.
    pub fn with_forged_endorsement(mut self) -> Self {
        self.forge = true;
        self
    }

    pub fn set_behaviour(&self, behaviour: PeerBehaviour) {
        *self.behaviour.lock() = behaviour;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EndorsingPeer for MockEndorsingPeer {
    fn id(&self) -> &PeerId {
        &self.id
    }

    async fn process_proposal(
        &self,
        proposal: &SignedProposal,
    ) -> CoordinatorResult<EndorsementResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let behaviour = self.behaviour.lock().clone();
        match behaviour {
            PeerBehaviour::Respond { status, payload } => {
                let message = if self.forge {
                    endorsement_message(&proposal.proposal.tx_id, status, b"forged")
                } else {
                    endorsement_message(&proposal.proposal.tx_id, status, &payload)
                };
                Ok(EndorsementResponse {
                    peer: self.id.clone(),
                    status,
                    message: if status == STATUS_OK {
                        String::new()
                    } else {
                        "chaincode error".to_string()
                    },
                    payload,
                    endorsement: Endorsement {
                        endorser: self.keypair.public_key(),
                        signature: self.keypair.sign(&message),
                    },
                })
            }
            PeerBehaviour::Unreachable => Err(CoordinatorError::PeerUnreachable {
                peer: self.id.clone(),
                reason: "connection refused".to_string(),
            }),
            PeerBehaviour::Hang => std::future::pending().await,
        }
    }
}

/// Ordering service that records envelopes and answers with a fixed status.
///
/// With an attached hub it also plays the ledger: after the configured delay it
/// publishes the commit event for every accepted envelope.
pub struct MockOrderer {
    status: u16,
    unreachable: bool,
    received: Mutex<Vec<TransactionEnvelope>>,
    ledger: Option<(Arc<InMemoryEventHub>, Duration, ValidationCode)>,
    next_block: AtomicU64,
}

impl MockOrderer {
    pub fn accepting() -> Self {
        Self::with_status(STATUS_OK)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            unreachable: false,
            received: Mutex::new(Vec::new()),
            ledger: None,
            next_block: AtomicU64::new(1),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::accepting()
        }
    }

    /// Publish a commit event to `hub` `delay` after each accepted broadcast.
    pub fn committing_to(mut self, hub: Arc<InMemoryEventHub>, delay: Duration) -> Self {
        self.ledger = Some((hub, delay, ValidationCode::Valid));
        self
    }

    /// Like `committing_to`, with a fixed validation verdict.
    pub fn committing_with_code(
        mut self,
        hub: Arc<InMemoryEventHub>,
        delay: Duration,
        code: ValidationCode,
    ) -> Self {
        self.ledger = Some((hub, delay, code));
        self
    }

    pub fn received(&self) -> Vec<TransactionEnvelope> {
        self.received.lock().clone()
    }

    pub fn broadcast_count(&self) -> usize {
        self.received.lock().len()
    }
}

#[async_trait]
impl OrderingService for MockOrderer {
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> CoordinatorResult<BroadcastAck> {
        if self.unreachable {
            return Err(CoordinatorError::OrdererUnreachable {
                reason: "connection refused".to_string(),
            });
        }
        self.received.lock().push(envelope.clone());

        let status = self.status;
        let ack = BroadcastAck {
            status,
            info: if status == STATUS_OK {
                "SUCCESS".to_string()
            } else {
                "SERVICE_UNAVAILABLE".to_string()
            },
        };

        if ack.is_accepted() {
            if let Some((hub, delay, code)) = &self.ledger {
                let event = CommitEvent {
                    tx_id: envelope.tx_id.clone(),
                    block_number: self.next_block.fetch_add(1, Ordering::SeqCst),
                    validation_code: *code,
                };
                let hub = Arc::clone(hub);
                let delay = *delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    hub.publish(event).await;
                });
            }
        }
        Ok(ack)
    }
}

/// Identity provider returning a fixed principal, or failing on demand.
pub struct StaticIdentityProvider {
    principal: Option<Principal>,
}

impl StaticIdentityProvider {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    /// Provider with a freshly generated admin identity.
    pub fn generated() -> Self {
        Self::new(Principal::new("Org1MSP", "admin", Ed25519KeyPair::generate()))
    }

    /// Provider with no enrolled identity.
    pub fn missing() -> Self {
        Self { principal: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_submitter(&self) -> CoordinatorResult<Principal> {
        self.principal
            .clone()
            .ok_or_else(|| CoordinatorError::AuthError {
                reason: "no enrolled submitter".to_string(),
            })
    }
}
