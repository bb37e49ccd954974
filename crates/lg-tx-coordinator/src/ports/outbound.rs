//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::Principal;
use crate::error::{CoordinatorResult, StoreError};
use async_trait::async_trait;
use shared_bus::{CommitCallback, SubscriptionError, SubscriptionHandle};
use shared_types::{
    BroadcastAck, EndorsementResponse, PeerId, SignedProposal, TransactionEnvelope, TxId,
};

/// Source of the submitting identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the principal that signs every request.
    ///
    /// Fails with `AuthError` when no usable identity exists.
    async fn get_submitter(&self) -> CoordinatorResult<Principal>;
}

/// One endorsing peer.
#[async_trait]
pub trait EndorsingPeer: Send + Sync {
    /// Stable identity of this peer.
    fn id(&self) -> &PeerId;

    /// Simulate the proposal and return a signed response.
    ///
    /// A non-success chaincode status is a normal response, not an error.
    /// Transport failures surface as `PeerUnreachable`.
    async fn process_proposal(
        &self,
        proposal: &SignedProposal,
    ) -> CoordinatorResult<EndorsementResponse>;
}

/// Ordering service.
#[async_trait]
pub trait OrderingService: Send + Sync {
    /// Submit an envelope for ordering.
    ///
    /// A non-success acknowledgement is returned as `Ok`. Only transport
    /// failures surface as `OrdererUnreachable`.
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> CoordinatorResult<BroadcastAck>;
}

/// Commit event stream.
///
/// Callbacks fire at most once, with either the commit event for their
/// transaction or `ConnectionLost`.
#[async_trait]
pub trait CommitEventSource: Send + Sync {
    /// Open the stream. Idempotent.
    async fn connect(&self) -> Result<(), SubscriptionError>;

    /// Close the stream, failing every outstanding callback with `ConnectionLost`.
    async fn disconnect(&self);

    fn is_connected(&self) -> bool;

    /// Register interest in the commit of `tx_id`.
    async fn register_commit_callback(
        &self,
        tx_id: TxId,
        callback: CommitCallback,
    ) -> Result<SubscriptionHandle, SubscriptionError>;

    /// Drop a registration. Returns false if it already fired or was removed.
    async fn unregister(&self, handle: &SubscriptionHandle) -> bool;
}

/// String key-value store backing enrolled identities.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;
}
