//! # Core Domain Entities
//!
//! Wire-level entities exchanged between the gateway, endorsing peers,
//! the ordering service and the commit event stream.
//!
//! ## Clusters
//!
//! - **Identifiers**: `TxId`, `Nonce`, `ChannelId`, `ChaincodeId`, `PeerId`
//! - **Proposal**: `ProposalRequest`, `SignedProposal`, `DeploymentSpec`
//! - **Endorsement**: `EndorsementResponse`, `Endorsement`
//! - **Ordering & Commit**: `TransactionEnvelope`, `BroadcastAck`, `CommitEvent`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Length of a proposal nonce in bytes.
pub const NONCE_LENGTH: usize = 24;

/// Status code a peer or orderer returns for an accepted request.
pub const STATUS_OK: u16 = 200;

/// Transaction identifier.
///
/// Lowercase hex of `SHA-256(nonce || creator public key)`. Correlates the
/// proposal, the ordered transaction and the commit event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Wrap an already-computed identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use anti-replay value bound to one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(pub [u8; NONCE_LENGTH]);

impl Nonce {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }
}

/// Channel the transaction is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

/// Chaincode (smart contract) the proposal targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChaincodeId(pub String);

/// Identity of an endorsing peer (its configured name or endpoint URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the principal that created and signed a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Membership service provider the principal belongs to.
    pub msp_id: String,
    /// Enrollment name.
    pub name: String,
    /// Ed25519 verification key.
    pub public_key: PublicKey,
}

// =============================================================================
// CLUSTER B: PROPOSAL
// =============================================================================

/// The three caller-facing request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    /// State-changing chaincode invocation.
    Invoke,
    /// Read-only chaincode query.
    Query,
    /// Chaincode install + init.
    Deploy,
}

impl ProposalKind {
    /// Whether the request ends in an ordered, committed transaction.
    pub fn is_state_changing(&self) -> bool {
        !matches!(self, ProposalKind::Query)
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalKind::Invoke => "invoke",
            ProposalKind::Query => "query",
            ProposalKind::Deploy => "deploy",
        };
        f.write_str(name)
    }
}

/// Deployment payload attached to a `Deploy` proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Source path of the chaincode package.
    pub chaincode_path: String,
    /// Container build instructions for the chaincode runtime.
    pub dockerfile_contents: String,
}

/// A fully-formed operation request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub kind: ProposalKind,
    pub channel_id: ChannelId,
    pub chaincode_id: ChaincodeId,
    pub function: String,
    pub args: Vec<String>,
    pub tx_id: TxId,
    pub nonce: Nonce,
    pub deployment: Option<DeploymentSpec>,
}

/// Proposal plus the creator's signature over its canonical encoding.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProposal {
    pub proposal: ProposalRequest,
    pub creator: Creator,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

// =============================================================================
// CLUSTER C: ENDORSEMENT
// =============================================================================

/// A peer's signature over the simulated result.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub endorser: PublicKey,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// One peer's answer to a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementResponse {
    /// Peer that produced the response.
    pub peer: PeerId,
    /// Application-level status reported by the chaincode.
    pub status: u16,
    /// Diagnostic message accompanying the status.
    #[serde(default)]
    pub message: String,
    /// Simulated result (read/write set or query result).
    pub payload: Vec<u8>,
    pub endorsement: Endorsement,
}

impl EndorsementResponse {
    /// Whether the chaincode reported success.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

// =============================================================================
// CLUSTER D: ORDERING & COMMIT
// =============================================================================

/// Reconciled transaction submitted to the ordering service.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub tx_id: TxId,
    pub channel_id: ChannelId,
    pub proposal: SignedProposal,
    pub payload: Vec<u8>,
    pub endorsements: Vec<Endorsement>,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// Ordering service acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastAck {
    pub status: u16,
    #[serde(default)]
    pub info: String,
}

impl BroadcastAck {
    /// Whether the transaction was accepted for ordering.
    pub fn is_accepted(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Validation verdict the committing peer recorded for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    Valid,
    EndorsementPolicyFailure,
    MvccReadConflict,
    DuplicateTxid,
    /// Any verdict not listed above.
    #[serde(other)]
    InvalidOther,
}

impl ValidationCode {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationCode::Valid)
    }
}

/// Notification that a transaction was written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitEvent {
    pub tx_id: TxId,
    pub block_number: u64,
    pub validation_code: ValidationCode,
}
