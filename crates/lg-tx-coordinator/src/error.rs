//! Error types for the transaction coordinator

use crate::domain::reconcile::ReconciliationFailure;
use shared_bus::SubscriptionError;
use shared_types::PeerId;
use thiserror::Error;

/// Coordinator errors.
///
/// Everything before the ordering service accepts a transaction aborts the
/// request with one of these. After acceptance the request ends in
/// `CommitOutcome::Committed` or `CommitOutcome::TimedOut`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// Caller arguments cannot be coerced to an ordered string sequence
    #[error("Invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    /// No usable submitter identity
    #[error("Authentication failed: {reason}")]
    AuthError { reason: String },

    /// Peer did not answer (transport failure or per-call timeout)
    #[error("Peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: PeerId, reason: String },

    /// Peer refused the proposal
    #[error("Peer {peer} rejected proposal with status {status}")]
    PeerRejected { peer: PeerId, status: u16 },

    /// Peer answered but its endorsement signature does not verify
    #[error("Peer {peer} returned an endorsement that does not verify")]
    InvalidEndorsement { peer: PeerId },

    /// Endorsements disagree or fail the policy
    #[error("Reconciliation failed: {0}")]
    ReconciliationFailure(ReconciliationFailure),

    /// Ordering service declined the transaction
    #[error("Ordering service rejected transaction with status {code}")]
    OrderingRejected { code: u16 },

    /// Ordering service could not be reached
    #[error("Ordering service unreachable: {reason}")]
    OrdererUnreachable { reason: String },

    /// Event stream connection or registration failed
    #[error("Event subscription failed: {0}")]
    SubscriptionError(#[from] SubscriptionError),

    /// Canonical encoding for signing failed
    #[error("Encoding failed: {reason}")]
    Encoding { reason: String },

    /// The request task ended abnormally
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ReconciliationFailure> for CoordinatorError {
    fn from(failure: ReconciliationFailure) -> Self {
        CoordinatorError::ReconciliationFailure(failure)
    }
}

impl From<bincode::Error> for CoordinatorError {
    fn from(err: bincode::Error) -> Self {
        CoordinatorError::Encoding {
            reason: err.to_string(),
        }
    }
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Key-value store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Underlying I/O failed
    #[error("Store I/O failed for '{key}': {reason}")]
    Io { key: String, reason: String },

    /// Key contains characters the store cannot represent
    #[error("Invalid store key: {0}")]
    InvalidKey(String),
}
