//! Request outcomes returned to callers.

use crate::error::CoordinatorError;
use shared_types::{PeerId, TxId, ValidationCode};

/// Final outcome of a state-changing request.
///
/// Every submitted request ends in exactly one of these, and only
/// `Committed` with a `Valid` code counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The commit event arrived before the deadline.
    Committed {
        tx_id: TxId,
        block_number: u64,
        validation_code: ValidationCode,
    },
    /// The deadline passed first. The transaction may still commit later.
    TimedOut { tx_id: TxId },
    /// The ordering service declined the transaction; no commit was awaited.
    SubmissionRejected { tx_id: TxId, code: u16 },
    /// The request aborted before reaching the ordering service.
    Error(CoordinatorError),
}

impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            CommitOutcome::Committed {
                validation_code: ValidationCode::Valid,
                ..
            }
        )
    }

    /// Transaction id, if the request got far enough to mint one.
    pub fn tx_id(&self) -> Option<&TxId> {
        match self {
            CommitOutcome::Committed { tx_id, .. }
            | CommitOutcome::TimedOut { tx_id }
            | CommitOutcome::SubmissionRejected { tx_id, .. } => Some(tx_id),
            CommitOutcome::Error(_) => None,
        }
    }
}

impl CommitOutcome {
    /// The error that ended the request before a commit wait, if any.
    ///
    /// An ordering refusal is reported as `OrderingRejected`.
    pub fn error(&self) -> Option<CoordinatorError> {
        match self {
            CommitOutcome::SubmissionRejected { code, .. } => {
                Some(CoordinatorError::OrderingRejected { code: *code })
            }
            CommitOutcome::Error(e) => Some(e.clone()),
            CommitOutcome::Committed { .. } | CommitOutcome::TimedOut { .. } => None,
        }
    }
}

impl From<CoordinatorError> for CommitOutcome {
    fn from(err: CoordinatorError) -> Self {
        CommitOutcome::Error(err)
    }
}

/// Result of a read-only query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub tx_id: TxId,
    /// Peer whose payload was selected.
    pub peer: PeerId,
    pub payload: Vec<u8>,
    /// Peers that answered.
    pub responded: usize,
    /// Peers that were unreachable or failed verification.
    pub failed: usize,
}
