//! # Endorsement Reconciler
//!
//! Turns the set of endorsement responses for one proposal into a single
//! verdict. Every response is considered; the result never depends on which
//! peer happened to answer last.
//!
//! ## Algorithm
//!
//! 1. No responses at all fails with `NoResponses`
//! 2. The first non-success status (in fan-out order) fails with `ErrorStatus`
//! 3. Responses are grouped by identical `(status, payload)`
//! 4. Two or more groups sharing the largest size fail with `Tie`
//! 5. The largest group must satisfy the endorsement policy
//!
//! A successful result carries the agreed payload and the endorsements of
//! every agreeing peer, in fan-out order.

use crate::config::EndorsementPolicy;
use serde::{Deserialize, Serialize};
use shared_types::{Endorsement, EndorsementResponse, PeerId};
use std::collections::BTreeMap;
use std::fmt;

/// Verdict of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileStatus {
    Success,
    Failure,
}

/// Why a set of responses could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationFailure {
    /// Every peer was unreachable.
    NoResponses,
    /// A peer answered with a non-success status.
    ErrorStatus {
        peer: PeerId,
        status: u16,
        message: String,
    },
    /// The largest agreeing group is smaller than the policy requires.
    InsufficientAgreement {
        agreeing: usize,
        required: usize,
        divergent_peer: Option<PeerId>,
    },
    /// No unique majority payload.
    Tie { groups: usize, size: usize },
}

impl fmt::Display for ReconciliationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationFailure::NoResponses => write!(f, "no endorsement responses"),
            ReconciliationFailure::ErrorStatus {
                peer,
                status,
                message,
            } => write!(f, "peer {peer} returned status {status}: {message}"),
            ReconciliationFailure::InsufficientAgreement {
                agreeing,
                required,
                divergent_peer,
            } => {
                write!(f, "{agreeing} of {required} required endorsements agree")?;
                if let Some(peer) = divergent_peer {
                    write!(f, " (peer {peer} diverged)")?;
                }
                Ok(())
            }
            ReconciliationFailure::Tie { groups, size } => {
                write!(f, "{groups} divergent payloads with {size} endorsements each")
            }
        }
    }
}

/// Outcome of reconciling one proposal's responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledResult {
    pub status: ReconcileStatus,
    /// Agreed payload; empty on failure.
    pub payload: Vec<u8>,
    /// Endorsements of the agreeing peers, in fan-out order.
    pub endorsements: Vec<Endorsement>,
    /// Peers whose responses agree with the payload.
    pub agreeing: Vec<PeerId>,
    pub failure: Option<ReconciliationFailure>,
}

impl ReconciledResult {
    fn failed(failure: ReconciliationFailure) -> Self {
        Self {
            status: ReconcileStatus::Failure,
            payload: Vec::new(),
            endorsements: Vec::new(),
            agreeing: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReconcileStatus::Success
    }

    /// Convert to a `Result`, surfacing the failure reason.
    pub fn into_result(self) -> Result<Self, ReconciliationFailure> {
        match self.failure.clone() {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }
}

/// Reconcile `responses` (in fan-out order) under `policy`.
pub fn reconcile(responses: &[EndorsementResponse], policy: EndorsementPolicy) -> ReconciledResult {
    if responses.is_empty() {
        return ReconciledResult::failed(ReconciliationFailure::NoResponses);
    }

    if let Some(bad) = responses.iter().find(|r| !r.is_success()) {
        return ReconciledResult::failed(ReconciliationFailure::ErrorStatus {
            peer: bad.peer.clone(),
            status: bad.status,
            message: bad.message.clone(),
        });
    }

    // (status, payload) -> indices into `responses`
    let mut groups: BTreeMap<(u16, &[u8]), Vec<usize>> = BTreeMap::new();
    for (index, response) in responses.iter().enumerate() {
        groups
            .entry((response.status, response.payload.as_slice()))
            .or_default()
            .push(index);
    }

    let largest = groups.values().map(Vec::len).max().unwrap_or(0);
    let leaders: Vec<&Vec<usize>> = groups.values().filter(|g| g.len() == largest).collect();
    if leaders.len() > 1 {
        return ReconciledResult::failed(ReconciliationFailure::Tie {
            groups: leaders.len(),
            size: largest,
        });
    }
    let Some(winner) = leaders.first() else {
        return ReconciledResult::failed(ReconciliationFailure::NoResponses);
    };

    let required = match policy {
        EndorsementPolicy::AllSuccessful => responses.len(),
        EndorsementPolicy::AtLeast(n) => n.max(1),
    };
    if winner.len() < required {
        let divergent_peer = (0..responses.len())
            .find(|i| !winner.contains(i))
            .map(|i| responses[i].peer.clone());
        return ReconciledResult::failed(ReconciliationFailure::InsufficientAgreement {
            agreeing: winner.len(),
            required,
            divergent_peer,
        });
    }

    let first = &responses[winner[0]];
    ReconciledResult {
        status: ReconcileStatus::Success,
        payload: first.payload.clone(),
        endorsements: winner
            .iter()
            .map(|&i| responses[i].endorsement.clone())
            .collect(),
        agreeing: winner.iter().map(|&i| responses[i].peer.clone()).collect(),
        failure: None,
    }
}
