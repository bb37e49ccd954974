//! Proposal Builder
//!
//! Turns a caller request into an immutable `ProposalRequest` with a freshly
//! minted nonce and transaction id, and signs it on behalf of the submitter.

use crate::config::CoordinatorConfig;
use crate::domain::args::coerce_args;
use crate::domain::identity::Principal;
use crate::domain::replay::NonceRegistry;
use crate::error::{CoordinatorError, CoordinatorResult};
use parking_lot::Mutex;
use serde_json::Value;
use shared_crypto::{compute_tx_id, random_nonce};
use shared_types::{Nonce, ProposalKind, ProposalRequest, SignedProposal};
use tracing::{debug, warn};

/// Fresh draws attempted before giving up on a nonce.
const MAX_NONCE_ATTEMPTS: usize = 4;

pub struct ProposalBuilder {
    config: CoordinatorConfig,
    nonces: Mutex<NonceRegistry>,
}

impl ProposalBuilder {
    pub fn new(config: CoordinatorConfig) -> Self {
        let nonces = NonceRegistry::with_config(
            config.replay_window_secs,
            NonceRegistry::DEFAULT_GC_INTERVAL,
        );
        Self {
            config,
            nonces: Mutex::new(nonces),
        }
    }

    /// Build a proposal of `kind` for `creator` from the caller's raw arguments.
    ///
    /// # Errors
    ///
    /// - `InvalidArguments` - `data` is not an ordered scalar list, or a
    ///   deployment was requested without a configured chaincode package
    pub fn build(
        &self,
        kind: ProposalKind,
        data: &Value,
        creator: &Principal,
    ) -> CoordinatorResult<ProposalRequest> {
        let args = coerce_args(data)?;

        let deployment = match kind {
            ProposalKind::Deploy => Some(self.config.deployment.clone().ok_or_else(|| {
                CoordinatorError::InvalidArguments {
                    reason: "deployment requested but no chaincode package is configured"
                        .to_string(),
                }
            })?),
            ProposalKind::Invoke | ProposalKind::Query => None,
        };

        let nonce = self.mint_nonce()?;
        let tx_id = compute_tx_id(&nonce, &creator.public_key());

        debug!(tx_id = %tx_id, kind = %kind, args = args.len(), "Built proposal");

        Ok(ProposalRequest {
            kind,
            channel_id: self.config.channel_id.clone(),
            chaincode_id: self.config.chaincode_id.clone(),
            function: self.config.functions.for_kind(kind).to_string(),
            args,
            tx_id,
            nonce,
            deployment,
        })
    }

    fn mint_nonce(&self) -> CoordinatorResult<Nonce> {
        let mut registry = self.nonces.lock();
        for _ in 0..MAX_NONCE_ATTEMPTS {
            let nonce = random_nonce();
            match registry.claim(nonce) {
                Ok(()) => return Ok(nonce),
                Err(e) => warn!(error = %e, "Nonce collision, drawing again"),
            }
        }
        Err(CoordinatorError::Encoding {
            reason: "could not mint an unused nonce".to_string(),
        })
    }
}

/// Sign a proposal's canonical encoding as `principal`.
pub fn sign_proposal(
    proposal: ProposalRequest,
    principal: &Principal,
) -> CoordinatorResult<SignedProposal> {
    let bytes = bincode::serialize(&proposal)?;
    let signature = principal.sign(&bytes);
    Ok(SignedProposal {
        proposal,
        creator: principal.creator().clone(),
        signature,
    })
}

/// Check the creator's signature over a signed proposal.
pub fn verify_proposal(signed: &SignedProposal) -> CoordinatorResult<bool> {
    let bytes = bincode::serialize(&signed.proposal)?;
    Ok(shared_crypto::verify(&signed.creator.public_key, &bytes, &signed.signature).is_ok())
}
