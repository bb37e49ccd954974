//! Transaction Coordinator - request lifecycle orchestration
//!
//! ```text
//! build ─→ sign ─→ collect ─→ reconcile ─→ envelope ─→ broadcast ─→ watch
//!   │                            │                         │          │
//!   └── InvalidArguments         └── ReconciliationFailure  │          ├─→ Committed
//!       AuthError                                           │          └─→ TimedOut
//!                                                           └─→ SubmissionRejected
//! ```
//!
//! Everything before the broadcast aborts the request with an error and never
//! opens a subscription or a timer. Once the ordering service accepts, the
//! request is Pending and can only end Committed or TimedOut.

pub mod collector;
pub mod watcher;

pub use collector::{EndorsementCollection, EndorsementCollector, PeerFailure};
pub use watcher::{CommitWatcher, ConnectionLease, EventConnection, WatcherStats};

use crate::config::{CoordinatorConfig, QueryPolicy};
use crate::domain::{
    build_envelope, reconcile, sign_proposal, CommitOutcome, ProposalBuilder, QueryResponse,
    ReconciliationFailure,
};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::ports::inbound::{CommitWatchStats, TransactionApi};
use crate::ports::outbound::{CommitEventSource, EndorsingPeer, IdentityProvider, OrderingService};
use async_trait::async_trait;
use serde_json::Value;
use shared_types::{ProposalKind, TransactionEnvelope};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Transaction coordinator.
///
/// Holds the process-wide handles (identity, peers, orderer, event stream)
/// built once at startup and shared read-only by every request.
pub struct TransactionCoordinator<I, O, E> {
    inner: Arc<Inner<I, O, E>>,
}

struct Inner<I, O, E> {
    config: CoordinatorConfig,
    identity: Arc<I>,
    builder: ProposalBuilder,
    collector: EndorsementCollector,
    orderer: Arc<O>,
    watcher: CommitWatcher<E>,
}

impl<I, O, E> TransactionCoordinator<I, O, E>
where
    I: IdentityProvider + 'static,
    O: OrderingService + 'static,
    E: CommitEventSource + 'static,
{
    pub fn new(
        config: CoordinatorConfig,
        identity: Arc<I>,
        peers: Vec<Arc<dyn EndorsingPeer>>,
        orderer: Arc<O>,
        events: Arc<E>,
    ) -> Self {
        let collector = EndorsementCollector::new(
            peers,
            config.peer_request_timeout,
            config.verify_endorsements,
        );
        let watcher = CommitWatcher::new(events, config.commit_wait_time);
        let builder = ProposalBuilder::new(config.clone());

        Self {
            inner: Arc::new(Inner {
                config,
                identity,
                builder,
                collector,
                orderer,
                watcher,
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn watcher(&self) -> &CommitWatcher<E> {
        &self.inner.watcher
    }

    /// Run a state-changing request to a terminal outcome.
    ///
    /// The lifecycle runs on its own task, so a caller that stops waiting
    /// cannot strand the event connection lease or the commit registration.
    async fn submit(&self, kind: ProposalKind, data: &Value) -> CommitOutcome {
        let inner = Arc::clone(&self.inner);
        let data = data.clone();
        match tokio::spawn(async move { inner.run_state_change(kind, &data).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(kind = %kind, error = %e, "Transaction lifecycle task failed");
                CommitOutcome::Error(CoordinatorError::Internal(e.to_string()))
            }
        }
    }
}

impl<I, O, E> Inner<I, O, E>
where
    I: IdentityProvider,
    O: OrderingService,
    E: CommitEventSource,
{
    async fn run_state_change(&self, kind: ProposalKind, data: &Value) -> CommitOutcome {
        let envelope = match self.prepare(kind, data).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Request aborted before submission");
                return CommitOutcome::Error(e);
            }
        };
        let tx_id = envelope.tx_id.clone();

        // Connect before broadcasting so the commit event cannot outrun us.
        let lease = match self.watcher.connection().acquire().await {
            Ok(lease) => lease,
            Err(e) => {
                warn!(tx_id = %tx_id, error = %e, "Event stream unavailable, not submitting");
                return CommitOutcome::Error(e.into());
            }
        };

        match self.orderer.broadcast(&envelope).await {
            Ok(ack) if ack.is_accepted() => {
                info!(tx_id = %tx_id, kind = %kind, "Transaction accepted for ordering");
                self.watcher.watch(tx_id, lease).await
            }
            Ok(ack) => {
                self.watcher.connection().release(lease).await;
                let rejection = CoordinatorError::OrderingRejected { code: ack.status };
                warn!(tx_id = %tx_id, error = %rejection, info = %ack.info, "Ordering service rejected transaction");
                CommitOutcome::SubmissionRejected {
                    tx_id,
                    code: ack.status,
                }
            }
            Err(e) => {
                self.watcher.connection().release(lease).await;
                error!(tx_id = %tx_id, error = %e, "Broadcast failed");
                CommitOutcome::Error(e)
            }
        }
    }

    /// Build, endorse and reconcile; returns the envelope ready to broadcast.
    async fn prepare(&self, kind: ProposalKind, data: &Value) -> CoordinatorResult<TransactionEnvelope> {
        let principal = self.identity.get_submitter().await?;
        let proposal = self.builder.build(kind, data, &principal)?;
        let tx_id = proposal.tx_id.clone();
        let signed = sign_proposal(proposal, &principal)?;

        info!(
            tx_id = %tx_id,
            kind = %kind,
            peers = self.collector.peer_count(),
            "Collecting endorsements"
        );
        let collection = self.collector.collect(&signed).await;

        let reconciled = reconcile(&collection.responses, self.config.endorsement_policy)
            .into_result()
            .map_err(|failure| {
                warn!(
                    tx_id = %tx_id,
                    reason = %failure,
                    responded = collection.responded(),
                    failed = collection.failed(),
                    "Endorsements could not be reconciled"
                );
                failure
            })?;

        build_envelope(signed, &reconciled, &principal)
    }

    async fn run_query(&self, data: &Value) -> CoordinatorResult<QueryResponse> {
        let principal = self.identity.get_submitter().await?;
        let proposal = self.builder.build(ProposalKind::Query, data, &principal)?;
        let tx_id = proposal.tx_id.clone();
        let signed = sign_proposal(proposal, &principal)?;

        let collection = self.collector.collect(&signed).await;
        let responded = collection.responded();
        let failed = collection.failed();

        match self.config.query_policy {
            QueryPolicy::LastReceived => {
                let Some(chosen) = collection.last_arrived_success() else {
                    let e = query_failure(&collection);
                    warn!(tx_id = %tx_id, error = %e, "Query produced no successful response");
                    return Err(e);
                };
                info!(tx_id = %tx_id, peer = %chosen.peer, responded, "Query answered");
                Ok(QueryResponse {
                    tx_id,
                    peer: chosen.peer.clone(),
                    payload: chosen.payload.clone(),
                    responded,
                    failed,
                })
            }
            QueryPolicy::RequireAgreement => {
                let reconciled =
                    reconcile(&collection.responses, self.config.endorsement_policy).into_result()?;
                let peer = reconciled
                    .agreeing
                    .first()
                    .cloned()
                    .ok_or(ReconciliationFailure::NoResponses)?;
                info!(tx_id = %tx_id, agreeing = reconciled.agreeing.len(), "Query answered");
                Ok(QueryResponse {
                    tx_id,
                    peer,
                    payload: reconciled.payload,
                    responded,
                    failed,
                })
            }
        }
    }
}

/// Error for a query that got no successful response.
fn query_failure(collection: &EndorsementCollection) -> CoordinatorError {
    if let Some(last) = collection.last_arrived() {
        return CoordinatorError::PeerRejected {
            peer: last.peer.clone(),
            status: last.status,
        };
    }
    match collection.failures.last() {
        Some(failure) => failure.error.clone(),
        None => ReconciliationFailure::NoResponses.into(),
    }
}

#[async_trait]
impl<I, O, E> TransactionApi for TransactionCoordinator<I, O, E>
where
    I: IdentityProvider + 'static,
    O: OrderingService + 'static,
    E: CommitEventSource + 'static,
{
    async fn submit_transaction(&self, data: &Value) -> CommitOutcome {
        self.submit(ProposalKind::Invoke, data).await
    }

    async fn submit_deployment(&self, data: &Value) -> CommitOutcome {
        self.submit(ProposalKind::Deploy, data).await
    }

    async fn query(&self, data: &Value) -> CoordinatorResult<QueryResponse> {
        self.inner.run_query(data).await
    }

    fn commit_watch_stats(&self) -> CommitWatchStats {
        self.inner.watcher.stats()
    }
}
