//! Driving Ports (API - Inbound)

use crate::domain::{CommitOutcome, QueryResponse};
use crate::error::CoordinatorResult;
use async_trait::async_trait;
use serde_json::Value;

/// Point-in-time counters for the commit watcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitWatchStats {
    /// Watches begun after the ordering service accepted a transaction
    pub watches_started: u64,
    /// Watches resolved by a commit event
    pub committed: u64,
    /// Watches resolved by the deadline (or a lost event stream)
    pub timed_out: u64,
    /// Late resolutions that lost the race and were discarded
    pub ignored_resolutions: u64,
    /// Watches still in flight
    pub pending: u64,
}

impl CommitWatchStats {
    /// Watches that reached a terminal state.
    pub fn resolutions(&self) -> u64 {
        self.committed + self.timed_out
    }
}

/// Primary API of the transaction coordinator.
///
/// `data` is the caller's raw argument list; it is coerced to strings
/// before a proposal is built.
#[async_trait]
pub trait TransactionApi: Send + Sync {
    /// Endorse, order and await the commit of a state-changing invocation.
    async fn submit_transaction(&self, data: &Value) -> CommitOutcome;

    /// Same lifecycle as `submit_transaction` for a chaincode deployment.
    async fn submit_deployment(&self, data: &Value) -> CommitOutcome;

    /// Read-only query: endorsement only, nothing is ordered or awaited.
    async fn query(&self, data: &Value) -> CoordinatorResult<QueryResponse>;

    /// Current commit watcher counters.
    fn commit_watch_stats(&self) -> CommitWatchStats;
}
