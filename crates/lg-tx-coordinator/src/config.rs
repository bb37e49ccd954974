//! Configuration for the transaction coordinator

use serde::{Deserialize, Serialize};
use shared_types::{ChaincodeId, ChannelId, DeploymentSpec, ProposalKind};
use std::time::Duration;

/// How many matching endorsements a write needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndorsementPolicy {
    /// Every response that arrived must agree (unreachable peers excluded).
    AllSuccessful,
    /// The unique largest agreeing group must have at least this many members.
    AtLeast(usize),
}

impl Default for EndorsementPolicy {
    fn default() -> Self {
        EndorsementPolicy::AllSuccessful
    }
}

/// Which response a read-only query returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryPolicy {
    /// Last successful response in arrival order, no agreement check.
    LastReceived,
    /// Run the write-path reconciler over the query responses.
    RequireAgreement,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        QueryPolicy::LastReceived
    }
}

/// Chaincode function invoked for each request kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNames {
    pub invoke: String,
    pub query: String,
    pub deploy: String,
}

impl FunctionNames {
    pub fn for_kind(&self, kind: ProposalKind) -> &str {
        match kind {
            ProposalKind::Invoke => &self.invoke,
            ProposalKind::Query => &self.query,
            ProposalKind::Deploy => &self.deploy,
        }
    }
}

impl Default for FunctionNames {
    fn default() -> Self {
        Self {
            invoke: "invoke".to_string(),
            query: "query".to_string(),
            deploy: "init".to_string(),
        }
    }
}

/// Coordinator configuration.
///
/// Built once at startup and shared read-only by every request.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Channel every proposal is addressed to
    pub channel_id: ChannelId,
    /// Target chaincode
    pub chaincode_id: ChaincodeId,
    /// Function name per request kind
    pub functions: FunctionNames,
    /// Payload attached to deployment proposals
    pub deployment: Option<DeploymentSpec>,
    /// Bound on each individual peer exchange
    pub peer_request_timeout: Duration,
    /// Deadline for the commit event after ordering accepted the transaction
    pub commit_wait_time: Duration,
    /// Agreement required on the write path
    pub endorsement_policy: EndorsementPolicy,
    /// Response selection on the query path
    pub query_policy: QueryPolicy,
    /// Re-verify every endorsement signature
    pub verify_endorsements: bool,
    /// Nonce replay window (seconds)
    pub replay_window_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            channel_id: ChannelId("mychannel".to_string()),
            chaincode_id: ChaincodeId("gochain".to_string()),
            functions: FunctionNames::default(),
            deployment: None,
            peer_request_timeout: Duration::from_secs(10),
            commit_wait_time: Duration::from_secs(30),
            endorsement_policy: EndorsementPolicy::default(),
            query_policy: QueryPolicy::default(),
            verify_endorsements: true,
            replay_window_secs: 120,
        }
    }
}
