//! # lg-tx-coordinator
//!
//! Drives a state-changing request through the permissioned ledger's
//! execute-order-validate pipeline, and answers read-only queries.
//!
//! ## Overview
//!
//! - **Proposal Builder**: fresh nonce and TxID per request, signed by the submitter
//! - **Endorsement Collector**: concurrent fan-out with a per-peer timeout
//! - **Reconciler**: agreement over every response, never "last one wins"
//! - **Commit Submitter**: signed envelope to the ordering service
//! - **Commit Watcher**: commit event raced against a deadline, first wins
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────── TransactionCoordinator ────────────────┐
//!  submit_transaction ─┤ ProposalBuilder → EndorsementCollector → reconcile()   │
//!  submit_deployment   │        │                 │                    │        │
//!  query               │        ▼                 ▼                    ▼        │
//!                      │ IdentityProvider   EndorsingPeer ×N    OrderingService │
//!                      │                                              │         │
//!                      │                          CommitWatcher ◄─────┘         │
//!                      │                               │                        │
//!                      └───────────────────────────────┼────────────────────────┘
//!                                                      ▼
//!                                              CommitEventSource
//! ```
//!
//! ## Outcomes
//!
//! | Stage reached | Outcome |
//! |---------------|---------|
//! | Failed before broadcast | `CommitOutcome::Error` |
//! | Orderer declined | `CommitOutcome::SubmissionRejected` |
//! | Commit event first | `CommitOutcome::Committed` |
//! | Deadline or lost stream first | `CommitOutcome::TimedOut` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use lg_tx_coordinator::{CoordinatorConfig, TransactionApi, TransactionCoordinator};
//!
//! let coordinator = TransactionCoordinator::new(
//!     CoordinatorConfig::default(),
//!     identity,
//!     peers,
//!     orderer,
//!     event_hub,
//! );
//!
//! let outcome = coordinator.submit_transaction(&json!(["a", "b", "10"])).await;
//! assert!(outcome.is_success());
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

/// Mock adapters for tests.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{
    FileKeyValueStore, HttpEndorsingPeer, HttpOrderer, InMemoryKeyValueStore,
    KeyStoreIdentityProvider,
};
pub use config::{CoordinatorConfig, EndorsementPolicy, FunctionNames, QueryPolicy};
pub use domain::{
    reconcile, CommitOutcome, Principal, ProposalBuilder, QueryResponse, ReconcileStatus,
    ReconciledResult, ReconciliationFailure,
};
pub use error::{CoordinatorError, CoordinatorResult, StoreError};
pub use ports::inbound::{CommitWatchStats, TransactionApi};
pub use ports::outbound::{
    CommitEventSource, EndorsingPeer, IdentityProvider, KeyValueStore, OrderingService,
};
pub use service::{CommitWatcher, EndorsementCollector, TransactionCoordinator};
