//! Ports module for the transaction coordinator

pub mod inbound;
pub mod outbound;

pub use inbound::{CommitWatchStats, TransactionApi};
pub use outbound::{
    CommitEventSource, EndorsingPeer, IdentityProvider, KeyValueStore, OrderingService,
};
