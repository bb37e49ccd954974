//! # Commit Subscriptions
//!
//! Subscription side of the event hub: TxID-keyed one-shot callbacks.

use crate::events::CommitNotification;
use shared_types::TxId;
use thiserror::Error;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Registration attempted while the event connection is down.
    #[error("Event connection is not established")]
    NotConnected,

    /// The event connection could not be established.
    #[error("Event connection failed: {0}")]
    ConnectFailed(String),
}

/// One-shot callback invoked with the notification for a transaction.
pub type CommitCallback = Box<dyn FnOnce(CommitNotification) + Send + 'static>;

/// Handle identifying one registration on the hub.
///
/// Passing it to `unregister` removes the callback; unregistering a
/// registration that already fired is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub(crate) id: u64,
    pub(crate) tx_id: TxId,
}

impl SubscriptionHandle {
    /// Transaction this registration watches.
    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    /// Hub-unique registration number.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A registered callback waiting for its transaction.
pub(crate) struct Registration {
    pub(crate) id: u64,
    pub(crate) callback: CommitCallback,
}

impl Registration {
    pub(crate) fn fire(self, notification: CommitNotification) {
        (self.callback)(notification);
    }
}
