//! # Commit Notifications
//!
//! What a registered callback receives from the event hub.

use shared_types::{CommitEvent, TxId};
use std::collections::{HashMap, VecDeque};

/// Notification delivered to a TxID-keyed registration.
///
/// Each registration receives at most one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitNotification {
    /// The transaction was written to the ledger.
    Committed(CommitEvent),
    /// The event connection went away before the transaction was seen.
    ConnectionLost,
}

impl CommitNotification {
    /// Transaction id of a commit, `None` for connection loss.
    pub fn tx_id(&self) -> Option<&TxId> {
        match self {
            CommitNotification::Committed(event) => Some(&event.tx_id),
            CommitNotification::ConnectionLost => None,
        }
    }
}

/// Bounded memory of recently committed transactions.
///
/// A commit event can overtake the registration for its transaction (the
/// orderer may cut the block before the submitter starts watching). The hub
/// answers such late registrations from this cache.
#[derive(Debug)]
pub(crate) struct RecentCommits {
    order: VecDeque<TxId>,
    events: HashMap<TxId, CommitEvent>,
    capacity: usize,
}

impl RecentCommits {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            events: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn record(&mut self, event: &CommitEvent) {
        if self.capacity == 0 || self.events.contains_key(&event.tx_id) {
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.events.remove(&oldest);
            }
        }
        self.order.push_back(event.tx_id.clone());
        self.events.insert(event.tx_id.clone(), event.clone());
    }

    pub(crate) fn get(&self, tx_id: &TxId) -> Option<&CommitEvent> {
        self.events.get(tx_id)
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.events.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
