//! # Event Hub
//!
//! The shared commit-event connection. Every in-flight transaction layers a
//! private TxID-keyed registration on top of it.

use crate::events::{CommitNotification, RecentCommits};
use crate::subscriber::{CommitCallback, Registration, SubscriptionError, SubscriptionHandle};
use crate::DEFAULT_RECENT_COMMITS;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{CommitEvent, TxId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Trait for feeding commit events into the hub.
///
/// Implemented by whatever receives the ledger's block events (the gateway's
/// webhook route, or a test driver).
#[async_trait]
pub trait CommitEventPublisher: Send + Sync {
    /// Deliver a commit event.
    ///
    /// # Returns
    ///
    /// The number of registrations that were resolved by the event.
    async fn publish(&self, event: CommitEvent) -> usize;

    /// Total events accepted while connected.
    fn events_published(&self) -> u64;
}

struct HubState {
    connected: bool,
    registrations: HashMap<TxId, Vec<Registration>>,
    recent: RecentCommits,
}

/// In-memory event hub.
///
/// Registration, delivery and teardown all go through one lock, so a
/// registration can never slip between an event being recorded and the
/// callbacks for it being drained. Callbacks run after the lock is released.
pub struct InMemoryEventHub {
    state: Mutex<HubState>,
    next_id: AtomicU64,
    events_published: AtomicU64,
}

impl InMemoryEventHub {
    /// Create a disconnected hub with the default recent-commit memory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_recent_capacity(DEFAULT_RECENT_COMMITS)
    }

    /// Create a disconnected hub remembering up to `capacity` recent commits.
    #[must_use]
    pub fn with_recent_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(HubState {
                connected: false,
                registrations: HashMap::new(),
                recent: RecentCommits::new(capacity),
            }),
            next_id: AtomicU64::new(1),
            events_published: AtomicU64::new(0),
        }
    }

    /// Establish the event connection. Idempotent.
    pub fn connect(&self) {
        let mut state = self.state.lock();
        if !state.connected {
            state.connected = true;
            info!("Event hub connected");
        }
    }

    /// Tear down the event connection.
    ///
    /// Every outstanding registration receives `ConnectionLost`.
    pub fn disconnect(&self) {
        let drained: Vec<Registration> = {
            let mut state = self.state.lock();
            if !state.connected {
                return;
            }
            state.connected = false;
            state.recent.clear();
            state
                .registrations
                .drain()
                .flat_map(|(_, regs)| regs)
                .collect()
        };

        info!(orphaned = drained.len(), "Event hub disconnected");
        for registration in drained {
            registration.fire(CommitNotification::ConnectionLost);
        }
    }

    /// Whether the connection is currently up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Register a one-shot callback for `tx_id`.
    ///
    /// If the transaction already committed (event overtook registration) the
    /// callback fires immediately and the returned handle is already spent.
    pub fn register(
        &self,
        tx_id: TxId,
        callback: CommitCallback,
    ) -> Result<SubscriptionHandle, SubscriptionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = SubscriptionHandle {
            id,
            tx_id: tx_id.clone(),
        };

        let already_committed = {
            let mut state = self.state.lock();
            if !state.connected {
                return Err(SubscriptionError::NotConnected);
            }
            match state.recent.get(&tx_id) {
                Some(event) => Some(event.clone()),
                None => {
                    state
                        .registrations
                        .entry(tx_id.clone())
                        .or_default()
                        .push(Registration { id, callback });
                    debug!(tx_id = %tx_id, registration = id, "Commit callback registered");
                    return Ok(handle);
                }
            }
        };

        if let Some(event) = already_committed {
            debug!(tx_id = %tx_id, "Commit event preceded registration, resolving immediately");
            callback(CommitNotification::Committed(event));
        }
        Ok(handle)
    }

    /// Remove a registration. Returns `false` if it already fired or was removed.
    pub fn unregister(&self, handle: &SubscriptionHandle) -> bool {
        let mut state = self.state.lock();
        let Some(regs) = state.registrations.get_mut(&handle.tx_id) else {
            return false;
        };

        let before = regs.len();
        regs.retain(|r| r.id != handle.id);
        let removed = regs.len() != before;
        if regs.is_empty() {
            state.registrations.remove(&handle.tx_id);
        }
        if removed {
            debug!(tx_id = %handle.tx_id, registration = handle.id, "Commit callback unregistered");
        }
        removed
    }

    /// Number of registrations waiting for any transaction.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.state.lock().registrations.values().map(Vec::len).sum()
    }

    /// Whether any registration is waiting for `tx_id`.
    #[must_use]
    pub fn is_registered(&self, tx_id: &TxId) -> bool {
        self.state.lock().registrations.contains_key(tx_id)
    }
}

impl Default for InMemoryEventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommitEventPublisher for InMemoryEventHub {
    async fn publish(&self, event: CommitEvent) -> usize {
        let waiting = {
            let mut state = self.state.lock();
            if !state.connected {
                warn!(tx_id = %event.tx_id, "Commit event dropped (hub disconnected)");
                return 0;
            }
            state.recent.record(&event);
            state.registrations.remove(&event.tx_id).unwrap_or_default()
        };

        self.events_published.fetch_add(1, Ordering::Relaxed);
        debug!(
            tx_id = %event.tx_id,
            block = event.block_number,
            receivers = waiting.len(),
            "Commit event published"
        );

        let receivers = waiting.len();
        for registration in waiting {
            registration.fire(CommitNotification::Committed(event.clone()));
        }
        receivers
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
