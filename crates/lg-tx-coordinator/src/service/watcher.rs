//! # Commit Watcher
//!
//! Races the commit event for a transaction against its deadline.
//!
//! ```text
//!               register(tx_id) ──→ callback ──┐
//!  watch() ──┤                                  ├──→ ResolutionSlot ──→ CommitOutcome
//!               sleep(wait_time) ──→ timer ────┘     (first wins)
//! ```
//!
//! The slot accepts exactly one resolution. Whichever side loses is
//! cancelled: the timer task is aborted, the registration removed, and the
//! connection lease returned.

use crate::domain::CommitOutcome;
use crate::ports::{CommitEventSource, CommitWatchStats};
use dashmap::DashMap;
use parking_lot::Mutex;
use shared_bus::{CommitCallback, CommitNotification, SubscriptionError};
use shared_types::{CommitEvent, TxId};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Shared event-stream connection, reference counted by in-flight watches.
///
/// The first lease connects the source; returning the last one disconnects it.
pub struct EventConnection<E> {
    source: Arc<E>,
    leases: tokio::sync::Mutex<usize>,
}

/// Proof that the event connection is held open for one request.
#[must_use = "a lease must be returned with EventConnection::release"]
#[derive(Debug)]
pub struct ConnectionLease {
    _private: (),
}

impl<E: CommitEventSource> EventConnection<E> {
    pub fn new(source: Arc<E>) -> Self {
        Self {
            source,
            leases: tokio::sync::Mutex::new(0),
        }
    }

    pub fn source(&self) -> &Arc<E> {
        &self.source
    }

    /// Take a lease, connecting the source if nobody holds it open.
    pub async fn acquire(&self) -> Result<ConnectionLease, SubscriptionError> {
        let mut leases = self.leases.lock().await;
        if *leases == 0 || !self.source.is_connected() {
            self.source.connect().await?;
        }
        *leases += 1;
        Ok(ConnectionLease { _private: () })
    }

    /// Return a lease, disconnecting the source when it was the last one.
    pub async fn release(&self, lease: ConnectionLease) {
        let ConnectionLease { .. } = lease;
        let mut leases = self.leases.lock().await;
        *leases = leases.saturating_sub(1);
        if *leases == 0 {
            self.source.disconnect().await;
        }
    }

    pub async fn active_leases(&self) -> usize {
        *self.leases.lock().await
    }
}

/// What ended a watch.
#[derive(Debug)]
enum Resolution {
    Committed(CommitEvent),
    Deadline,
    ConnectionLost,
    SubscriptionFailed(SubscriptionError),
}

/// Counters for the watcher
#[derive(Debug, Default)]
pub struct WatcherStats {
    pub watches_started: AtomicU64,
    pub committed: AtomicU64,
    pub timed_out: AtomicU64,
    pub ignored_resolutions: AtomicU64,
}

/// Single-resolution guard shared by the event callback and the timer.
struct ResolutionSlot {
    resolved: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<Resolution>>>,
    stats: Arc<WatcherStats>,
}

impl ResolutionSlot {
    fn new(sender: oneshot::Sender<Resolution>, stats: Arc<WatcherStats>) -> Self {
        Self {
            resolved: AtomicBool::new(false),
            sender: Mutex::new(Some(sender)),
            stats,
        }
    }

    /// Deliver `resolution` if nothing has been delivered yet.
    ///
    /// Returns `false` (and counts the attempt) when another side already won.
    fn resolve(&self, resolution: Resolution) -> bool {
        if self
            .resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.stats.ignored_resolutions.fetch_add(1, Ordering::Relaxed);
            debug!(?resolution, "Late resolution ignored");
            return false;
        }
        if let Some(sender) = self.sender.lock().take() {
            let _ = sender.send(resolution);
        }
        true
    }

    fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }
}

/// Commit watcher over a shared event connection.
pub struct CommitWatcher<E> {
    connection: EventConnection<E>,
    wait_time: Duration,
    stats: Arc<WatcherStats>,
    /// tx_id -> when watching began
    in_flight: DashMap<TxId, Instant>,
}

impl<E: CommitEventSource> CommitWatcher<E> {
    pub fn new(source: Arc<E>, wait_time: Duration) -> Self {
        Self {
            connection: EventConnection::new(source),
            wait_time,
            stats: Arc::new(WatcherStats::default()),
            in_flight: DashMap::new(),
        }
    }

    pub fn connection(&self) -> &EventConnection<E> {
        &self.connection
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }

    pub fn is_watching(&self, tx_id: &TxId) -> bool {
        self.in_flight.contains_key(tx_id)
    }

    pub fn stats(&self) -> CommitWatchStats {
        CommitWatchStats {
            watches_started: self.stats.watches_started.load(Ordering::Relaxed),
            committed: self.stats.committed.load(Ordering::Relaxed),
            timed_out: self.stats.timed_out.load(Ordering::Relaxed),
            ignored_resolutions: self.stats.ignored_resolutions.load(Ordering::Relaxed),
            pending: self.in_flight.len() as u64,
        }
    }

    /// Wait for `tx_id` to commit, or for the deadline.
    ///
    /// Consumes the caller's connection lease and always returns it. The
    /// outcome is `Committed` or `TimedOut`; a lost or unusable event stream
    /// counts as a timeout.
    pub async fn watch(&self, tx_id: TxId, lease: ConnectionLease) -> CommitOutcome {
        let started = Instant::now();
        self.stats.watches_started.fetch_add(1, Ordering::Relaxed);
        self.in_flight.insert(tx_id.clone(), started);

        let (sender, receiver) = oneshot::channel();
        let slot = Arc::new(ResolutionSlot::new(sender, Arc::clone(&self.stats)));

        let callback_slot = Arc::clone(&slot);
        let callback: CommitCallback = Box::new(move |notification| {
            let resolution = match notification {
                CommitNotification::Committed(event) => Resolution::Committed(event),
                CommitNotification::ConnectionLost => Resolution::ConnectionLost,
            };
            callback_slot.resolve(resolution);
        });

        let handle = match self
            .connection
            .source()
            .register_commit_callback(tx_id.clone(), callback)
            .await
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                slot.resolve(Resolution::SubscriptionFailed(e));
                None
            }
        };

        let timer = (!slot.is_resolved()).then(|| {
            let timer_slot = Arc::clone(&slot);
            let wait_time = self.wait_time;
            tokio::spawn(async move {
                tokio::time::sleep(wait_time).await;
                timer_slot.resolve(Resolution::Deadline);
            })
        });

        let resolution = receiver.await.unwrap_or(Resolution::Deadline);

        if let Some(timer) = timer {
            timer.abort();
        }
        if let Some(handle) = handle {
            self.connection.source().unregister(&handle).await;
        }
        self.connection.release(lease).await;
        self.in_flight.remove(&tx_id);

        let waited_ms = started.elapsed().as_millis() as u64;
        match resolution {
            Resolution::Committed(event) => {
                self.stats.committed.fetch_add(1, Ordering::Relaxed);
                if event.validation_code.is_valid() {
                    info!(tx_id = %tx_id, block = event.block_number, waited_ms, "Transaction committed");
                } else {
                    warn!(
                        tx_id = %tx_id,
                        block = event.block_number,
                        code = ?event.validation_code,
                        "Transaction committed but invalidated by the ledger"
                    );
                }
                CommitOutcome::Committed {
                    tx_id,
                    block_number: event.block_number,
                    validation_code: event.validation_code,
                }
            }
            other => {
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                match other {
                    Resolution::ConnectionLost => {
                        warn!(tx_id = %tx_id, waited_ms, "Event stream lost while awaiting commit")
                    }
                    Resolution::SubscriptionFailed(e) => {
                        warn!(tx_id = %tx_id, error = %e, "Could not subscribe to commit event")
                    }
                    _ => warn!(tx_id = %tx_id, waited_ms, "Commit not observed before deadline"),
                }
                CommitOutcome::TimedOut { tx_id }
            }
        }
    }
}
