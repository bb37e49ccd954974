//! # Shared Bus - Commit Event Hub
//!
//! The process-wide connection to the ledger's commit event stream.
//!
//! ## Model
//!
//! ```text
//!  ledger block events                      in-flight requests
//!  ───────────────────┐                ┌──── register(tx_a, cb) ──┐
//!                     ▼                ▼                          │
//!               ┌──────────────────────────┐                      │
//!  publish() ──→│     InMemoryEventHub     │── cb(Committed) ─────┘
//!               │  tx_id → [registration]  │
//!               └──────────────────────────┘
//!                     │ disconnect()
//!                     └──→ every registration receives ConnectionLost
//! ```
//!
//! ## Guarantees
//!
//! - At most one notification per registration.
//! - A commit that arrives before its registration is answered from a
//!   bounded recent-commit memory.
//! - Registration and removal are safe from many tasks at once.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::CommitNotification;
pub use publisher::{CommitEventPublisher, InMemoryEventHub};
pub use subscriber::{CommitCallback, SubscriptionError, SubscriptionHandle};

/// Recent commits remembered to serve registrations that arrive late.
pub const DEFAULT_RECENT_COMMITS: usize = 1024;
