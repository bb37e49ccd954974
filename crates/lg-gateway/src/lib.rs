//! # lg-gateway
//!
//! HTTP front door for the ledger transaction coordinator.
//!
//! ```text
//!  client ──POST /invoke|/deploy|/query──→ router ──→ TransactionCoordinator ──→ peers, orderer
//!                                                              ▲
//!  ledger event emitter ──POST /events/commit──→ InMemoryEventHub
//! ```

pub mod config;
pub mod router;

pub use config::{ConfigError, GatewayConfig};
pub use router::{build_router, AppState};
