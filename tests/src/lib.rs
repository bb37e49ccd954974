//! # Ledger Gateway Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Reconciliation and proposal benchmarks
//! └── src/integration/  # Whole-lifecycle flows against scripted peers
//!     ├── invoke_flow.rs
//!     ├── deploy_flow.rs
//!     ├── query_flow.rs
//!     └── http_flow.rs  # Gateway over real sockets
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lg-tests
//! cargo test -p lg-tests integration::invoke_flow
//! cargo bench -p lg-tests
//! ```

pub mod integration;
