//! # Shared Crypto - Signing and Identifier Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Proposal, endorsement and envelope signing |
//! | `hashing` | SHA-256, OS RNG | Transaction ids and anti-replay nonces |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Nonces**: drawn from the operating system CSPRNG

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{compute_tx_id, random_nonce, sha256};
pub use signatures::{verify, Ed25519KeyPair};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
