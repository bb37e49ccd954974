//! # SHA-256 Hashing and Random Material
//!
//! Transaction identifiers are derived as `SHA-256(nonce || creator key)`.

use rand::RngCore;
use sha2::{Digest, Sha256};
use shared_types::{Hash, Nonce, PublicKey, TxId, NONCE_LENGTH};

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Draw a fresh nonce from the OS RNG.
pub fn random_nonce() -> Nonce {
    let mut bytes = [0u8; NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Nonce(bytes)
}

/// Derive the transaction id bound to `nonce` and the creator's key.
pub fn compute_tx_id(nonce: &Nonce, creator: &PublicKey) -> TxId {
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hasher.update(creator);
    TxId::new(hex::encode(hasher.finalize()))
}
