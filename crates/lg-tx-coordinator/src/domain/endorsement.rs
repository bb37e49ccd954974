//! Endorsement signatures.
//!
//! A peer endorses by signing `SHA-256(tx_id || status || payload)` with its
//! own key. The gateway re-checks that signature before trusting a response.

use shared_crypto::{sha256, verify};
use shared_types::{EndorsementResponse, Hash, TxId};

/// Digest an endorser signs for one response.
pub fn endorsement_message(tx_id: &TxId, status: u16, payload: &[u8]) -> Hash {
    let mut buf = Vec::with_capacity(tx_id.as_str().len() + 2 + payload.len());
    buf.extend_from_slice(tx_id.as_str().as_bytes());
    buf.extend_from_slice(&status.to_be_bytes());
    buf.extend_from_slice(payload);
    sha256(&buf)
}

/// Whether `response` carries a valid endorsement for `tx_id`.
pub fn verify_endorsement(response: &EndorsementResponse, tx_id: &TxId) -> bool {
    let message = endorsement_message(tx_id, response.status, &response.payload);
    verify(
        &response.endorsement.endorser,
        &message,
        &response.endorsement.signature,
    )
    .is_ok()
}
