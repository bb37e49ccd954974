//! Transaction envelope assembly.

use crate::domain::identity::Principal;
use crate::domain::reconcile::ReconciledResult;
use crate::error::CoordinatorResult;
use shared_types::{ChannelId, Endorsement, SignedProposal, TransactionEnvelope, TxId};

/// Bytes the submitter signs for an envelope.
fn envelope_signing_bytes(
    tx_id: &TxId,
    channel_id: &ChannelId,
    payload: &[u8],
    endorsements: &[Endorsement],
) -> CoordinatorResult<Vec<u8>> {
    Ok(bincode::serialize(&(tx_id, channel_id, payload, endorsements))?)
}

/// Package a reconciled result for the ordering service.
///
/// The envelope carries the agreed payload and every agreeing endorsement,
/// signed by the same principal that signed the proposal.
pub fn build_envelope(
    signed: SignedProposal,
    reconciled: &ReconciledResult,
    principal: &Principal,
) -> CoordinatorResult<TransactionEnvelope> {
    let tx_id = signed.proposal.tx_id.clone();
    let channel_id = signed.proposal.channel_id.clone();
    let bytes = envelope_signing_bytes(
        &tx_id,
        &channel_id,
        &reconciled.payload,
        &reconciled.endorsements,
    )?;

    Ok(TransactionEnvelope {
        tx_id,
        channel_id,
        proposal: signed,
        payload: reconciled.payload.clone(),
        endorsements: reconciled.endorsements.clone(),
        signature: principal.sign(&bytes),
    })
}

/// Check the submitter signature on an envelope.
pub fn verify_envelope(envelope: &TransactionEnvelope) -> CoordinatorResult<bool> {
    let bytes = envelope_signing_bytes(
        &envelope.tx_id,
        &envelope.channel_id,
        &envelope.payload,
        &envelope.endorsements,
    )?;
    Ok(shared_crypto::verify(
        &envelope.proposal.creator.public_key,
        &bytes,
        &envelope.signature,
    )
    .is_ok())
}
