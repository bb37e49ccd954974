//! Domain layer: pure transaction lifecycle logic.

pub mod args;
pub mod endorsement;
pub mod envelope;
pub mod identity;
pub mod outcome;
pub mod proposal;
pub mod reconcile;
pub mod replay;

pub use args::coerce_args;
pub use endorsement::{endorsement_message, verify_endorsement};
pub use envelope::{build_envelope, verify_envelope};
pub use identity::Principal;
pub use outcome::{CommitOutcome, QueryResponse};
pub use proposal::{sign_proposal, verify_proposal, ProposalBuilder};
pub use reconcile::{reconcile, ReconcileStatus, ReconciledResult, ReconciliationFailure};
pub use replay::{NonceRegistry, ReplayError};
