//! Submitter principal.

use shared_crypto::Ed25519KeyPair;
use shared_types::{Creator, PublicKey, Signature};
use std::fmt;
use std::sync::Arc;

/// An authenticated principal able to sign proposals and envelopes.
///
/// Cheap to clone; the key material is shared.
#[derive(Clone)]
pub struct Principal {
    creator: Creator,
    keypair: Arc<Ed25519KeyPair>,
}

impl Principal {
    pub fn new(msp_id: impl Into<String>, name: impl Into<String>, keypair: Ed25519KeyPair) -> Self {
        let creator = Creator {
            msp_id: msp_id.into(),
            name: name.into(),
            public_key: keypair.public_key(),
        };
        Self {
            creator,
            keypair: Arc::new(keypair),
        }
    }

    pub fn creator(&self) -> &Creator {
        &self.creator
    }

    pub fn public_key(&self) -> PublicKey {
        self.creator.public_key
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.keypair.sign(message)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("msp_id", &self.creator.msp_id)
            .field("name", &self.creator.name)
            .field("public_key", &hex::encode(self.creator.public_key))
            .finish()
    }
}
