//! Submitter identity loaded from a key-value store.

use crate::domain::Principal;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::ports::{IdentityProvider, KeyValueStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_crypto::Ed25519KeyPair;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Stored form of an enrolled identity.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredIdentity {
    name: String,
    msp_id: String,
    /// Hex-encoded Ed25519 seed
    signing_key: String,
}

/// Identity provider resolving the submitter by name from a key-value store.
///
/// The principal is loaded once and cached. With `enroll_if_missing` a fresh
/// key is generated and persisted when the store has no entry yet.
pub struct KeyStoreIdentityProvider<S> {
    store: Arc<S>,
    name: String,
    msp_id: String,
    enroll_if_missing: bool,
    cached: OnceCell<Principal>,
}

impl<S: KeyValueStore> KeyStoreIdentityProvider<S> {
    pub fn new(
        store: Arc<S>,
        name: impl Into<String>,
        msp_id: impl Into<String>,
        enroll_if_missing: bool,
    ) -> Self {
        Self {
            store,
            name: name.into(),
            msp_id: msp_id.into(),
            enroll_if_missing,
            cached: OnceCell::new(),
        }
    }

    async fn load(&self) -> CoordinatorResult<Principal> {
        let auth_err = |reason: String| CoordinatorError::AuthError { reason };

        let stored = self
            .store
            .get(&self.name)
            .await
            .map_err(|e| auth_err(e.to_string()))?;

        match stored {
            Some(raw) => {
                let identity: StoredIdentity = serde_json::from_str(&raw).map_err(|e| {
                    auth_err(format!("stored identity '{}' is malformed: {e}", self.name))
                })?;
                let keypair = Ed25519KeyPair::from_seed_hex(&identity.signing_key).map_err(|e| {
                    auth_err(format!("stored identity '{}' has a bad key: {e}", self.name))
                })?;
                info!(name = %identity.name, msp_id = %identity.msp_id, "Loaded submitter identity");
                Ok(Principal::new(identity.msp_id, identity.name, keypair))
            }
            None if self.enroll_if_missing => {
                let keypair = Ed25519KeyPair::generate();
                let identity = StoredIdentity {
                    name: self.name.clone(),
                    msp_id: self.msp_id.clone(),
                    signing_key: keypair.to_seed_hex(),
                };
                let raw = serde_json::to_string(&identity)
                    .map_err(|e| auth_err(format!("cannot encode identity: {e}")))?;
                self.store
                    .put(&self.name, raw)
                    .await
                    .map_err(|e| auth_err(e.to_string()))?;
                info!(name = %self.name, msp_id = %self.msp_id, "Enrolled new submitter identity");
                Ok(Principal::new(identity.msp_id, identity.name, keypair))
            }
            None => Err(auth_err(format!("no enrolled identity for '{}'", self.name))),
        }
    }
}

#[async_trait]
impl<S: KeyValueStore + 'static> IdentityProvider for KeyStoreIdentityProvider<S> {
    async fn get_submitter(&self) -> CoordinatorResult<Principal> {
        self.cached.get_or_try_init(|| self.load()).await.cloned()
    }
}
