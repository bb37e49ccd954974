//! # Nonce Replay Registry
//!
//! Every nonce the gateway mints is recorded for the replay window, so a
//! value can never be handed out twice while peers would still accept it.
//!
//! - Nonces are remembered for `window_secs` after they were claimed
//! - Expired entries are garbage-collected every `gc_interval_secs`

use shared_types::Nonce;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from nonce registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The nonce was already claimed inside the replay window.
    #[error("Nonce already used within the replay window")]
    NonceReused,
}

/// Time-bounded record of minted nonces.
pub struct NonceRegistry {
    /// Map of nonce -> timestamp when it was claimed.
    claimed: HashMap<Nonce, u64>,

    /// Replay window in seconds.
    window_secs: u64,

    /// Last garbage collection timestamp.
    last_gc: u64,

    /// Garbage collection interval in seconds.
    gc_interval_secs: u64,
}

impl NonceRegistry {
    /// Default replay window.
    pub const DEFAULT_WINDOW: u64 = 120;

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: u64 = 10;

    /// Create a registry with the default window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_WINDOW, Self::DEFAULT_GC_INTERVAL)
    }

    /// Create a registry with custom settings.
    #[must_use]
    pub fn with_config(window_secs: u64, gc_interval_secs: u64) -> Self {
        Self {
            claimed: HashMap::new(),
            window_secs,
            last_gc: current_timestamp(),
            gc_interval_secs,
        }
    }

    /// Claim `nonce` now.
    pub fn claim(&mut self, nonce: Nonce) -> Result<(), ReplayError> {
        self.claim_at(nonce, current_timestamp())
    }

    /// Claim `nonce` at an explicit timestamp (seconds).
    ///
    /// # Errors
    ///
    /// - `ReplayError::NonceReused` - the nonce is still inside its window
    pub fn claim_at(&mut self, nonce: Nonce, now: u64) -> Result<(), ReplayError> {
        if now.saturating_sub(self.last_gc) > self.gc_interval_secs {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if let Some(&claimed_at) = self.claimed.get(&nonce) {
            if now.saturating_sub(claimed_at) < self.window_secs {
                return Err(ReplayError::NonceReused);
            }
        }

        self.claimed.insert(nonce, now);
        Ok(())
    }

    /// Check if a nonce is recorded without claiming it.
    #[must_use]
    pub fn contains(&self, nonce: &Nonce) -> bool {
        self.claimed.contains_key(nonce)
    }

    /// Number of recorded nonces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Remove nonces whose window has passed.
    fn garbage_collect(&mut self, now: u64) {
        let expiry_threshold = now.saturating_sub(self.window_secs);
        self.claimed.retain(|_, &mut ts| ts > expiry_threshold);
    }
}

impl Default for NonceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
