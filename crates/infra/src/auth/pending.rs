//! Pending authorization slots with moka
//!
//! Holds the PKCE verifier of each in-flight authorization, keyed by the
//! opaque `state`, until the code exchange takes it. Entries expire after
//! [`PENDING_AUTHORIZATION_TTL_SECS`] so abandoned attempts do not pile up.
//! Slots are process-local; a restart drops them and the user authorizes
//! again.

use std::time::Duration;

use async_trait::async_trait;
use leadflow_core::PendingAuthorizationStore;
use leadflow_domain::constants::PENDING_AUTHORIZATION_TTL_SECS;
use leadflow_domain::{PendingAuthorization, Result};
use moka::future::Cache;

/// Upper bound on concurrent in-flight authorizations.
pub const DEFAULT_PENDING_MAX_CAPACITY: u64 = 10_000;

/// Pending slot cache configuration
#[derive(Debug, Clone)]
pub struct PendingCacheConfig {
    /// Time-to-live for a slot
    pub ttl: Duration,

    /// Maximum number of slots kept
    pub max_capacity: u64,
}

impl Default for PendingCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(PENDING_AUTHORIZATION_TTL_SECS),
            max_capacity: DEFAULT_PENDING_MAX_CAPACITY,
        }
    }
}

impl PendingCacheConfig {
    /// Create config with custom TTL (useful for testing)
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, max_capacity: DEFAULT_PENDING_MAX_CAPACITY }
    }
}

/// [`PendingAuthorizationStore`] backed by a TTL cache.
#[derive(Clone)]
pub struct MokaPendingAuthorizationStore {
    slots: Cache<String, PendingAuthorization>,
}

impl MokaPendingAuthorizationStore {
    pub fn new(config: PendingCacheConfig) -> Self {
        let slots =
            Cache::builder().time_to_live(config.ttl).max_capacity(config.max_capacity).build();
        Self { slots }
    }
}

impl Default for MokaPendingAuthorizationStore {
    fn default() -> Self {
        Self::new(PendingCacheConfig::default())
    }
}

#[async_trait]
impl PendingAuthorizationStore for MokaPendingAuthorizationStore {
    async fn put(&self, state: &str, pending: PendingAuthorization) -> Result<()> {
        self.slots.insert(state.to_string(), pending).await;
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<PendingAuthorization>> {
        Ok(self.slots.remove(state).await)
    }
}
