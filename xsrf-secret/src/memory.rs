//! In-process store and cache.

use crate::error::SecretResult;
use crate::traits::{SecretCache, SecretStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use xsrf_token::Secret;

/// Secret store held in memory.
///
/// Only durable for the lifetime of the process; suited to tests and
/// single-instance deployments that accept token invalidation on restart.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    slot: RwLock<Option<Secret>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `secret`.
    pub fn with_secret(secret: Secret) -> Self {
        Self {
            slot: RwLock::new(Some(secret)),
        }
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn load(&self) -> SecretResult<Option<Secret>> {
        Ok(self.slot.read().await.clone())
    }

    async fn create_if_absent(&self, candidate: Secret) -> SecretResult<Secret> {
        let mut slot = self.slot.write().await;
        Ok(slot.get_or_insert(candidate).clone())
    }
}

#[derive(Debug)]
struct CacheEntry {
    secret: Secret,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// TTL-aware in-memory cache.
#[derive(Debug, Default)]
pub struct MemorySecretCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemorySecretCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretCache for MemorySecretCache {
    async fn get(&self, key: &str) -> SecretResult<Option<Secret>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.secret.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: evict unless someone refreshed it meanwhile.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, secret: &Secret, ttl: Option<Duration>) -> SecretResult<()> {
        let entry = CacheEntry {
            secret: secret.clone(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> SecretResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
