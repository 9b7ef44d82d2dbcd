//! Secret providers.

use crate::config::SecretConfig;
use crate::error::{SecretError, SecretResult};
use crate::memory::{MemorySecretCache, MemorySecretStore};
use crate::traits::{SecretCache, SecretProvider, SecretStore};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use xsrf_token::Secret;

/// Cache-aside provider over a durable store.
///
/// Reads check the cache first, then the store; the value found is written
/// back to the cache. When the store is empty a new secret is generated and
/// offered to [`SecretStore::create_if_absent`], and whatever secret the
/// store ends up holding is used. Within one process creation is serialized
/// by an async mutex; across processes the store's atomic create decides.
///
/// Cache failures are logged and bypassed. Store failures are returned.
///
/// ```rust
/// use xsrf_secret::{CachedSecretProvider, SecretProvider};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), xsrf_secret::SecretError> {
/// let provider = CachedSecretProvider::in_memory();
/// let first = provider.secret().await?;
/// assert_eq!(first, provider.secret().await?);
/// # Ok(())
/// # }
/// ```
pub struct CachedSecretProvider<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    config: SecretConfig,
    init_lock: Mutex<()>,
}

impl<S, C> CachedSecretProvider<S, C>
where
    S: SecretStore,
    C: SecretCache,
{
    pub fn new(store: S, cache: C, config: SecretConfig) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(cache), config)
    }

    /// Build from backends shared with other components.
    pub fn from_shared(store: Arc<S>, cache: Arc<C>, config: SecretConfig) -> Self {
        Self {
            store,
            cache,
            config,
            init_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SecretConfig {
        &self.config
    }

    /// Drop the cached copy so the next read goes to the store.
    ///
    /// Call after rotating the stored secret by hand. Rotation invalidates
    /// every outstanding token.
    pub async fn invalidate(&self) -> SecretResult<()> {
        self.cache.delete(&self.config.cache_key).await
    }

    async fn cached(&self) -> Option<Secret> {
        match self.cache.get(&self.config.cache_key).await {
            Ok(hit) => hit,
            Err(e) => {
                xsrf_log::warn!(target: "xsrf::secret", "secret cache read failed: {}", e);
                None
            }
        }
    }

    async fn populate(&self, secret: &Secret) {
        if let Err(e) = self
            .cache
            .set(&self.config.cache_key, secret, self.config.cache_ttl())
            .await
        {
            xsrf_log::warn!(target: "xsrf::secret", "secret cache write failed: {}", e);
        }
    }
}

impl CachedSecretProvider<MemorySecretStore, MemorySecretCache> {
    /// Provider backed entirely by process memory.
    pub fn in_memory() -> Self {
        Self::new(
            MemorySecretStore::new(),
            MemorySecretCache::new(),
            SecretConfig::default(),
        )
    }
}

#[async_trait]
impl<S, C> SecretProvider for CachedSecretProvider<S, C>
where
    S: SecretStore,
    C: SecretCache,
{
    async fn secret(&self) -> SecretResult<Secret> {
        if let Some(secret) = self.cached().await {
            return Ok(secret);
        }

        let _guard = self.init_lock.lock().await;

        // Another task may have filled the cache while we waited.
        if let Some(secret) = self.cached().await {
            return Ok(secret);
        }

        let secret = match self.store.load().await? {
            Some(secret) => secret,
            None => {
                xsrf_log::info!(target: "xsrf::secret", "no XSRF secret stored, generating one");
                self.store.create_if_absent(Secret::generate()).await?
            }
        };

        self.populate(&secret).await;
        Ok(secret)
    }
}

/// Provider for a fixed, externally managed secret.
#[derive(Debug, Clone)]
pub struct StaticSecretProvider {
    secret: Secret,
}

impl StaticSecretProvider {
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    /// Read the secret from `XSRF_SECRET`.
    pub fn from_env() -> SecretResult<Self> {
        let raw = std::env::var("XSRF_SECRET")
            .map_err(|_| SecretError::Config("XSRF_SECRET is not set".to_string()))?;
        Ok(Self::new(Secret::try_from(raw)?))
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn secret(&self) -> SecretResult<Secret> {
        Ok(self.secret.clone())
    }
}
