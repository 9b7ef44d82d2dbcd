//! Redis-backed secret store and cache.

use crate::config::SecretConfig;
use crate::error::{SecretError, SecretResult};
use crate::traits::{SecretCache, SecretStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;
use xsrf_token::Secret;

async fn connect(config: &SecretConfig) -> SecretResult<ConnectionManager> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| SecretError::Config("Redis URL is not set".to_string()))?;

    let client = redis::Client::open(url).map_err(|e| SecretError::Connection(e.to_string()))?;

    ConnectionManager::new(client)
        .await
        .map_err(|e| SecretError::Connection(e.to_string()))
}

/// Durable secret record in Redis.
///
/// Creation uses `SET key value NX`, so concurrent creators across processes
/// agree on the first value written.
///
/// ```no_run
/// use xsrf_secret::{RedisSecretStore, SecretConfig, SecretStore};
///
/// # async fn example() -> Result<(), xsrf_secret::SecretError> {
/// let config = SecretConfig::redis("redis://localhost:6379")?;
/// let store = RedisSecretStore::new(&config).await?;
/// let current = store.load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisSecretStore {
    conn: ConnectionManager,
    key: String,
}

impl RedisSecretStore {
    pub async fn new(config: &SecretConfig) -> SecretResult<Self> {
        Ok(Self {
            conn: connect(config).await?,
            key: config.store_key.clone(),
        })
    }
}

#[async_trait]
impl SecretStore for RedisSecretStore {
    async fn load(&self) -> SecretResult<Option<Secret>> {
        let mut conn = self.conn.clone();
        let raw: Option<Vec<u8>> = redis::cmd("GET")
            .arg(&self.key)
            .query_async(&mut conn)
            .await?;

        raw.map(|bytes| Secret::new(bytes).map_err(SecretError::from))
            .transpose()
    }

    async fn create_if_absent(&self, candidate: Secret) -> SecretResult<Secret> {
        let mut conn = self.conn.clone();
        let created: Option<String> = redis::cmd("SET")
            .arg(&self.key)
            .arg(candidate.as_bytes())
            .arg("NX")
            .query_async(&mut conn)
            .await?;

        if created.is_some() {
            xsrf_log::info!(target: "xsrf::secret", "created XSRF secret under key {}", self.key);
            return Ok(candidate);
        }

        self.load()
            .await?
            .ok_or_else(|| SecretError::Other(format!("secret key {} vanished after SET NX", self.key)))
    }
}

/// Shared Redis cache for the secret.
#[derive(Clone)]
pub struct RedisSecretCache {
    conn: ConnectionManager,
}

impl RedisSecretCache {
    pub async fn new(config: &SecretConfig) -> SecretResult<Self> {
        Ok(Self {
            conn: connect(config).await?,
        })
    }
}

#[async_trait]
impl SecretCache for RedisSecretCache {
    async fn get(&self, key: &str) -> SecretResult<Option<Secret>> {
        let mut conn = self.conn.clone();
        let raw: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        // An empty cached value is treated as a miss.
        Ok(raw.and_then(|bytes| Secret::new(bytes).ok()))
    }

    async fn set(&self, key: &str, secret: &Secret, ttl: Option<Duration>) -> SecretResult<()> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(secret.as_bytes());
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> SecretResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }
}
