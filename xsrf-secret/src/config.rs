//! Secret provider configuration.

use crate::error::{SecretError, SecretResult};
use serde::Deserialize;
use std::time::Duration;

/// Secret provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Key of the cached copy in the ephemeral cache
    pub cache_key: String,
    /// Key of the durable record (Redis store)
    pub store_key: String,
    /// Lifetime of the cached copy; `None` keeps it until evicted
    pub cache_ttl_secs: Option<u64>,
    /// Connection URL for network backends
    pub url: Option<String>,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            cache_key: "xsrf_secret".to_string(),
            store_key: "xsrf:secret".to_string(),
            cache_ttl_secs: None,
            url: None,
        }
    }
}

impl SecretConfig {
    /// Configuration for a Redis-backed store and cache.
    ///
    /// ```
    /// use xsrf_secret::SecretConfig;
    ///
    /// let config = SecretConfig::redis("redis://localhost:6379").unwrap();
    /// assert!(SecretConfig::redis("localhost:6379").is_err());
    /// ```
    pub fn redis(url: &str) -> SecretResult<Self> {
        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(SecretError::InvalidUrl(
                "Redis URL must start with redis:// or rediss://".to_string(),
            ));
        }

        Ok(Self {
            url: Some(url.to_string()),
            ..Default::default()
        })
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    /// Set the cache lifetime, rounded up to whole seconds (at least one).
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        self.cache_ttl_secs = Some(secs.max(1));
        self
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs
            .map(|secs| Duration::from_secs(secs.max(1)))
    }
}
