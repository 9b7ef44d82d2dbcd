//! Secret provider, store and cache traits.

use crate::error::SecretResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use xsrf_token::Secret;

/// Supplies the process-wide XSRF secret.
///
/// Implementations may create and persist the secret on first use. Errors
/// mean the secret is unavailable and must be surfaced to the caller.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Get the current secret.
    async fn secret(&self) -> SecretResult<Secret>;
}

#[async_trait]
impl<T: SecretProvider + ?Sized> SecretProvider for Arc<T> {
    async fn secret(&self) -> SecretResult<Secret> {
        (**self).secret().await
    }
}

/// Durable secret storage.
///
/// Holds at most one secret. Creation must be atomic: when several callers
/// race to create the secret, all of them observe the same winner.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Load the stored secret.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no secret has been created yet.
    async fn load(&self) -> SecretResult<Option<Secret>>;

    /// Store `candidate` unless a secret already exists.
    ///
    /// # Returns
    ///
    /// The secret that is stored after the call: `candidate` if this call
    /// created it, the existing secret otherwise.
    async fn create_if_absent(&self, candidate: Secret) -> SecretResult<Secret>;
}

/// Fast, ephemeral secret cache in front of a [`SecretStore`].
#[async_trait]
pub trait SecretCache: Send + Sync {
    /// Get a cached secret.
    async fn get(&self, key: &str) -> SecretResult<Option<Secret>>;

    /// Cache a secret.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `secret` - The secret to cache
    /// * `ttl` - Optional time-to-live
    async fn set(&self, key: &str, secret: &Secret, ttl: Option<Duration>) -> SecretResult<()>;

    /// Drop a cached secret.
    async fn delete(&self, key: &str) -> SecretResult<()>;
}
