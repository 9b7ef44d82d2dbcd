//! XSRF secret provisioning.
//!
//! Every token is signed with one process-wide secret. This crate creates
//! that secret once, keeps it in a durable [`SecretStore`], and serves it
//! through a fast [`SecretCache`] using the cache-aside pattern.
//!
//! # Backends
//!
//! - [`MemorySecretStore`] / [`MemorySecretCache`] - in-process
//! - [`FileSecretStore`] - a single file, safe for several processes
//! - `RedisSecretStore` / `RedisSecretCache` - feature `redis`
//!
//! # Examples
//!
//! ```no_run
//! use xsrf_secret::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SecretError> {
//!     let provider = CachedSecretProvider::new(
//!         FileSecretStore::new("/var/lib/app/xsrf.secret"),
//!         MemorySecretCache::new(),
//!         SecretConfig::default(),
//!     );
//!
//!     // Created on first use, then served from the cache.
//!     let secret = provider.secret().await?;
//!     assert!(!secret.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! Rotating the stored secret invalidates every outstanding token.

pub mod config;
pub mod error;
pub mod file_store;
pub mod memory;
pub mod provider;
pub mod traits;

#[cfg(feature = "redis")]
pub mod redis_store;

pub use config::SecretConfig;
pub use error::{SecretError, SecretResult};
pub use file_store::FileSecretStore;
pub use memory::{MemorySecretCache, MemorySecretStore};
pub use provider::{CachedSecretProvider, StaticSecretProvider};
pub use traits::{SecretCache, SecretProvider, SecretStore};
pub use xsrf_token::Secret;

#[cfg(feature = "redis")]
pub use redis_store::{RedisSecretCache, RedisSecretStore};
