//! Error types for secret provisioning.

use thiserror::Error;

/// Result type for secret operations.
pub type SecretResult<T> = Result<T, SecretError>;

/// Secret provider errors.
///
/// These are dependency failures and are meant to reach the caller. A
/// provider never substitutes a default secret when its store fails.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Redis-specific error
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value cannot be used as a secret
    #[error("Invalid stored secret: {0}")]
    InvalidSecret(#[from] xsrf_token::TokenError),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Generic error
    #[error("Secret error: {0}")]
    Other(String),
}
