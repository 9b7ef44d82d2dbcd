//! Secret key material.

use crate::compare::constant_time_eq;
use crate::error::{Result, TokenError};
use rand::RngCore;
use std::fmt;
use std::sync::Arc;

/// Number of random bytes drawn for a generated secret.
pub const SECRET_ENTROPY_BYTES: usize = 16;

/// Process-wide HMAC key.
///
/// Always non-empty. Cloning is cheap and equality is timing-safe. The
/// bytes never appear in `Debug` output.
#[derive(Clone)]
pub struct Secret(Arc<[u8]>);

impl Secret {
    /// Wrap existing key material.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self(bytes.into()))
    }

    /// Create a fresh secret: 16 random bytes as 32 lowercase hex characters.
    ///
    /// The hex text is the key material, so the stored form of the secret is
    /// printable and can be persisted in any text-oriented store.
    pub fn generate() -> Self {
        let mut raw = [0u8; SECRET_ENTROPY_BYTES];
        rand::thread_rng().fill_bytes(&mut raw);
        Self(hex::encode(raw).into_bytes().into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key material is empty. Never true for a constructed secret.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<&str> for Secret {
    type Error = TokenError;

    fn try_from(value: &str) -> Result<Self> {
        Secret::new(value.as_bytes())
    }
}

impl TryFrom<String> for Secret {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self> {
        Secret::new(value.into_bytes())
    }
}

impl TryFrom<Vec<u8>> for Secret {
    type Error = TokenError;

    fn try_from(value: Vec<u8>) -> Result<Self> {
        Secret::new(value)
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED; {}])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(Secret::new(Vec::new()).unwrap_err(), TokenError::EmptySecret);
        assert!(Secret::try_from("").is_err());
    }

    #[test]
    fn test_generated_secret_is_hex() {
        let secret = Secret::generate();
        assert_eq!(secret.len(), SECRET_ENTROPY_BYTES * 2);
        assert!(
            secret
                .as_bytes()
                .iter()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
        );
    }

    #[test]
    fn test_generated_secrets_differ() {
        assert_ne!(Secret::generate(), Secret::generate());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = Secret::try_from("hunter2").unwrap();
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("REDACTED"));
    }
}
