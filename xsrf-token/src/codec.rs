use crate::config::XsrfConfig;
use crate::secret::Secret;
use crate::token::{generate_token_at, now_secs, validate_token_at};
use std::sync::Arc;

/// Token operations bound to a configuration.
///
/// Resolves a missing principal to the configured anonymous identity and
/// applies the configured timeout, so call sites only supply what varies per
/// request.
#[derive(Debug, Clone)]
pub struct XsrfCodec {
    config: Arc<XsrfConfig>,
}

impl XsrfCodec {
    pub fn new(config: XsrfConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &XsrfConfig {
        &self.config
    }

    /// Issue a token at the current time.
    pub fn generate(&self, secret: &Secret, principal: Option<&str>, path: &str) -> String {
        self.generate_at(secret, principal, path, now_secs())
    }

    pub fn generate_at(
        &self,
        secret: &Secret,
        principal: Option<&str>,
        path: &str,
        issued_at: i64,
    ) -> String {
        let identity = self.config.identity_or_anonymous(principal);
        generate_token_at(secret, identity, path, issued_at)
    }

    /// Validate at the current time.
    pub fn validate(
        &self,
        secret: &Secret,
        token: &str,
        principal: Option<&str>,
        path: &str,
    ) -> bool {
        self.validate_at(secret, token, principal, path, now_secs())
    }

    pub fn validate_at(
        &self,
        secret: &Secret,
        token: &str,
        principal: Option<&str>,
        path: &str,
        now: i64,
    ) -> bool {
        let identity = self.config.identity_or_anonymous(principal);
        validate_token_at(secret, token, identity, path, now, self.config.timeout_secs)
    }
}

impl Default for XsrfCodec {
    fn default() -> Self {
        Self::new(XsrfConfig::default())
    }
}
