use crate::error::{GuardError, Result};
use crate::handler::Protected;
use crate::identity::{ExtensionIdentity, IdentityResolver};
use http::Request;
use std::sync::Arc;
use xsrf_secret::SecretProvider;
use xsrf_token::{XsrfCodec, XsrfConfig};

/// XSRF request guard
///
/// Extracts the submitted token, resolves the caller's identity and the
/// request path, and validates the token with the provider's secret.
pub struct XsrfGuard<P> {
    codec: XsrfCodec,
    provider: Arc<P>,
    identity: Arc<dyn IdentityResolver>,
}

impl<P> Clone for XsrfGuard<P> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            provider: self.provider.clone(),
            identity: self.identity.clone(),
        }
    }
}

impl<P: SecretProvider> XsrfGuard<P> {
    /// Create a guard that reads the identity from the [`Principal`](crate::Principal)
    /// request extension.
    pub fn new(config: XsrfConfig, provider: P) -> Self {
        Self::with_shared_provider(config, Arc::new(provider))
    }

    pub fn with_shared_provider(config: XsrfConfig, provider: Arc<P>) -> Self {
        Self {
            codec: XsrfCodec::new(config),
            provider,
            identity: Arc::new(ExtensionIdentity),
        }
    }

    /// Replace the identity resolver.
    pub fn with_identity_resolver(mut self, resolver: impl IdentityResolver + 'static) -> Self {
        self.identity = Arc::new(resolver);
        self
    }

    pub fn config(&self) -> &XsrfConfig {
        self.codec.config()
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Check if the request is subject to the token check
    pub fn needs_protection(&self, request: &Request<Vec<u8>>) -> bool {
        let config = self.config();

        let method = request.method().as_str();
        if config
            .safe_methods
            .iter()
            .any(|safe| safe.eq_ignore_ascii_case(method))
        {
            return false;
        }

        let path = request.uri().path();
        !config
            .exclude_paths
            .iter()
            .any(|excluded| path_is_under(path, excluded))
    }

    /// Identity the request acts as; `None` for anonymous.
    pub fn identity(&self, request: &Request<Vec<u8>>) -> Option<String> {
        self.identity.resolve(request)
    }

    /// Find the submitted token.
    ///
    /// Looks at the query string, then a form or JSON body, then the
    /// configured header. Empty values count as absent.
    pub fn extract_token(&self, request: &Request<Vec<u8>>) -> Option<String> {
        self.token_from_query(request)
            .or_else(|| self.token_from_body(request))
            .or_else(|| self.token_from_header(request))
            .filter(|token| !token.is_empty())
    }

    fn token_from_query(&self, request: &Request<Vec<u8>>) -> Option<String> {
        let query = request.uri().query()?;
        self.find_field(serde_urlencoded::from_str::<Vec<(String, String)>>(query).ok()?)
    }

    fn token_from_body(&self, request: &Request<Vec<u8>>) -> Option<String> {
        let body = request.body();
        if body.is_empty() {
            return None;
        }

        if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
            return json
                .get(&self.config().field_name)
                .and_then(|token| token.as_str())
                .map(str::to_string);
        }

        self.find_field(serde_urlencoded::from_bytes::<Vec<(String, String)>>(body).ok()?)
    }

    fn token_from_header(&self, request: &Request<Vec<u8>>) -> Option<String> {
        request
            .headers()
            .get(self.config().header_name.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    fn find_field(&self, pairs: Vec<(String, String)>) -> Option<String> {
        let field = &self.config().field_name;
        pairs
            .into_iter()
            .find(|(key, value)| key == field && !value.is_empty())
            .map(|(_, value)| value)
    }

    /// Validate the request's token.
    ///
    /// Requests exempted by [`needs_protection`](Self::needs_protection)
    /// pass without a token. Secret provider failures are returned as
    /// [`GuardError::Secret`].
    pub async fn check(&self, request: &Request<Vec<u8>>) -> Result<()> {
        if !self.needs_protection(request) {
            return Ok(());
        }

        let token = self
            .extract_token(request)
            .ok_or(GuardError::MissingToken)?;

        let secret = self.provider.secret().await?;
        let principal = self.identity(request);
        let path = request.uri().path();

        if self
            .codec
            .validate(&secret, &token, principal.as_deref(), path)
        {
            Ok(())
        } else {
            Err(GuardError::InvalidToken)
        }
    }

    /// Issue a token for the request's principal.
    ///
    /// The token is bound to `path`, or to the request's own path when
    /// `None`. Used to embed tokens in rendered forms and scripts.
    pub async fn token_for(&self, request: &Request<Vec<u8>>, path: Option<&str>) -> Result<String> {
        let secret = self.provider.secret().await?;
        let principal = self.identity(request);
        let path = path
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| request.uri().path());

        Ok(self.codec.generate(&secret, principal.as_deref(), path))
    }

    /// Wrap `handler` so it only runs for requests that pass [`check`](Self::check).
    pub fn protect<H>(&self, handler: H) -> Protected<P, H> {
        Protected::new(self.clone(), handler)
    }
}

/// `path` equals `prefix` or lies below it on a segment boundary.
fn path_is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
