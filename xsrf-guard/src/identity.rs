//! Resolving the acting principal of a request.

use http::Request;

/// Authenticated principal, placed in request extensions by an upstream
/// authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Finds the identity a token is bound to.
///
/// `None` means the request is anonymous; the guard then uses the configured
/// anonymous identity.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, request: &Request<Vec<u8>>) -> Option<String>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&Request<Vec<u8>>) -> Option<String> + Send + Sync,
{
    fn resolve(&self, request: &Request<Vec<u8>>) -> Option<String> {
        self(request)
    }
}

/// Reads the [`Principal`] request extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionIdentity;

impl IdentityResolver for ExtensionIdentity {
    fn resolve(&self, request: &Request<Vec<u8>>) -> Option<String> {
        request
            .extensions()
            .get::<Principal>()
            .map(|p| p.0.clone())
            .filter(|id| !id.is_empty())
    }
}
