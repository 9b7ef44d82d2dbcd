//! Request handlers and guarded composition.

use crate::guard::XsrfGuard;
use async_trait::async_trait;
use http::{Request, Response, StatusCode, header};
use std::future::Future;
use xsrf_secret::SecretProvider;

/// An async request handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request<Vec<u8>>) -> Response<Vec<u8>>;
}

/// Handler built from an async function.
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Wrap an async function as a [`Handler`].
///
/// ```rust
/// use http::{Request, Response};
/// use xsrf_guard::handler_fn;
///
/// let handler = handler_fn(|_req: Request<Vec<u8>>| async {
///     Response::new(b"saved".to_vec())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request<Vec<u8>>) -> Fut + Send + Sync,
    Fut: Future<Output = Response<Vec<u8>>> + Send,
{
    HandlerFn(f)
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request<Vec<u8>>) -> Fut + Send + Sync,
    Fut: Future<Output = Response<Vec<u8>>> + Send,
{
    async fn call(&self, request: Request<Vec<u8>>) -> Response<Vec<u8>> {
        (self.0)(request).await
    }
}

/// A handler that only runs once the request passes the XSRF check.
///
/// Created by [`XsrfGuard::protect`].
pub struct Protected<P, H> {
    guard: XsrfGuard<P>,
    inner: H,
}

impl<P, H> Protected<P, H> {
    pub(crate) fn new(guard: XsrfGuard<P>, inner: H) -> Self {
        Self { guard, inner }
    }

    pub fn guard(&self) -> &XsrfGuard<P> {
        &self.guard
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<P, H> Handler for Protected<P, H>
where
    P: SecretProvider + 'static,
    H: Handler,
{
    async fn call(&self, request: Request<Vec<u8>>) -> Response<Vec<u8>> {
        match self.guard.check(&request).await {
            Ok(()) => self.inner.call(request).await,
            Err(err) => {
                let status = err.status();
                if status.is_server_error() {
                    xsrf_log::error!(target: "xsrf::guard", "{} {}: {}", request.method(), request.uri().path(), err);
                } else {
                    xsrf_log::info!(target: "xsrf::guard", "{} {} rejected: {}", request.method(), request.uri().path(), err);
                }
                error_response(status)
            }
        }
    }
}

/// Plain-text response carrying only the status reason.
///
/// The body never says why a token was refused.
pub fn error_response(status: StatusCode) -> Response<Vec<u8>> {
    let body = status.canonical_reason().unwrap_or("Error").as_bytes().to_vec();
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
