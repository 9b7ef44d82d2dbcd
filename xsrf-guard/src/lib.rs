//! # XSRF request guard
//!
//! Enforces XSRF tokens on `http` requests. The guard takes the token from
//! the `xsrf` parameter (query string or body) or the `X-XSRF-Token`
//! header, binds it to the caller's identity and the request path, and
//! rejects the request with 403 when validation fails.
//!
//! ## Usage
//!
//! ```rust
//! use http::{Method, Request, Response, StatusCode};
//! use xsrf_guard::{Handler, Principal, XsrfGuard, handler_fn};
//! use xsrf_secret::CachedSecretProvider;
//! use xsrf_token::XsrfConfig;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let guard = XsrfGuard::new(XsrfConfig::default(), CachedSecretProvider::in_memory());
//!
//! // Render a form with a token bound to the submit path.
//! let mut page = Request::new(Vec::new());
//! page.extensions_mut().insert(Principal::new("u42"));
//! let token = guard.token_for(&page, Some("/submit")).await.unwrap();
//!
//! let submit = guard.protect(handler_fn(|_req: Request<Vec<u8>>| async {
//!     Response::new(b"saved".to_vec())
//! }));
//!
//! let mut request = Request::builder()
//!     .method(Method::POST)
//!     .uri("/submit")
//!     .body(format!("xsrf={}", token).into_bytes())
//!     .unwrap();
//! request.extensions_mut().insert(Principal::new("u42"));
//! assert_eq!(submit.call(request).await.status(), StatusCode::OK);
//!
//! let forged = Request::builder()
//!     .method(Method::POST)
//!     .uri("/submit")
//!     .body(b"xsrf=forged".to_vec())
//!     .unwrap();
//! assert_eq!(submit.call(forged).await.status(), StatusCode::FORBIDDEN);
//! # }
//! ```

pub mod error;
pub mod guard;
pub mod handler;
pub mod identity;

pub use error::{GuardError, Result};
pub use guard::XsrfGuard;
pub use handler::{Handler, HandlerFn, Protected, error_response, handler_fn};
pub use identity::{ExtensionIdentity, IdentityResolver, Principal};
