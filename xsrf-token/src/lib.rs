//! # XSRF tokens
//!
//! Stateless anti-forgery tokens bound to an identity, a resource path and an
//! issuance time, signed with a server-held secret.
//!
//! A token is `base64url(HMAC-SHA256(secret, identity ':' path ':' t) ':' t)`.
//! Validation decodes the claimed `t`, refuses tokens older than the timeout,
//! recomputes the token for `t` and compares the two in constant time. There
//! is no server-side record of issued tokens.
//!
//! ## Quick Start
//!
//! ```rust
//! use xsrf_token::{Secret, generate_token_at, validate_token_at};
//!
//! let secret = Secret::try_from("k1").unwrap();
//! let token = generate_token_at(&secret, "u42", "/submit", 1_000_000_000);
//!
//! assert!(validate_token_at(&secret, &token, "u42", "/submit", 1_000_086_399, 86_400));
//! assert!(!validate_token_at(&secret, &token, "u42", "/submit", 1_000_086_401, 86_400));
//! assert!(!validate_token_at(&secret, &token, "bob", "/submit", 1_000_000_000, 86_400));
//! ```
//!
//! ## With configuration
//!
//! ```rust
//! use xsrf_token::{Secret, XsrfCodec, XsrfConfig};
//!
//! let codec = XsrfCodec::new(XsrfConfig::default().with_timeout_secs(3600));
//! let secret = Secret::generate();
//!
//! // `None` binds the token to the anonymous identity.
//! let token = codec.generate(&secret, None, "/comments/new");
//! assert!(codec.validate(&secret, &token, None, "/comments/new"));
//! ```
//!
//! Validation never returns an error: malformed, expired and forged tokens
//! all produce `false`.

pub mod codec;
pub mod compare;
pub mod config;
pub mod error;
pub mod secret;
pub mod token;

pub use codec::XsrfCodec;
pub use compare::{constant_time_eq, constant_time_str_eq};
pub use config::XsrfConfig;
pub use error::{ConfigError, Result, TokenError};
pub use secret::{SECRET_ENTROPY_BYTES, Secret};
pub use token::{
    ANONYMOUS_IDENTITY, DEFAULT_TIMEOUT_SECS, DELIMITER, DIGEST_LEN, XsrfToken, generate_token,
    generate_token_at, now_secs, validate_token, validate_token_at,
};
