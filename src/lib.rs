// xsrf - stateless anti-forgery tokens for state-changing web requests
//
// Tokens bind an identity, a resource path and an issuance time under a
// server-held secret. See the member crates for the individual layers.

// Re-export the token codec
pub use xsrf_token::*;

pub use xsrf_log as log;

#[cfg(feature = "secret")]
pub use xsrf_secret;

#[cfg(feature = "guard")]
pub use xsrf_guard;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Secret, XsrfCodec, XsrfConfig, constant_time_eq, generate_token, generate_token_at,
        validate_token, validate_token_at,
    };

    #[cfg(feature = "secret")]
    pub use xsrf_secret::{
        CachedSecretProvider, FileSecretStore, MemorySecretCache, MemorySecretStore,
        SecretConfig, SecretProvider, StaticSecretProvider,
    };

    #[cfg(feature = "guard")]
    pub use xsrf_guard::{Handler, Principal, XsrfGuard, handler_fn};
}
