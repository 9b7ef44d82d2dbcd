use thiserror::Error;

/// Reasons a token is refused, plus construction errors.
///
/// The validator only uses the rejection variants for logging; callers of
/// [`validate_token`](crate::validate_token) always see a plain `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing XSRF token")]
    Missing,

    #[error("Malformed XSRF token: {0}")]
    Malformed(String),

    #[error("XSRF token expired ({age}s old, limit {timeout}s)")]
    Expired { age: i64, timeout: i64 },

    #[error("XSRF token does not match")]
    Mismatch,

    #[error("Secret must not be empty")]
    EmptySecret,
}

impl From<base64::DecodeError> for TokenError {
    fn from(err: base64::DecodeError) -> Self {
        TokenError::Malformed(err.to_string())
    }
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, TokenError>;
