use http::StatusCode;
use thiserror::Error;
use xsrf_secret::SecretError;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Missing XSRF token")]
    MissingToken,

    #[error("Invalid XSRF token")]
    InvalidToken,

    #[error("XSRF secret unavailable: {0}")]
    Secret(#[from] SecretError),
}

impl GuardError {
    /// Status for the rejection response.
    ///
    /// Token problems are the client's (403). A missing secret is ours (500).
    pub fn status(&self) -> StatusCode {
        match self {
            GuardError::MissingToken | GuardError::InvalidToken => StatusCode::FORBIDDEN,
            GuardError::Secret(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
