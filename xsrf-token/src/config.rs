use crate::error::ConfigError;
use crate::token::{ANONYMOUS_IDENTITY, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::env;

/// XSRF protection configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct XsrfConfig {
    /// Maximum token age in seconds
    pub timeout_secs: i64,

    /// Identity used for requests without an authenticated principal
    pub anonymous_identity: String,

    /// Request parameter carrying the token (query string or body)
    pub field_name: String,

    /// Header checked when the parameter is absent
    pub header_name: String,

    /// Methods passed through without a token check
    pub safe_methods: Vec<String>,

    /// Path prefixes passed through without a token check
    pub exclude_paths: Vec<String>,
}

impl Default for XsrfConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            anonymous_identity: ANONYMOUS_IDENTITY.to_string(),
            field_name: "xsrf".to_string(),
            header_name: "X-XSRF-Token".to_string(),
            safe_methods: Vec::new(),
            exclude_paths: Vec::new(),
        }
    }
}

impl XsrfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from `XSRF_*` environment variables.
    ///
    /// Recognized: `XSRF_TIMEOUT_SECONDS`, `XSRF_ANONYMOUS_IDENTITY`,
    /// `XSRF_FIELD_NAME`, `XSRF_HEADER_NAME`, `XSRF_SAFE_METHODS` and
    /// `XSRF_EXCLUDE_PATHS` (the last two comma separated).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("XSRF_TIMEOUT_SECONDS") {
            let timeout = raw
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "XSRF_TIMEOUT_SECONDS".to_string(),
                    message: e.to_string(),
                })?;
            if timeout < 0 {
                return Err(ConfigError::InvalidValue {
                    key: "XSRF_TIMEOUT_SECONDS".to_string(),
                    message: "must not be negative".to_string(),
                });
            }
            config.timeout_secs = timeout;
        }

        if let Some(identity) = lookup("XSRF_ANONYMOUS_IDENTITY") {
            config.anonymous_identity = identity;
        }

        if let Some(name) = lookup("XSRF_FIELD_NAME") {
            config.field_name = non_empty("XSRF_FIELD_NAME", name)?;
        }

        if let Some(name) = lookup("XSRF_HEADER_NAME") {
            config.header_name = non_empty("XSRF_HEADER_NAME", name)?;
        }

        if let Some(methods) = lookup("XSRF_SAFE_METHODS") {
            config.safe_methods = split_list(&methods)
                .into_iter()
                .map(|m| m.to_ascii_uppercase())
                .collect();
        }

        if let Some(paths) = lookup("XSRF_EXCLUDE_PATHS") {
            config.exclude_paths = split_list(&paths);
        }

        Ok(config)
    }

    /// Set maximum token age
    pub fn with_timeout_secs(mut self, timeout_secs: i64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set anonymous identity
    pub fn with_anonymous_identity(mut self, identity: impl Into<String>) -> Self {
        self.anonymous_identity = identity.into();
        self
    }

    /// Set request parameter name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Set header name
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set methods that skip the token check, e.g. `["GET", "HEAD"]`
    pub fn with_safe_methods(mut self, methods: Vec<String>) -> Self {
        self.safe_methods = methods;
        self
    }

    /// Set excluded path prefixes
    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }

    /// Identity to bind a token to: the principal, or the anonymous identity.
    pub fn identity_or_anonymous<'a>(&'a self, principal: Option<&'a str>) -> &'a str {
        principal.unwrap_or(&self.anonymous_identity)
    }
}

fn non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        })
    } else {
        Ok(value)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
