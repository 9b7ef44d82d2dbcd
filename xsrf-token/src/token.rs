//! Token construction and verification.
//!
//! Wire format: `base64url_nopad(HMAC-SHA256(secret, identity ':' path ':' issued_at) ':' issued_at)`
//! where `issued_at` is decimal seconds since the Unix epoch.

use crate::compare::constant_time_eq;
use crate::error::{Result, TokenError};
use crate::secret::Secret;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator between MAC fields and between digest and timestamp.
pub const DELIMITER: u8 = b':';

/// Length of the raw HMAC-SHA256 digest.
pub const DIGEST_LEN: usize = 32;

/// Default maximum token age: 24 hours.
pub const DEFAULT_TIMEOUT_SECS: i64 = 24 * 60 * 60;

/// Identity used when the request has no authenticated principal.
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// A decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsrfToken {
    digest: Vec<u8>,
    issued_at: i64,
}

impl XsrfToken {
    /// Compute the token for `(identity, path, issued_at)` under `secret`.
    pub fn issue(secret: &Secret, identity: &str, path: &str, issued_at: i64) -> Self {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(identity.as_bytes());
        mac.update(&[DELIMITER]);
        mac.update(path.as_bytes());
        mac.update(&[DELIMITER]);
        mac.update(issued_at.to_string().as_bytes());

        Self {
            digest: mac.finalize().into_bytes().to_vec(),
            issued_at,
        }
    }

    /// Parse a token string.
    ///
    /// Only the shape is checked here: the payload must decode and end in a
    /// delimiter followed by an integer timestamp. The digest is whatever
    /// precedes the last delimiter and may itself contain delimiter bytes.
    pub fn decode(encoded: &str) -> Result<Self> {
        if encoded.is_empty() {
            return Err(TokenError::Missing);
        }

        let payload = URL_SAFE_NO_PAD.decode(encoded)?;

        let split = payload
            .iter()
            .rposition(|&b| b == DELIMITER)
            .ok_or_else(|| TokenError::Malformed("no delimiter".to_string()))?;

        let (digest, timestamp) = (&payload[..split], &payload[split + 1..]);

        let issued_at = std::str::from_utf8(timestamp)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| TokenError::Malformed("unparsable timestamp".to_string()))?;

        Ok(Self {
            digest: digest.to_vec(),
            issued_at,
        })
    }

    /// Encode to the URL-safe wire form.
    pub fn encode(&self) -> String {
        let timestamp = self.issued_at.to_string();
        let mut payload = Vec::with_capacity(self.digest.len() + 1 + timestamp.len());
        payload.extend_from_slice(&self.digest);
        payload.push(DELIMITER);
        payload.extend_from_slice(timestamp.as_bytes());
        URL_SAFE_NO_PAD.encode(payload)
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Claimed issuance time, seconds since the epoch.
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Seconds elapsed between issuance and `now`. Negative for tokens
    /// stamped in the future; `None` when the difference overflows.
    pub fn age_at(&self, now: i64) -> Option<i64> {
        now.checked_sub(self.issued_at)
    }
}

/// Current time in whole seconds since the epoch.
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Generate a token for `identity` acting on `path`, issued now.
pub fn generate_token(secret: &Secret, identity: &str, path: &str) -> String {
    generate_token_at(secret, identity, path, now_secs())
}

/// Generate a token with an explicit issuance time.
///
/// Deterministic: the same inputs always produce the same string.
pub fn generate_token_at(secret: &Secret, identity: &str, path: &str, issued_at: i64) -> String {
    XsrfToken::issue(secret, identity, path, issued_at).encode()
}

/// Check `token` for `identity` and `path` against the current time.
pub fn validate_token(
    secret: &Secret,
    token: &str,
    identity: &str,
    path: &str,
    timeout_secs: i64,
) -> bool {
    validate_token_at(secret, token, identity, path, now_secs(), timeout_secs)
}

/// Check `token` at an explicit `now`.
///
/// Every failure (empty, undecodable, expired, forged) yields `false`; the
/// reason is only logged at debug level.
pub fn validate_token_at(
    secret: &Secret,
    token: &str,
    identity: &str,
    path: &str,
    now: i64,
    timeout_secs: i64,
) -> bool {
    match verify_token_at(secret, token, identity, path, now, timeout_secs) {
        Ok(()) => true,
        Err(reason) => {
            xsrf_log::debug!(target: "xsrf::token", "token rejected for path {:?}: {}", path, reason);
            false
        }
    }
}

pub(crate) fn verify_token_at(
    secret: &Secret,
    token: &str,
    identity: &str,
    path: &str,
    now: i64,
    timeout_secs: i64,
) -> Result<()> {
    let claimed = XsrfToken::decode(token)?;

    // Only tokens that are too old are refused; future timestamps pass this
    // check and are left to the MAC comparison.
    // An age too large to represent is older than any timeout.
    match claimed.age_at(now) {
        Some(age) if age <= timeout_secs => {}
        age => {
            return Err(TokenError::Expired {
                age: age.unwrap_or(i64::MAX),
                timeout: timeout_secs,
            });
        }
    }

    // Recompute with the claimed timestamp, not `now`.
    let expected = generate_token_at(secret, identity, path, claimed.issued_at);
    if constant_time_eq(expected.as_bytes(), token.as_bytes()) {
        Ok(())
    } else {
        Err(TokenError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> Secret {
        Secret::try_from("k1").unwrap()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate_token_at(&secret(), "u42", "/submit", 1_000_000_000);
        let b = generate_token_at(&secret(), "u42", "/submit", 1_000_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_is_url_safe() {
        for when in [0, 1, 1_000_000_000, i64::MAX, -42] {
            let token = generate_token_at(&secret(), "user", "/a/b?c=d", when);
            assert!(
                token
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
                "unsafe character in {}",
                token
            );
        }
    }

    #[test]
    fn test_decode_recovers_fields() {
        let token = XsrfToken::issue(&secret(), "u42", "/submit", 1_234_567_890);
        let decoded = XsrfToken::decode(&token.encode()).unwrap();
        assert_eq!(decoded.issued_at(), 1_234_567_890);
        assert_eq!(decoded.digest().len(), DIGEST_LEN);
        assert_eq!(decoded, token);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(XsrfToken::decode(""), Err(TokenError::Missing));
        assert!(matches!(
            XsrfToken::decode("not-base64!!"),
            Err(TokenError::Malformed(_))
        ));

        let no_delimiter = URL_SAFE_NO_PAD.encode(b"validly-encoded-but-no-delimiter");
        assert!(matches!(
            XsrfToken::decode(&no_delimiter),
            Err(TokenError::Malformed(_))
        ));

        let bad_timestamp = URL_SAFE_NO_PAD.encode(b"digest:soon");
        assert!(matches!(
            XsrfToken::decode(&bad_timestamp),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_digest_may_contain_delimiter() {
        let mut payload = vec![0xAA, DELIMITER, 0xBB];
        payload.push(DELIMITER);
        payload.extend_from_slice(b"77");
        let decoded = XsrfToken::decode(&URL_SAFE_NO_PAD.encode(&payload)).unwrap();
        assert_eq!(decoded.digest(), &[0xAA, DELIMITER, 0xBB]);
        assert_eq!(decoded.issued_at(), 77);
    }

    #[test]
    fn test_padded_token_rejected() {
        let token = generate_token_at(&secret(), "u", "/p", 10);
        let padding = (4 - token.len() % 4) % 4;
        if padding > 0 {
            let padded = format!("{}{}", token, "=".repeat(padding));
            assert!(!validate_token_at(&secret(), &padded, "u", "/p", 10, 100));
        }
    }

    #[test]
    fn test_concrete_scenario() {
        let issued = 1_000_000_000;
        let token = generate_token_at(&secret(), "u42", "/submit", issued);

        assert!(validate_token_at(
            &secret(),
            &token,
            "u42",
            "/submit",
            issued + 86_399,
            86_400
        ));
        assert!(!validate_token_at(
            &secret(),
            &token,
            "u42",
            "/submit",
            issued + 86_401,
            86_400
        ));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let token = generate_token_at(&secret(), "u", "/p", 5_000);
        assert!(validate_token_at(&secret(), &token, "u", "/p", 5_100, 100));
        assert_eq!(
            verify_token_at(&secret(), &token, "u", "/p", 5_101, 100),
            Err(TokenError::Expired {
                age: 101,
                timeout: 100
            })
        );
    }

    #[test]
    fn test_future_token_not_rejected_for_age() {
        let token = generate_token_at(&secret(), "u", "/p", 10_000);
        assert!(validate_token_at(&secret(), &token, "u", "/p", 9_000, 100));
    }

    #[test]
    fn test_identity_and_path_binding() {
        let token = generate_token_at(&secret(), "alice", "/a", 100);
        assert!(validate_token_at(&secret(), &token, "alice", "/a", 100, 10));
        assert_eq!(
            verify_token_at(&secret(), &token, "bob", "/a", 100, 10),
            Err(TokenError::Mismatch)
        );
        assert!(!validate_token_at(&secret(), &token, "alice", "/b", 100, 10));
    }

    #[test]
    fn test_delimiter_inside_fields_is_not_escaped() {
        // Fields are joined with ':' verbatim, so moving a delimiter across
        // the identity/path boundary yields the same MAC input.
        let first = generate_token_at(&secret(), "a", "b:c", 1);
        let second = generate_token_at(&secret(), "a:b", "c", 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_overflowing_age_is_expired() {
        let token = generate_token_at(&secret(), "u", "/p", i64::MIN + 1);
        assert_eq!(
            verify_token_at(&secret(), &token, "u", "/p", 1_000, i64::MAX),
            Err(TokenError::Expired {
                age: i64::MAX,
                timeout: i64::MAX
            })
        );
        assert!(!validate_token_at(&secret(), &token, "u", "/p", 1_000, i64::MAX));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_token_at(&secret(), "u", "/p", 100);
        let other = Secret::try_from("k2").unwrap();
        assert!(!validate_token_at(&other, &token, "u", "/p", 100, 10));
    }

    #[test]
    fn test_timestamp_tampering_rejected() {
        let issued = XsrfToken::issue(&secret(), "u", "/p", 100);
        let forged = XsrfToken {
            digest: issued.digest().to_vec(),
            issued_at: 200,
        };
        assert!(!validate_token_at(&secret(), &forged.encode(), "u", "/p", 200, 1_000));
    }

    #[test]
    fn test_empty_identity_and_path_are_valid() {
        let token = generate_token_at(&secret(), "", "", 42);
        assert!(validate_token_at(&secret(), &token, "", "", 42, 0));
    }

    #[test]
    fn test_validate_against_clock() {
        let token = generate_token(&secret(), "u", "/p");
        assert!(validate_token(&secret(), &token, "u", "/p", DEFAULT_TIMEOUT_SECS));
    }
}
