//! # Access Guard
//!
//! A single shared secret protects every gated operation. Clients present
//! the standard-alphabet base64 encoding of that secret in the
//! `access_token` query parameter; the guard recomputes the encoding and
//! compares byte-for-byte.
//!
//! The check is stateless and re-run on every gated request. There is no
//! lockout or rate limiting; comparison runs in constant time over equal
//! lengths.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

use crate::error::Unauthorized;

/// The configured shared secret.
///
/// Custom `Debug` redacts the value to prevent credential leakage in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The form clients must present: base64 (standard alphabet, padded).
    pub fn encoded(&self) -> String {
        STANDARD.encode(self.0.as_bytes())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Compares caller-supplied tokens against the encoded secret.
#[derive(Clone)]
pub struct AccessGuard {
    expected: String,
}

impl AccessGuard {
    /// Build a guard for the given secret. The encoding is computed once.
    pub fn new(secret: &AccessToken) -> Self {
        Self {
            expected: secret.encoded(),
        }
    }

    /// Succeed iff `supplied` equals the encoded secret byte-for-byte.
    /// A missing token never matches.
    pub fn authenticate(&self, supplied: Option<&str>) -> Result<(), Unauthorized> {
        match supplied {
            Some(token) if constant_time_eq(token.as_bytes(), self.expected.as_bytes()) => Ok(()),
            _ => Err(Unauthorized),
        }
    }
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("expected", &"[REDACTED]")
            .finish()
    }
}

fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided.ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_form_is_standard_base64() {
        assert_eq!(AccessToken::new("s3cret").encoded(), "czNjcmV0");
        // Standard alphabet with padding, not URL-safe.
        assert_eq!(AccessToken::new("\u{fb}\u{ff}").encoded(), "w7vDvw==");
        assert_eq!(AccessToken::new(">>>?").encoded(), "Pj4+Pw==");
    }

    #[test]
    fn accepts_only_encoded_secret() {
        let guard = AccessGuard::new(&AccessToken::new("s3cret"));
        assert_eq!(guard.authenticate(Some("czNjcmV0")), Ok(()));
        assert_eq!(guard.authenticate(Some("s3cret")), Err(Unauthorized));
        assert_eq!(guard.authenticate(Some("czNjcmV0 ")), Err(Unauthorized));
        assert_eq!(guard.authenticate(Some("czNjcmV")), Err(Unauthorized));
        assert_eq!(guard.authenticate(Some("")), Err(Unauthorized));
        assert_eq!(guard.authenticate(None), Err(Unauthorized));
    }

    #[test]
    fn empty_secret_encodes_to_empty_token() {
        let guard = AccessGuard::new(&AccessToken::new(""));
        assert_eq!(guard.authenticate(Some("")), Ok(()));
        assert_eq!(guard.authenticate(None), Err(Unauthorized));
    }

    #[test]
    fn debug_redacts_secret() {
        let token = AccessToken::new("hunter2");
        assert!(!format!("{token:?}").contains("hunter2"));
        let guard = AccessGuard::new(&token);
        let dbg = format!("{guard:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(!dbg.contains(&token.encoded()));
    }
}
