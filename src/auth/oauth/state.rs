//! State nonces for OAuth CSRF protection.
//!
//! A fresh [`StateNonce`] is generated for every install redirect, stored in
//! the `state` cookie, and sent to Shopify as the `state` parameter. The
//! callback is accepted only if both values are identical.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::StateNonce;
//!
//! let state = StateNonce::generate().unwrap();
//! assert_eq!(state.as_ref().len(), 24);
//! assert!(state.matches(state.as_ref()));
//! ```

use base64::prelude::*;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

use crate::auth::oauth::hmac::constant_time_compare;

/// A single-use random value binding an install redirect to its callback.
///
/// Generated from 16 bytes of operating system randomness and encoded as
/// padded URL-safe base64, so it is safe to place in both a cookie and a
/// query string without escaping.
#[derive(Clone, PartialEq, Eq)]
pub struct StateNonce(String);

// Verify StateNonce is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateNonce>();
};

impl StateNonce {
    /// Number of random bytes in a nonce.
    pub const ENTROPY_BYTES: usize = 16;

    /// Generates a new nonce from the operating system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns the RNG error if the operating system cannot provide entropy.
    /// No fallback value is ever produced.
    pub fn generate() -> Result<Self, rand::Error> {
        let mut bytes = [0u8; Self::ENTROPY_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(BASE64_URL_SAFE.encode(bytes)))
    }

    /// Wraps a value received from a cookie or query string.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns `true` if `received` is exactly this nonce.
    ///
    /// The comparison is constant-time and case-sensitive; an empty or
    /// truncated value never matches.
    #[must_use]
    pub fn matches(&self, received: &str) -> bool {
        !self.0.is_empty() && constant_time_compare(&self.0, received)
    }
}

impl AsRef<str> for StateNonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StateNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateNonce(*****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_url_safe_base64_of_16_bytes() {
        let state = StateNonce::generate().unwrap();
        let decoded = BASE64_URL_SAFE.decode(state.as_ref()).unwrap();

        assert_eq!(decoded.len(), StateNonce::ENTROPY_BYTES);
        assert!(state
            .as_ref()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')));
    }

    #[test]
    fn test_generate_is_unique() {
        let a = StateNonce::generate().unwrap();
        let b = StateNonce::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches_requires_exact_value() {
        let state = StateNonce::from_raw("AbCdEf0123456789-_xyzw==");

        assert!(state.matches("AbCdEf0123456789-_xyzw=="));
        assert!(!state.matches("abcdef0123456789-_xyzw=="));
        assert!(!state.matches("AbCdEf0123456789-_xyzw"));
        assert!(!state.matches(""));
    }

    #[test]
    fn test_empty_nonce_matches_nothing() {
        assert!(!StateNonce::from_raw("").matches(""));
    }

    #[test]
    fn test_debug_hides_value() {
        let state = StateNonce::from_raw("visible");
        assert!(!format!("{state:?}").contains("visible"));
    }
}
