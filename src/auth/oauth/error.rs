//! OAuth-specific error types.
//!
//! Every failure of the install, callback and session-token flows is an
//! [`OAuthError`]. The middleware never inspects variants directly; it asks
//! [`OAuthError::kind`] which response class the failure belongs to.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::{ErrorKind, OAuthError};
//!
//! let error = OAuthError::MissingParameter { name: "shop" };
//! assert_eq!(error.to_string(), "Missing `shop` parameter.");
//! assert_eq!(error.kind(), ErrorKind::BadRequest);
//!
//! assert_eq!(OAuthError::StateMismatch.kind(), ErrorKind::Forbidden);
//! ```

use thiserror::Error;

use crate::auth::oauth::hmac::SignatureError;
use crate::clients::HttpError;
use crate::error::ConfigError;
use crate::script_tags::ReconcileError;
use crate::store::StoreError;

/// How a failure is presented to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed. Answered with 400 and the error text.
    BadRequest,
    /// The request could not be authenticated. Answered with 403 and a
    /// generic body.
    Forbidden,
    /// Something on our side or upstream failed. Answered with 500 and a
    /// generic body; the detail goes to the error reporter.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::Internal => 500,
        }
    }
}

/// Errors that can occur while authenticating a request.
///
/// Messages never contain secrets, tokens, state values or codes.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// A required query parameter is absent or empty.
    #[error("Missing `{name}` parameter.")]
    MissingParameter {
        /// The parameter name.
        name: &'static str,
    },

    /// The `shop` parameter is not a valid shop domain.
    #[error("Invalid `shop` parameter: {0}")]
    InvalidShop(#[source] ConfigError),

    /// The request signature is missing or wrong.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// The callback arrived without the `state` cookie set at install time.
    #[error("Missing state cookie")]
    MissingStateCookie,

    /// The callback `state` does not equal the `state` cookie.
    #[error("State parameter mismatch")]
    StateMismatch,

    /// The session-token cookie is absent or unreadable.
    #[error("Invalid session token: {reason}")]
    InvalidSessionToken {
        /// What was wrong with the token.
        reason: String,
    },

    /// A session token could not be serialized.
    #[error("Failed to encode session token: {0}")]
    SessionTokenEncode(#[source] serde_json::Error),

    /// No credential is on file for the shop.
    #[error("Shop is not installed")]
    UnknownShop,

    /// The presented credential is not the one on file.
    #[error("Credential does not match the stored credential")]
    CredentialMismatch,

    /// Exchanging the authorization code failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(#[source] HttpError),

    /// The credential store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The OS random number generator failed.
    #[error("Failed to gather entropy: {0}")]
    Entropy(#[from] rand::Error),

    /// Ensuring the app's script tags failed.
    #[error("Script tag reconciliation failed: {0}")]
    ScriptTag(#[from] ReconcileError),
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};

impl OAuthError {
    /// Classifies the error into the response it should produce.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. }
            | Self::InvalidShop(_)
            | Self::Signature(SignatureError::MissingSignature { .. }) => ErrorKind::BadRequest,
            Self::Signature(SignatureError::Mismatch { .. })
            | Self::MissingStateCookie
            | Self::StateMismatch
            | Self::InvalidSessionToken { .. }
            | Self::UnknownShop
            | Self::CredentialMismatch => ErrorKind::Forbidden,
            Self::TokenExchange(_)
            | Self::SessionTokenEncode(_)
            | Self::Store(_)
            | Self::Entropy(_)
            | Self::ScriptTag(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` when the error should be reported and hidden from the
    /// client.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::hmac::SignatureScheme;
    use crate::clients::HttpResponseError;

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(
            OAuthError::MissingParameter { name: "code" }.kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            OAuthError::Signature(SignatureError::MissingSignature { param: "hmac" }).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            OAuthError::InvalidShop(ConfigError::InvalidShopDomain {
                domain: "bad domain".to_string()
            })
            .kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_integrity_failures_are_forbidden() {
        let errors = [
            OAuthError::Signature(SignatureError::Mismatch {
                scheme: SignatureScheme::Hmac,
            }),
            OAuthError::MissingStateCookie,
            OAuthError::StateMismatch,
            OAuthError::InvalidSessionToken {
                reason: "not base64".to_string(),
            },
            OAuthError::UnknownShop,
            OAuthError::CredentialMismatch,
        ];
        for error in errors {
            assert_eq!(error.kind(), ErrorKind::Forbidden, "{error}");
        }
    }

    #[test]
    fn test_upstream_failures_are_internal() {
        let error = OAuthError::TokenExchange(HttpError::Response(HttpResponseError {
            code: 502,
            message: "{}".to_string(),
            error_reference: None,
        }));
        assert!(error.is_internal());
        assert_eq!(error.kind().status_code(), 500);

        let error = OAuthError::Store(StoreError::Unavailable {
            reason: "connection refused".to_string(),
        });
        assert!(error.is_internal());
    }

    #[test]
    fn test_state_mismatch_does_not_leak_values() {
        assert_eq!(OAuthError::StateMismatch.to_string(), "State parameter mismatch");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }
}
