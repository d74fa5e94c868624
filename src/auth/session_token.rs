//! Session-token cookies.
//!
//! After install, every authenticated response carries a `session-token`
//! cookie: URL-safe base64 of
//!
//! ```json
//! {"shop": "my-store.myshopify.com", "oauth_token": {"access_token": "…", "scope": "…"}}
//! ```
//!
//! The cookie is a bearer claim, not a signed one. It is honored only while
//! the credential it carries is the one on file in the
//! [`CredentialStore`], so deleting or rotating the stored credential
//! revokes every outstanding token at once.

use base64::prelude::*;
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::auth::oauth::OAuthError;
use crate::auth::{AuthenticatedShop, Credential};
use crate::config::{AppConfig, ShopDomain};
use crate::store::CredentialStore;

/// Name of the session-token cookie.
pub const SESSION_TOKEN_COOKIE: &str = "session-token";

/// The decoded contents of a session-token cookie.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionToken {
    /// The shop the token was issued for.
    pub shop: ShopDomain,
    /// The credential the token was issued with.
    pub oauth_token: Credential,
}

impl SessionToken {
    /// Creates a token for an authenticated shop.
    #[must_use]
    pub fn new(session: &AuthenticatedShop) -> Self {
        Self {
            shop: session.shop.clone(),
            oauth_token: session.credential.clone(),
        }
    }

    /// Encodes the token as a cookie value.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::SessionTokenEncode`] if serialization fails.
    pub fn encode(&self) -> Result<String, OAuthError> {
        let json = serde_json::to_vec(self).map_err(OAuthError::SessionTokenEncode)?;
        Ok(BASE64_URL_SAFE.encode(json))
    }

    /// Decodes a cookie value.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidSessionToken`] if the value is not
    /// URL-safe base64 of the expected JSON.
    pub fn decode(value: &str) -> Result<Self, OAuthError> {
        let json = BASE64_URL_SAFE
            .decode(value)
            .map_err(|e| OAuthError::InvalidSessionToken {
                reason: format!("not base64: {e}"),
            })?;
        serde_json::from_slice(&json).map_err(|e| OAuthError::InvalidSessionToken {
            reason: format!("malformed payload: {e}"),
        })
    }

    /// Builds the `session-token` cookie.
    ///
    /// The cookie is `HttpOnly` with path `/` and the configured max-age.
    /// With secure cookies enabled it is also `Secure` and `SameSite=None`,
    /// which the admin iframe requires.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::SessionTokenEncode`] if encoding fails.
    pub fn to_cookie(&self, config: &AppConfig) -> Result<Cookie<'static>, OAuthError> {
        Ok(app_cookie(
            config,
            SESSION_TOKEN_COOKIE,
            self.encode()?,
            config.session_token_max_age(),
        ))
    }
}

/// Builds a cookie with the app's cookie policy.
pub(crate) fn app_cookie(
    config: &AppConfig,
    name: &'static str,
    value: String,
    max_age: std::time::Duration,
) -> Cookie<'static> {
    let same_site = if config.secure_cookies() {
        SameSite::None
    } else {
        SameSite::Lax
    };
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(same_site)
        .max_age(cookie::time::Duration::seconds(
            i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX),
        ))
        .build()
}

/// Verifies session-token cookie values against the store.
///
/// Every value sent under the cookie name is tried in order; malformed values
/// and values whose credential is not the stored one are skipped. The first
/// match wins and the stored credential is returned.
///
/// # Errors
///
/// - [`OAuthError::InvalidSessionToken`]: no cookie, or none decodes (403)
/// - [`OAuthError::UnknownShop`]: the shop has no stored credential (403)
/// - [`OAuthError::CredentialMismatch`]: the credential was rotated (403)
/// - [`OAuthError::Store`]: the store failed (500)
pub async fn verify_session_token(
    store: &dyn CredentialStore,
    cookie_values: &[&str],
) -> Result<AuthenticatedShop, OAuthError> {
    let mut rejection = OAuthError::InvalidSessionToken {
        reason: format!("missing `{SESSION_TOKEN_COOKIE}` cookie"),
    };

    for value in cookie_values {
        let token = match SessionToken::decode(value) {
            Ok(token) => token,
            Err(e) => {
                rejection = e;
                continue;
            }
        };

        match store.get(&token.shop).await? {
            Some(stored) if stored.matches(&token.oauth_token) => {
                return Ok(AuthenticatedShop::new(token.shop, stored));
            }
            Some(_) => rejection = OAuthError::CredentialMismatch,
            None => rejection = OAuthError::UnknownShop,
        }
    }

    Err(rejection)
}
