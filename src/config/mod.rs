//! Configuration types for embedded app authentication.
//!
//! # Overview
//!
//! - [`AppConfig`]: credentials, scopes, URLs, and cookie policy for the app
//! - [`AppConfigBuilder`]: a builder for constructing [`AppConfig`] instances
//! - [`ApiKey`]: a validated API key newtype
//! - [`ApiSecretKey`]: a validated API secret key with masked debug output
//! - [`ShopDomain`]: a validated Shopify shop domain
//! - [`PublicUrl`]: the validated public URL of the application
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::{AppConfig, ApiKey, ApiSecretKey, PublicUrl};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .public_url(PublicUrl::new("https://myapp.example.com").unwrap())
//!     .scopes("read_products,write_script_tags".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.callback_path(), "/oauth/callback");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiSecretKey, PublicUrl, ShopDomain};

use std::time::Duration;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Default path on which the OAuth callback is served.
pub const DEFAULT_CALLBACK_PATH: &str = "/oauth/callback";

/// Default lifetime of the `session-token` cookie.
pub const DEFAULT_SESSION_TOKEN_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Default lifetime of the `state` cookie set before the install redirect.
pub const DEFAULT_STATE_COOKIE_MAX_AGE: Duration = Duration::from_secs(10 * 60);

/// Configuration for an embedded Shopify application.
///
/// `AppConfig` is `Clone`, `Send`, and `Sync` and is typically shared behind
/// an `Arc` by the middleware stack.
///
/// # Key Rotation
///
/// When `old_api_secret_key` is set, signature verification falls back to it
/// after the primary secret fails, so requests signed before a rotation keep
/// verifying until the old secret is removed.
#[derive(Clone, Debug)]
pub struct AppConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    public_url: PublicUrl,
    callback_path: String,
    is_embedded: bool,
    secure_cookies: bool,
    session_token_max_age: Duration,
    state_cookie_max_age: Duration,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the previous API secret key, if one is still accepted.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the secrets accepted for signature verification, primary first.
    pub fn signing_secrets(&self) -> impl Iterator<Item = &ApiSecretKey> {
        std::iter::once(&self.api_secret_key).chain(self.old_api_secret_key.as_ref())
    }

    /// Returns the OAuth scopes requested on install.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the public URL of the application.
    #[must_use]
    pub const fn public_url(&self) -> &PublicUrl {
        &self.public_url
    }

    /// Returns the path on which the OAuth callback is served.
    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// Returns the absolute OAuth `redirect_uri`.
    #[must_use]
    pub fn redirect_uri(&self) -> url::Url {
        self.public_url.join_path(&self.callback_path)
    }

    /// Returns whether the app runs inside the Shopify admin iframe.
    ///
    /// Embedded apps redirect through an HTML shim that navigates the top
    /// window instead of answering with a bare `303 See Other`.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Returns whether cookies are issued with the `Secure` attribute.
    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Returns the lifetime of the `session-token` cookie.
    #[must_use]
    pub const fn session_token_max_age(&self) -> Duration {
        self.session_token_max_age
    }

    /// Returns the lifetime of the `state` cookie.
    #[must_use]
    pub const fn state_cookie_max_age(&self) -> Duration {
        self.state_cookie_max_age
    }
}

// Verify AppConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppConfig>();
};

/// Builder for constructing [`AppConfig`] instances.
///
/// Required fields are `api_key`, `api_secret_key`, and `public_url`.
///
/// # Defaults
///
/// - `scopes`: empty
/// - `callback_path`: [`DEFAULT_CALLBACK_PATH`]
/// - `is_embedded`: `true`
/// - `secure_cookies`: `true`
/// - `session_token_max_age`: one hour
/// - `state_cookie_max_age`: ten minutes
/// - `old_api_secret_key`: `None`
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    public_url: Option<PublicUrl>,
    callback_path: Option<String>,
    is_embedded: Option<bool>,
    secure_cookies: Option<bool>,
    session_token_max_age: Option<Duration>,
    state_cookie_max_age: Option<Duration>,
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key, accepted during key rotation.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes requested on install.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the public URL of the application (required).
    #[must_use]
    pub fn public_url(mut self, url: PublicUrl) -> Self {
        self.public_url = Some(url);
        self
    }

    /// Sets the path on which the OAuth callback is served.
    #[must_use]
    pub fn callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = Some(path.into());
        self
    }

    /// Sets whether the app is embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = Some(embedded);
        self
    }

    /// Sets whether cookies carry the `Secure` attribute.
    ///
    /// Only disable this for plain-HTTP local development.
    #[must_use]
    pub const fn secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = Some(secure);
        self
    }

    /// Sets the lifetime of the `session-token` cookie.
    #[must_use]
    pub const fn session_token_max_age(mut self, max_age: Duration) -> Self {
        self.session_token_max_age = Some(max_age);
        self
    }

    /// Sets the lifetime of the `state` cookie.
    #[must_use]
    pub const fn state_cookie_max_age(mut self, max_age: Duration) -> Self {
        self.state_cookie_max_age = Some(max_age);
        self
    }

    /// Builds the [`AppConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key`,
    /// `api_secret_key`, or `public_url` are not set, and
    /// [`ConfigError::InvalidCallbackPath`] if the callback path is not
    /// absolute.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let public_url = self
            .public_url
            .ok_or(ConfigError::MissingRequiredField {
                field: "public_url",
            })?;

        let callback_path = self
            .callback_path
            .unwrap_or_else(|| DEFAULT_CALLBACK_PATH.to_string());
        if !callback_path.starts_with('/') {
            return Err(ConfigError::InvalidCallbackPath {
                path: callback_path,
            });
        }

        Ok(AppConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes: self.scopes.unwrap_or_default(),
            public_url,
            callback_path,
            is_embedded: self.is_embedded.unwrap_or(true),
            secure_cookies: self.secure_cookies.unwrap_or(true),
            session_token_max_age: self
                .session_token_max_age
                .unwrap_or(DEFAULT_SESSION_TOKEN_MAX_AGE),
            state_cookie_max_age: self
                .state_cookie_max_age
                .unwrap_or(DEFAULT_STATE_COOKIE_MAX_AGE),
        })
    }
}
