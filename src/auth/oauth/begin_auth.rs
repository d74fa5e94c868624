//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of an install: it generates a state nonce
//! and the Shopify authorization URL the merchant is redirected to. The
//! nonce must be stored client-side (the middleware uses the `state` cookie)
//! and compared with the `state` parameter of the callback.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::{AppConfig, ApiKey, ApiSecretKey, PublicUrl, ShopDomain};
//! use shopify_app_auth::auth::oauth::begin_auth;
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .public_url(PublicUrl::new("https://myapp.example.com").unwrap())
//!     .scopes("read_products,write_script_tags".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let shop = ShopDomain::new("test-shop").unwrap();
//! let result = begin_auth(&config, &shop).unwrap();
//!
//! assert!(result
//!     .auth_url
//!     .starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
//!
//! let url = url::Url::parse(&result.auth_url).unwrap();
//! let state = url.query_pairs().find(|(key, _)| key == "state").unwrap().1;
//! assert_eq!(state, result.state.as_ref());
//! ```

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::state::StateNonce;
use crate::config::{AppConfig, ShopDomain};

/// Result of initiating OAuth authorization.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to redirect the merchant to.
    pub auth_url: String,

    /// The nonce sent as `state`. Persist it and compare it with the
    /// callback's `state` parameter.
    pub state: StateNonce,
}

/// Builds the authorization URL for installing the app on `shop`.
///
/// The URL is
/// `https://{shop}/admin/oauth/authorize?client_id=…&scope=…&state=…&redirect_uri=…`
/// where `scope` is the comma-joined configured scopes and `redirect_uri` is
/// the public URL joined with the callback path.
///
/// # Errors
///
/// Returns [`OAuthError::Entropy`] if no state nonce can be generated.
pub fn begin_auth(config: &AppConfig, shop: &ShopDomain) -> Result<BeginAuthResult, OAuthError> {
    let state = StateNonce::generate()?;
    let redirect_uri = config.redirect_uri();

    let params = [
        ("client_id", config.api_key().as_ref().to_string()),
        ("scope", config.scopes().to_string()),
        ("state", state.as_ref().to_string()),
        ("redirect_uri", redirect_uri.to_string()),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    Ok(BeginAuthResult { auth_url, state })
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};
