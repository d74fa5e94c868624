//! OAuth callback validation and token exchange.
//!
//! After the merchant approves the install, Shopify redirects to the app's
//! callback path with `shop`, `state`, `code` and a signature.
//! [`validate_auth_callback`]:
//!
//! 1. Verifies the signature (falling back to the old secret when set)
//! 2. Checks `shop` and compares `state` with the `state` cookie
//! 3. Exchanges `code` for a durable credential
//! 4. Saves the credential in the store
//!
//! Nothing is stored unless every check passes.

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::{verify_query, QueryParams};
use crate::auth::oauth::state::StateNonce;
use crate::auth::AuthenticatedShop;
use crate::clients::AdminClient;
use crate::config::{AppConfig, ShopDomain};
use crate::store::CredentialStore;

/// Reads and validates the `shop` query parameter.
///
/// # Errors
///
/// Returns [`OAuthError::MissingParameter`] when it is absent or empty and
/// [`OAuthError::InvalidShop`] when it is not a shop domain.
pub fn shop_from_query(params: &QueryParams) -> Result<ShopDomain, OAuthError> {
    let shop = params
        .get_non_empty("shop")
        .ok_or(OAuthError::MissingParameter { name: "shop" })?;
    ShopDomain::new(shop).map_err(OAuthError::InvalidShop)
}

/// Validates an OAuth callback, exchanges the code and stores the credential.
///
/// `state_cookie` is the value of the `state` cookie set before the install
/// redirect, if the browser sent one back.
///
/// # Errors
///
/// - [`OAuthError::Signature`]: missing (400) or wrong (403) signature
/// - [`OAuthError::MissingParameter`] / [`OAuthError::InvalidShop`]: bad
///   `shop` or missing `code` (400)
/// - [`OAuthError::MissingStateCookie`] / [`OAuthError::StateMismatch`]:
///   the state check failed (403)
/// - [`OAuthError::TokenExchange`] / [`OAuthError::Store`]: upstream
///   failure (500)
///
/// # Example
///
/// ```rust,ignore
/// let params = QueryParams::parse(request.uri().query().unwrap_or_default());
/// let session = validate_auth_callback(&config, &client, &store, &params, cookie).await?;
/// println!("installed on {}", session.shop);
/// ```
pub async fn validate_auth_callback(
    config: &AppConfig,
    client: &AdminClient,
    store: &dyn CredentialStore,
    params: &QueryParams,
    state_cookie: Option<&str>,
) -> Result<AuthenticatedShop, OAuthError> {
    verify_query(params, config.signing_secrets().map(|key| key.as_ref()))?;

    let shop = shop_from_query(params)?;

    let expected = state_cookie
        .filter(|value| !value.is_empty())
        .map(StateNonce::from_raw)
        .ok_or(OAuthError::MissingStateCookie)?;
    if !expected.matches(params.get("state").unwrap_or_default()) {
        return Err(OAuthError::StateMismatch);
    }

    let code = params
        .get_non_empty("code")
        .ok_or(OAuthError::MissingParameter { name: "code" })?;

    let credential = client
        .exchange_code_for_token(&shop, config.api_key(), config.api_secret_key(), code)
        .await
        .map_err(OAuthError::TokenExchange)?;

    store.update(&shop, credential.clone()).await?;
    tracing::debug!(shop = %shop, scope = %credential.scope, "stored credential after install");

    Ok(AuthenticatedShop::new(shop, credential))
}
