//! App proxy verification.
//!
//! Proxy requests carry the legacy `signature` parameter and must come from an
//! installed shop.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::reporter::ErrorContext;
use super::ShopifyApp;
use crate::auth::oauth::hmac::{verify_query_with, QueryParams, SignatureScheme};
use crate::auth::oauth::{shop_from_query, OAuthError};
use crate::auth::AuthenticatedShop;

/// Admits app proxy requests.
///
/// Shopify signs proxied requests with the legacy `signature` parameter
/// only. After verification the shop must have a stored credential; the
/// protected service then sees it as an [`AuthenticatedShop`] extension.
pub async fn verify_proxy_request(
    State(app): State<ShopifyApp>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = ErrorContext::new("verify_proxy_request", &request);
    let params = QueryParams::parse(request.uri().query().unwrap_or_default());

    let secrets = app.config().signing_secrets().map(|key| key.as_ref());
    if let Err(error) = verify_query_with(&params, SignatureScheme::Legacy, secrets) {
        return app.reject(&context, error.into());
    }

    let shop = match shop_from_query(&params) {
        Ok(shop) => shop,
        Err(error) => return app.reject(&context, error),
    };
    let context = context.with_shop(&shop);

    let credential = match app.store().get(&shop).await {
        Ok(Some(credential)) => credential,
        Ok(None) => return app.reject(&context, OAuthError::UnknownShop),
        Err(error) => return app.reject(&context, error.into()),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedShop::new(shop, credential));
    next.run(request).await
}
