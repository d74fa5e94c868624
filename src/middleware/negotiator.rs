//! OAuth negotiation for the embedded admin UI.
//!
//! A request for a shop goes one of three ways:
//!
//! - the shop has a credential: the protected service runs with an
//!   [`AuthenticatedShop`] extension and the response refreshes the
//!   `session-token` cookie
//! - the shop has none: the browser is sent to the install page with a fresh
//!   `state` cookie
//! - the request is the install callback: the code is exchanged, the
//!   credential stored and the browser sent back to the app

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::cookies::{append_cookie, cookie_values, expired_state_cookie, state_cookie, STATE_COOKIE};
use super::redirect::client_redirect;
use super::reporter::ErrorContext;
use super::ShopifyApp;
use crate::auth::oauth::hmac::{sign_query, QueryParams};
use crate::auth::oauth::{begin_auth, shop_from_query, validate_auth_callback};
use crate::auth::{AuthenticatedShop, SessionToken};
use crate::config::ShopDomain;

/// Authenticates admin UI requests by shop, installing the app when needed.
///
/// Requests carrying a `state` query parameter are treated as install
/// callbacks.
pub async fn negotiate(State(app): State<ShopifyApp>, mut request: Request, next: Next) -> Response {
    let params = QueryParams::parse(request.uri().query().unwrap_or_default());

    if params.contains("state") {
        return handle_callback(&app, &request, params).await;
    }

    let context = ErrorContext::new("negotiate", &request);
    let shop = match shop_from_query(&params) {
        Ok(shop) => shop,
        Err(error) => return app.reject(&context, error),
    };
    let context = context.with_shop(&shop);

    let credential = match app.store().get(&shop).await {
        Ok(Some(credential)) => credential,
        Ok(None) => return redirect_to_install(&app, &context, &shop),
        Err(error) => return app.reject(&context, error.into()),
    };

    let session = AuthenticatedShop::new(shop, credential);
    let cookie = match SessionToken::new(&session).to_cookie(app.config()) {
        Ok(cookie) => cookie,
        Err(error) => return app.reject(&context, error),
    };

    request.extensions_mut().insert(session);
    let mut response = next.run(request).await;
    append_cookie(&mut response, &cookie);
    response
}

/// Handles the OAuth callback route.
pub async fn oauth_callback(State(app): State<ShopifyApp>, request: Request) -> Response {
    let params = QueryParams::parse(request.uri().query().unwrap_or_default());
    handle_callback(&app, &request, params).await
}

/// Completes an install. Everything needed from the request is copied out
/// before the first await.
fn handle_callback<'a>(
    app: &'a ShopifyApp,
    request: &Request,
    params: QueryParams,
) -> impl std::future::Future<Output = Response> + Send + 'a {
    let context = ErrorContext::new("oauth_callback", request);
    let state_cookie = cookie_values(request.headers(), STATE_COOKIE).into_iter().next();

    async move { complete_install(app, context, state_cookie, params).await }
}

async fn complete_install(
    app: &ShopifyApp,
    context: ErrorContext,
    state_cookie: Option<String>,
    params: QueryParams,
) -> Response {
    let session = match validate_auth_callback(
        app.config(),
        app.admin_client(),
        app.store(),
        &params,
        state_cookie.as_deref(),
    )
    .await
    {
        Ok(session) => session,
        Err(error) => {
            let context = match shop_from_query(&params) {
                Ok(shop) => context.with_shop(&shop),
                Err(_) => context,
            };
            return app.reject(&context, error);
        }
    };

    let mut landing = QueryParams::new();
    landing.set("shop", session.shop.as_ref());
    sign_query(&mut landing, app.config().api_secret_key().as_ref());

    let url = app.config().public_url().with_query(landing.pairs());

    let mut response = client_redirect(app.config().is_embedded(), url.as_str());
    append_cookie(&mut response, &expired_state_cookie(app.config()));
    response
}

fn redirect_to_install(app: &ShopifyApp, context: &ErrorContext, shop: &ShopDomain) -> Response {
    let result = match begin_auth(app.config(), shop) {
        Ok(result) => result,
        Err(error) => return app.reject(context, error),
    };
    tracing::debug!(shop = %shop, "redirecting to install");

    let mut response = client_redirect(app.config().is_embedded(), &result.auth_url);
    append_cookie(&mut response, &state_cookie(app.config(), &result.state));
    response
}
