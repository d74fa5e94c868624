//! Session-token gate for API routes.
//!
//! Valid tokens are re-issued on every response so active sessions stay fresh.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::cookies::{append_cookie, cookie_values};
use super::reporter::ErrorContext;
use super::ShopifyApp;
use crate::auth::session_token::{verify_session_token, SessionToken, SESSION_TOKEN_COOKIE};

/// Admits requests carrying a `session-token` cookie whose credential is the
/// one on file.
///
/// On success the protected service sees an
/// [`AuthenticatedShop`](crate::auth::AuthenticatedShop) extension and the
/// response refreshes the cookie. Otherwise the request is rejected with 403
/// (500 if the store fails) and the service is not called.
pub async fn require_session_token(
    State(app): State<ShopifyApp>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = ErrorContext::new("require_session_token", &request);
    let values = cookie_values(request.headers(), SESSION_TOKEN_COOKIE);
    let values: Vec<&str> = values.iter().map(String::as_str).collect();

    let session = match verify_session_token(app.store(), &values).await {
        Ok(session) => session,
        Err(error) => return app.reject(&context, error),
    };
    let context = context.with_shop(&session.shop);

    let cookie = match SessionToken::new(&session).to_cookie(app.config()) {
        Ok(cookie) => cookie,
        Err(error) => return app.reject(&context, error),
    };

    request.extensions_mut().insert(session);
    let mut response = next.run(request).await;
    append_cookie(&mut response, &cookie);
    response
}
