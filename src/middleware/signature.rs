//! Query signature verification for OAuth callbacks and Admin links.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::reporter::ErrorContext;
use super::ShopifyApp;
use crate::auth::oauth::hmac::{verify_query, QueryParams};

/// Rejects requests whose query string is not signed by Shopify.
///
/// The scheme follows the parameter present (`hmac` wins over
/// `signature`). A missing signature is a 400, a wrong one a 403; in both
/// cases the wrapped service is never called.
pub async fn verify_signature(State(app): State<ShopifyApp>, request: Request, next: Next) -> Response {
    let params = QueryParams::parse(request.uri().query().unwrap_or_default());

    match verify_query(&params, app.config().signing_secrets().map(|key| key.as_ref())) {
        Ok(_) => next.run(request).await,
        Err(error) => app.reject(&ErrorContext::new("verify_signature", &request), error.into()),
    }
}
