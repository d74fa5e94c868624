//! Post-install script tag stage.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::reporter::ErrorContext;
use super::ShopifyApp;
use crate::auth::AuthenticatedShop;

/// Ensures the app's script tags exist on the authenticated shop before the
/// protected service runs.
///
/// Runs inside [`negotiate`](super::negotiate), so the shop is already
/// authenticated. A failure is reported and answered with 500.
pub async fn ensure_script_tags(State(app): State<ShopifyApp>, request: Request, next: Next) -> Response {
    let Some(session) = request.extensions().get::<AuthenticatedShop>().cloned() else {
        return next.run(request).await;
    };
    if app.script_tags().is_empty() {
        return next.run(request).await;
    }

    let context = ErrorContext::new("ensure_script_tags", &request).with_shop(&session.shop);
    for tag in app.script_tags() {
        if let Err(error) = app.reconciler().ensure(&session, tag.clone()).await {
            return app.reject(&context, error.into());
        }
    }

    next.run(request).await
}
