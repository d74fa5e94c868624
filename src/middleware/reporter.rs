//! Reporting of unexpected failures.

use axum::http::Request;

use crate::auth::oauth::OAuthError;
use crate::config::ShopDomain;

/// Where and for whom a failure happened.
#[derive(Clone, Debug)]
pub struct ErrorContext {
    /// The middleware stage that failed, e.g. `"oauth_callback"`.
    pub stage: &'static str,
    /// The request method.
    pub method: String,
    /// The request path, without the query string.
    pub path: String,
    /// The shop, once known.
    pub shop: Option<ShopDomain>,
}

impl ErrorContext {
    /// Captures the context of `request`.
    #[must_use]
    pub fn new<B>(stage: &'static str, request: &Request<B>) -> Self {
        Self {
            stage,
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            shop: None,
        }
    }

    /// Attaches the shop.
    #[must_use]
    pub fn with_shop(mut self, shop: &ShopDomain) -> Self {
        self.shop = Some(shop.clone());
        self
    }
}

/// Receives internal failures that are hidden from the client.
///
/// Only errors of [`ErrorKind::Internal`](crate::auth::oauth::ErrorKind::Internal)
/// are reported; client and verification failures are answered directly.
pub trait ErrorReporter: Send + Sync {
    /// Records a failure.
    fn report(&self, context: &ErrorContext, error: &OAuthError);
}

/// Default reporter: emits a `tracing` error event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, context: &ErrorContext, error: &OAuthError) {
        tracing::error!(
            stage = context.stage,
            method = %context.method,
            path = %context.path,
            shop = %context.shop.as_ref().map_or("", |shop| shop.as_ref()),
            error = %error,
            "request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_context_captures_method_and_path_without_query() {
        let request = Request::builder()
            .method("GET")
            .uri("/admin?shop=my-store.myshopify.com&hmac=abc")
            .body(Body::empty())
            .unwrap();

        let context = ErrorContext::new("negotiate", &request)
            .with_shop(&ShopDomain::new("my-store").unwrap());

        assert_eq!(context.stage, "negotiate");
        assert_eq!(context.method, "GET");
        assert_eq!(context.path, "/admin");
        assert_eq!(
            context.shop.as_ref().map(AsRef::as_ref),
            Some("my-store.myshopify.com")
        );
    }
}
