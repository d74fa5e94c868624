//! axum middleware for embedded Shopify apps.
//!
//! [`ShopifyApp`] owns the configuration, the credential store, the Admin
//! API client and the error reporter. It wraps application routers with the
//! stages below, each an `axum::middleware::from_fn_with_state` function:
//!
//! | Stage | Used by | Rejects with |
//! |-------|---------|--------------|
//! | [`verify_signature`] | [`ShopifyApp::embedded_router`] | 400 missing, 403 wrong signature |
//! | [`negotiate`] | [`ShopifyApp::embedded_router`] | 400 bad shop, install redirect |
//! | [`ensure_script_tags`] | [`ShopifyApp::embedded_router`] | 500 |
//! | [`require_session_token`] | [`ShopifyApp::api_router`] | 403 |
//! | [`verify_proxy_request`] | [`ShopifyApp::proxy_router`] | 400, 403 |
//!
//! A rejected request never reaches the protected service. Admitted
//! requests carry an [`AuthenticatedShop`](crate::auth::AuthenticatedShop)
//! extension.
//!
//! Failures classified as internal are passed to the app's
//! [`ErrorReporter`] and answered with a generic 500 body; the default
//! reporter is [`TracingErrorReporter`].

mod app;
mod cookies;
mod negotiator;
mod proxy;
mod redirect;
mod rejection;
mod reporter;
mod script_tags;
mod session;
mod signature;

pub use app::{ShopifyApp, ShopifyAppBuilder};
pub use cookies::STATE_COOKIE;
pub use negotiator::{negotiate, oauth_callback};
pub use proxy::verify_proxy_request;
pub use redirect::client_redirect;
pub use rejection::{FORBIDDEN_BODY, INTERNAL_ERROR_BODY};
pub use reporter::{ErrorContext, ErrorReporter, TracingErrorReporter};
pub use script_tags::ensure_script_tags;
pub use session::require_session_token;
pub use signature::verify_signature;
