//! Composition of the middleware stages around application routes.

use std::fmt;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use super::negotiator::{negotiate, oauth_callback};
use super::proxy::verify_proxy_request;
use super::reporter::{ErrorContext, ErrorReporter, TracingErrorReporter};
use super::script_tags::ensure_script_tags;
use super::session::require_session_token;
use super::signature::verify_signature;
use crate::auth::oauth::OAuthError;
use crate::clients::{AdminClient, AdminClientConfig, HttpError};
use crate::config::{AppConfig, ShopDomain};
use crate::script_tags::{ScriptTag, ScriptTagApi, ScriptTagReconciler};
use crate::store::{CredentialStore, StoreError};

/// An embedded Shopify application: configuration plus the services the
/// middleware stages share.
///
/// Cloning is cheap; every clone shares the same store, client and reporter.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use axum::{routing::get, Extension, Router};
/// use shopify_app_auth::middleware::ShopifyApp;
/// use shopify_app_auth::store::MemoryCredentialStore;
/// use shopify_app_auth::{ApiKey, ApiSecretKey, AppConfig, AuthenticatedShop, PublicUrl};
///
/// async fn index(Extension(session): Extension<AuthenticatedShop>) -> String {
///     format!("Hello {}", session.shop)
/// }
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .public_url(PublicUrl::new("https://myapp.example.com").unwrap())
///     .scopes("write_script_tags".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let app = ShopifyApp::builder(config, Arc::new(MemoryCredentialStore::new()))
///     .build()
///     .unwrap();
///
/// let router: Router = app.embedded_router(Router::new().route("/", get(index)));
/// ```
#[derive(Clone)]
pub struct ShopifyApp {
    inner: Arc<Inner>,
}

struct Inner {
    config: AppConfig,
    store: Arc<dyn CredentialStore>,
    admin_client: AdminClient,
    reporter: Arc<dyn ErrorReporter>,
    script_tags: Vec<ScriptTag>,
    reconciler: ScriptTagReconciler<dyn ScriptTagApi>,
}

// Verify ShopifyApp is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyApp>();
};

impl fmt::Debug for ShopifyApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyApp")
            .field("config", &self.inner.config)
            .field("admin_client", &self.inner.admin_client)
            .field("script_tags", &self.inner.script_tags)
            .finish_non_exhaustive()
    }
}

impl ShopifyApp {
    /// Creates a builder.
    #[must_use]
    pub fn builder(config: AppConfig, store: Arc<dyn CredentialStore>) -> ShopifyAppBuilder {
        ShopifyAppBuilder {
            config,
            store,
            admin_client: None,
            script_tag_api: None,
            reporter: None,
            script_tags: Vec::new(),
            max_concurrent_deletions: None,
        }
    }

    /// Returns the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Returns the credential store.
    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.inner.store.as_ref()
    }

    /// Returns the Admin API client.
    #[must_use]
    pub fn admin_client(&self) -> &AdminClient {
        &self.inner.admin_client
    }

    /// Returns the script tags ensured on every authenticated request.
    #[must_use]
    pub fn script_tags(&self) -> &[ScriptTag] {
        &self.inner.script_tags
    }

    /// Returns the script tag reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &ScriptTagReconciler<dyn ScriptTagApi> {
        &self.inner.reconciler
    }

    /// Revokes the app's access for `shop` by deleting its credential.
    ///
    /// Session tokens issued for the shop stop verifying immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    pub async fn uninstall(&self, shop: &ShopDomain) -> Result<(), StoreError> {
        self.inner.store.delete(shop).await?;
        tracing::debug!(shop = %shop, "deleted credential on uninstall");
        Ok(())
    }

    /// Turns a failure into a response, reporting internal ones first.
    pub(crate) fn reject(&self, context: &ErrorContext, error: OAuthError) -> Response {
        if error.is_internal() {
            self.inner.reporter.report(context, &error);
        }
        error.into_response()
    }

    /// Wraps the routes of the embedded admin UI.
    ///
    /// Stages, outermost first:
    ///
    /// 1. signature verification
    /// 2. OAuth negotiation (install redirect, callback, session cookie)
    /// 3. script tag reconciliation
    ///
    /// The OAuth callback is added at the configured callback path and runs
    /// behind signature verification only. `protected` must not define a
    /// route at that path.
    #[must_use]
    pub fn embedded_router(&self, protected: Router) -> Router {
        protected
            .layer(from_fn_with_state(self.clone(), ensure_script_tags))
            .layer(from_fn_with_state(self.clone(), negotiate))
            .route(
                self.config().callback_path(),
                get(oauth_callback).with_state(self.clone()),
            )
            .layer(from_fn_with_state(self.clone(), verify_signature))
    }

    /// Wraps API routes called from the admin UI with the session-token gate.
    #[must_use]
    pub fn api_router(&self, protected: Router) -> Router {
        protected.layer(from_fn_with_state(self.clone(), require_session_token))
    }

    /// Wraps app proxy routes with the legacy-signature and shop lookup gate.
    #[must_use]
    pub fn proxy_router(&self, protected: Router) -> Router {
        protected.layer(from_fn_with_state(self.clone(), verify_proxy_request))
    }
}

/// Builder for [`ShopifyApp`].
///
/// # Defaults
///
/// - admin client: [`AdminClient`] with [`AdminClientConfig::default`]
/// - script tag API: the admin client
/// - reporter: [`TracingErrorReporter`]
/// - script tags: none
pub struct ShopifyAppBuilder {
    config: AppConfig,
    store: Arc<dyn CredentialStore>,
    admin_client: Option<AdminClient>,
    script_tag_api: Option<Arc<dyn ScriptTagApi>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    script_tags: Vec<ScriptTag>,
    max_concurrent_deletions: Option<usize>,
}

impl fmt::Debug for ShopifyAppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyAppBuilder")
            .field("config", &self.config)
            .field("script_tags", &self.script_tags)
            .finish_non_exhaustive()
    }
}

impl ShopifyAppBuilder {
    /// Sets the Admin API client.
    #[must_use]
    pub fn admin_client(mut self, client: AdminClient) -> Self {
        self.admin_client = Some(client);
        self
    }

    /// Replaces the remote used for script tags.
    #[must_use]
    pub fn script_tag_api(mut self, api: Arc<dyn ScriptTagApi>) -> Self {
        self.script_tag_api = Some(api);
        self
    }

    /// Sets the error reporter.
    #[must_use]
    pub fn error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Adds a script tag to ensure on every authenticated admin request.
    #[must_use]
    pub fn script_tag(mut self, tag: ScriptTag) -> Self {
        self.script_tags.push(tag);
        self
    }

    /// Bounds the number of concurrent duplicate deletions.
    #[must_use]
    pub const fn max_concurrent_deletions(mut self, limit: usize) -> Self {
        self.max_concurrent_deletions = Some(limit);
        self
    }

    /// Builds the application.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the default admin client cannot be created.
    pub fn build(self) -> Result<ShopifyApp, HttpError> {
        let admin_client = match self.admin_client {
            Some(client) => client,
            None => AdminClient::new(AdminClientConfig::default())?,
        };
        let api: Arc<dyn ScriptTagApi> = match self.script_tag_api {
            Some(api) => api,
            None => Arc::new(admin_client.clone()),
        };
        let mut reconciler = ScriptTagReconciler::new(api);
        if let Some(limit) = self.max_concurrent_deletions {
            reconciler = reconciler.with_max_concurrent_deletions(limit);
        }

        Ok(ShopifyApp {
            inner: Arc::new(Inner {
                config: self.config,
                store: self.store,
                admin_client,
                reporter: self
                    .reporter
                    .unwrap_or_else(|| Arc::new(TracingErrorReporter)),
                script_tags: self.script_tags,
                reconciler,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use crate::config::{ApiKey, ApiSecretKey, PublicUrl};
    use crate::store::MemoryCredentialStore;

    fn config() -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .public_url(PublicUrl::new("https://myapp.example.com").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let app = ShopifyApp::builder(config(), Arc::new(MemoryCredentialStore::new()))
            .script_tag(ScriptTag::new("https://cdn.example.com/a.js"))
            .build()
            .unwrap();

        assert_eq!(app.config().callback_path(), "/oauth/callback");
        assert_eq!(app.script_tags().len(), 1);
    }

    #[tokio::test]
    async fn test_uninstall_deletes_credential() {
        let store = Arc::new(MemoryCredentialStore::new());
        let shop = ShopDomain::new("my-store").unwrap();
        store
            .update(&shop, Credential::new("token", "read_products".parse().unwrap()))
            .await
            .unwrap();
        let app = ShopifyApp::builder(config(), store.clone()).build().unwrap();

        app.uninstall(&shop).await.unwrap();

        assert!(store.get(&shop).await.unwrap().is_none());
    }
}
