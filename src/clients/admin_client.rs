//! Minimal Admin API client.
//!
//! [`AdminClient`] covers exactly what the authentication layer needs: the
//! OAuth code-for-token exchange and CRUD on script tags. Traffic logging
//! and the outbound timeout are set per client through
//! [`AdminClientConfig`]; nothing is process-wide.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use shopify_app_auth::clients::{AdminClient, AdminClientConfig};
//!
//! let client = AdminClient::new(
//!     AdminClientConfig::builder()
//!         .timeout(Duration::from_secs(10))
//!         .log_traffic(true)
//!         .user_agent_prefix("MyApp/1.0")
//!         .build(),
//! )
//! .unwrap();
//! assert_eq!(client.config().timeout(), Duration::from_secs(10));
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::{AuthenticatedShop, Credential};
use crate::clients::errors::HttpError;
use crate::clients::http_client::{HttpClient, SDK_VERSION};
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};
use crate::clients::http_response::JSON_MEDIA_TYPE;
use crate::config::{ApiKey, ApiSecretKey, ShopDomain};
use crate::script_tags::{FieldSelection, Pagination, ScriptTag, ScriptTagApi};

/// Default outbound request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ADMIN_PATH: &str = "/admin";

/// Settings for [`AdminClient`].
#[derive(Clone, Debug)]
pub struct AdminClientConfig {
    timeout: Duration,
    api_base_url: Option<Url>,
    user_agent_prefix: Option<String>,
    log_traffic: bool,
}

impl Default for AdminClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            api_base_url: None,
            user_agent_prefix: None,
            log_traffic: false,
        }
    }
}

impl AdminClientConfig {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn builder() -> AdminClientConfigBuilder {
        AdminClientConfigBuilder::default()
    }

    /// Returns the timeout applied to every outbound request.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the base URL used instead of `https://{shop}`, if any.
    #[must_use]
    pub const fn api_base_url(&self) -> Option<&Url> {
        self.api_base_url.as_ref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns whether outbound traffic is logged at debug level.
    #[must_use]
    pub const fn log_traffic(&self) -> bool {
        self.log_traffic
    }

    /// Returns the full `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let prefix = self
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        format!("{prefix}Shopify App Auth v{SDK_VERSION} | Rust {rust_version}")
    }
}

/// Builder for [`AdminClientConfig`].
///
/// # Defaults
///
/// - `timeout`: [`DEFAULT_TIMEOUT`]
/// - `api_base_url`: `None` (requests go to `https://{shop}`)
/// - `user_agent_prefix`: `None`
/// - `log_traffic`: `false`
#[derive(Debug, Default)]
pub struct AdminClientConfigBuilder {
    timeout: Option<Duration>,
    api_base_url: Option<Url>,
    user_agent_prefix: Option<String>,
    log_traffic: Option<bool>,
}

impl AdminClientConfigBuilder {
    /// Sets the outbound request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Routes every request to `url` instead of the shop's own domain.
    #[must_use]
    pub fn api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Sets the user agent prefix.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Enables debug logging of request and response bodies.
    ///
    /// Access tokens are sent as headers and are never part of the logged
    /// fields.
    #[must_use]
    pub const fn log_traffic(mut self, enabled: bool) -> Self {
        self.log_traffic = Some(enabled);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> AdminClientConfig {
        AdminClientConfig {
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            api_base_url: self.api_base_url,
            user_agent_prefix: self.user_agent_prefix,
            log_traffic: self.log_traffic.unwrap_or(false),
        }
    }
}

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct ScriptTagEnvelope {
    script_tag: ScriptTag,
}

#[derive(Deserialize)]
struct ScriptTagsEnvelope {
    script_tags: Vec<ScriptTag>,
}

#[derive(Deserialize)]
struct CountEnvelope {
    count: u64,
}

/// Client for the Admin API endpoints used during authentication.
///
/// Holds one connection pool shared by all shops; cloning is cheap.
#[derive(Clone, Debug)]
pub struct AdminClient {
    client: reqwest::Client,
    config: AdminClientConfig,
}

// Verify AdminClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AdminClient>();
};

impl AdminClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: AdminClientConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &AdminClientConfig {
        &self.config
    }

    fn http(&self, shop: &ShopDomain, access_token: Option<&str>) -> HttpClient {
        HttpClient::new(
            self.client.clone(),
            ADMIN_PATH,
            shop,
            access_token,
            &self.config,
        )
    }

    fn session_http(&self, session: &AuthenticatedShop) -> HttpClient {
        self.http(&session.shop, Some(&session.credential.access_token))
    }

    /// Exchanges a one-time authorization code for a durable credential.
    ///
    /// POSTs `{client_id, client_secret, code}` to
    /// `/admin/oauth/access_token`. The response must be declared as
    /// `application/json`.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Response`] for a non-2xx answer
    /// - [`HttpError::UnexpectedContentType`] for a non-JSON answer
    /// - [`HttpError::Decode`] if `access_token` is missing
    pub async fn exchange_code_for_token(
        &self,
        shop: &ShopDomain,
        client_id: &ApiKey,
        client_secret: &ApiSecretKey,
        code: &str,
    ) -> Result<Credential, HttpError> {
        let body = TokenExchangeRequest {
            client_id: client_id.as_ref(),
            client_secret: client_secret.as_ref(),
            code,
        };
        let request = HttpRequest::builder(HttpMethod::Post, "oauth/access_token")
            .body(serde_json::to_value(&body)?)
            .body_type(DataType::Json)
            .build()?;

        let response = self.http(shop, None).request(request).await?;

        if !response.is_json() {
            return Err(HttpError::UnexpectedContentType {
                expected: JSON_MEDIA_TYPE,
                received: response.header("content-type").unwrap_or_default().to_string(),
            });
        }

        Ok(serde_json::from_value(response.body)?)
    }
}

#[async_trait]
impl ScriptTagApi for AdminClient {
    async fn list_script_tags(
        &self,
        session: &AuthenticatedShop,
        pagination: &Pagination,
        fields: &FieldSelection,
    ) -> Result<Vec<ScriptTag>, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, "script_tags.json")
            .query_param("limit", pagination.limit().to_string())
            .query_param("page", pagination.page().to_string())
            .query_param_opt("since_id", pagination.since_id().map(|id| id.to_string()))
            .query_param_opt("fields", fields.to_query_value())
            .build()?;

        let response = self.session_http(session).request(request).await?;
        let envelope: ScriptTagsEnvelope = serde_json::from_value(response.body)?;
        Ok(envelope.script_tags)
    }

    async fn count_script_tags(&self, session: &AuthenticatedShop) -> Result<u64, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, "script_tags/count.json").build()?;

        let response = self.session_http(session).request(request).await?;
        let envelope: CountEnvelope = serde_json::from_value(response.body)?;
        Ok(envelope.count)
    }

    async fn get_script_tag(
        &self,
        session: &AuthenticatedShop,
        id: u64,
        fields: &FieldSelection,
    ) -> Result<Option<ScriptTag>, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, format!("script_tags/{id}.json"))
            .query_param_opt("fields", fields.to_query_value())
            .build()?;

        match self.session_http(session).request(request).await {
            Ok(response) => {
                let envelope: ScriptTagEnvelope = serde_json::from_value(response.body)?;
                Ok(Some(envelope.script_tag))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_or_update_script_tag(
        &self,
        session: &AuthenticatedShop,
        tag: &ScriptTag,
    ) -> Result<ScriptTag, HttpError> {
        let (method, path) = match tag.id {
            Some(id) => (HttpMethod::Put, format!("script_tags/{id}.json")),
            None => (HttpMethod::Post, "script_tags.json".to_string()),
        };
        let request = HttpRequest::builder(method, path)
            .body(serde_json::json!({ "script_tag": tag }))
            .body_type(DataType::Json)
            .build()?;

        let response = self.session_http(session).request(request).await?;
        let envelope: ScriptTagEnvelope = serde_json::from_value(response.body)?;
        Ok(envelope.script_tag)
    }

    async fn delete_script_tag(&self, session: &AuthenticatedShop, id: u64) -> Result<(), HttpError> {
        let request = HttpRequest::builder(HttpMethod::Delete, format!("script_tags/{id}.json"))
            .build()?;

        self.session_http(session).request(request).await?;
        Ok(())
    }
}
