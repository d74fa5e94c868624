//! HTTP client for Admin API communication.
//!
//! [`HttpClient`] binds a shared `reqwest::Client` to one shop: it builds the
//! base URI, attaches the default headers (including the shop's access
//! token), sends a single attempt per request, and turns non-2xx responses
//! into [`HttpError::Response`].

use std::collections::HashMap;

use crate::clients::admin_client::AdminClientConfig;
use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;
use crate::config::ShopDomain;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the shop access token on authenticated calls.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// HTTP client for making requests to one shop's Admin API.
///
/// Cloning the inner `reqwest::Client` is cheap, so an `HttpClient` is built
/// per call site rather than cached.
#[derive(Debug)]
pub struct HttpClient {
    /// The shared reqwest HTTP client (carries the timeout).
    client: reqwest::Client,
    /// Base URI without trailing slash (e.g., `https://my-store.myshopify.com`).
    base_uri: String,
    /// Base path (e.g., "/admin").
    base_path: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Whether to emit request and response bodies as debug events.
    log_traffic: bool,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client for `shop`.
    ///
    /// The base URI is the configured API base URL when one is set (proxies,
    /// tests), otherwise `https://{shop}`. When a base URL override is used,
    /// a `Host` header naming the shop is added.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_path: impl Into<String>,
        shop: &ShopDomain,
        access_token: Option<&str>,
        config: &AdminClientConfig,
    ) -> Self {
        let base_uri = config.api_base_url().map_or_else(
            || format!("https://{}", shop.as_ref()),
            |url| url.as_str().trim_end_matches('/').to_string(),
        );

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), config.user_agent());
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        if config.api_base_url().is_some() {
            default_headers.insert("Host".to_string(), shop.as_ref().to_string());
        }

        if let Some(token) = access_token.filter(|token| !token.is_empty()) {
            default_headers.insert(ACCESS_TOKEN_HEADER.to_string(), token.to_string());
        }

        Self {
            client,
            base_uri,
            base_path: base_path.into(),
            default_headers,
            log_traffic: config.log_traffic(),
        }
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the base path for this client.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends a request. There are no retries.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - A network error or timeout occurs (`Network`)
    /// - A non-2xx response is received (`Response`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}{}/{}", self.base_uri, self.base_path, request.path);

        let mut req_builder = self
            .client
            .request(request.http_method.as_reqwest(), &url)
            .query(&request.query);

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(body_type) = &request.body_type {
            req_builder = req_builder.header("Content-Type", body_type.as_content_type());
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.to_string());
        }

        if self.log_traffic {
            tracing::debug!(
                method = %request.http_method,
                url = %url,
                query = ?request.query,
                body = ?request.body,
                "Admin API request"
            );
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await?;

        if self.log_traffic {
            tracing::debug!(status = code, url = %url, body = %body_text, "Admin API response");
        }

        let body = if body_text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text).unwrap_or_else(|_| {
                if code >= 500 {
                    serde_json::json!({ "raw_body": body_text })
                } else {
                    serde_json::json!({})
                }
            })
        };

        let response = HttpResponse::new(code, res_headers, body);

        if let Some(reason) = response.deprecation_reason() {
            tracing::warn!(
                "Deprecated request to Shopify API at {}, received reason: {}",
                request.path,
                reason
            );
        }

        if response.is_ok() {
            return Ok(response);
        }

        Err(HttpError::Response(HttpResponseError {
            code,
            message: Self::serialize_error(&response),
            error_reference: response.request_id().map(String::from),
        }))
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for key in ["errors", "error", "error_description", "raw_body"] {
            if let Some(value) = response.body.get(key) {
                error_body.insert(key.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::Value::Object(error_body).to_string()
    }
}
