//! HTTP client types for Admin API communication.
//!
//! # Overview
//!
//! - [`AdminClient`]: the token exchange and script tag endpoints
//! - [`AdminClientConfig`]: timeout, base URL override, user agent and
//!   traffic logging for one client
//! - [`HttpClient`]: a shared `reqwest::Client` bound to one shop
//! - [`HttpRequest`] / [`HttpResponse`]: the request and response types
//! - [`HttpError`]: everything that can go wrong on an outbound call
//!
//! # Timeouts and retries
//!
//! Every request carries the configured timeout (30 seconds by default) and
//! is attempted exactly once. A timeout surfaces as [`HttpError::Network`].
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_app_auth::clients::{AdminClient, AdminClientConfig};
//! use shopify_app_auth::script_tags::{FieldSelection, Pagination, ScriptTagApi};
//!
//! let client = AdminClient::new(AdminClientConfig::default())?;
//! let tags = client
//!     .list_script_tags(&session, &Pagination::full_page(1)?, &FieldSelection::all())
//!     .await?;
//! ```

mod admin_client;
mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use admin_client::{AdminClient, AdminClientConfig, AdminClientConfigBuilder, DEFAULT_TIMEOUT};
pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, ACCESS_TOKEN_HEADER, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{HttpResponse, JSON_MEDIA_TYPE};
