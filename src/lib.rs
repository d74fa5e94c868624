//! # Shopify App Auth
//!
//! Authentication middleware for embedded Shopify apps built on axum.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`AppConfig`] and [`AppConfigBuilder`]
//! - Validated newtypes for API credentials, shop domains and the app URL
//! - Verification of Shopify-signed query strings, both the `hmac` scheme and
//!   the legacy `signature` scheme used by app proxies
//! - The OAuth install flow: install redirect, `state` nonce, callback
//!   validation and code exchange via [`auth::oauth`]
//! - Session-token cookies that are revoked when the stored credential
//!   changes
//! - A pluggable [`store::CredentialStore`] with an in-memory implementation
//! - Idempotent script tag reconciliation via [`script_tags`]
//! - Middleware stages and routers tying it all together via [`middleware`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{routing::get, Extension, Router};
//! use shopify_app_auth::middleware::ShopifyApp;
//! use shopify_app_auth::script_tags::ScriptTag;
//! use shopify_app_auth::store::MemoryCredentialStore;
//! use shopify_app_auth::{ApiKey, ApiSecretKey, AppConfig, AuthenticatedShop, PublicUrl};
//!
//! async fn index(Extension(session): Extension<AuthenticatedShop>) -> String {
//!     format!("Installed on {}", session.shop)
//! }
//!
//! async fn me(Extension(session): Extension<AuthenticatedShop>) -> String {
//!     session.shop.to_string()
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key")?)
//!     .api_secret_key(ApiSecretKey::new("your-api-secret")?)
//!     .public_url(PublicUrl::new("https://your-app.example.com")?)
//!     .scopes("write_script_tags".parse()?)
//!     .build()?;
//!
//! let app = ShopifyApp::builder(config, Arc::new(MemoryCredentialStore::new()))
//!     .script_tag(ScriptTag::new("/apps/your-app/widget.js"))
//!     .build()?;
//!
//! let router = Router::new()
//!     .merge(app.embedded_router(Router::new().route("/", get(index))))
//!     .merge(app.api_router(Router::new().route("/api/me", get(me))));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Request Flow
//!
//! 1. Shopify opens the app with a signed query containing `shop`.
//! 2. The signature is verified; an unknown shop is redirected to the install
//!    page with a fresh `state` cookie.
//! 3. Shopify calls back with `code` and `state`. The code is exchanged for
//!    an access token, which is stored, and the browser returns to the app.
//! 4. Subsequent requests find the stored credential, the app's script tags
//!    are ensured and the response carries a `session-token` cookie.
//! 5. API calls from the admin UI present that cookie and are admitted while
//!    its credential is still the one on file.
//!
//! ## Design Principles
//!
//! - **Fail-fast validation**: newtypes validate on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for the Tokio runtime
//! - **No secrets in errors**: error messages never carry tokens, codes or
//!   state values

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod middleware;
pub mod script_tags;
pub mod store;

// Re-export public types at crate root for convenience
pub use auth::{AuthScopes, AuthenticatedShop, Credential};
pub use config::{ApiKey, ApiSecretKey, AppConfig, AppConfigBuilder, PublicUrl, ShopDomain};
pub use error::ConfigError;

// Re-export OAuth types for convenience
pub use auth::oauth::{
    begin_auth, validate_auth_callback, BeginAuthResult, OAuthError, QueryParams, StateNonce,
};
