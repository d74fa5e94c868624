//! Error types for application configuration.
//!
//! This module contains the error type returned by configuration constructors
//! and builders throughout the crate.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the crate.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Public URL is invalid.
    #[error("Invalid public URL '{url}'. Please provide an absolute http(s) URL (e.g., 'https://myapp.example.com').")]
    InvalidPublicUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Callback path is invalid.
    #[error("Invalid callback path '{path}'. The path must start with '/'.")]
    InvalidCallbackPath {
        /// The invalid path that was provided.
        path: String,
    },

    /// Pagination parameters are out of range.
    #[error("Invalid pagination: {reason}")]
    InvalidPagination {
        /// The reason the pagination is invalid.
        reason: String,
    },
}
