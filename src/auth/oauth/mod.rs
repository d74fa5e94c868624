//! OAuth install flow and request verification.
//!
//! - [`begin_auth`]: builds the authorization URL and state nonce for an
//!   install redirect
//! - [`validate_auth_callback`]: checks the callback, exchanges the code and
//!   stores the credential
//! - [`hmac`]: signature verification and signing of query strings
//! - [`StateNonce`]: CSRF nonce binding the redirect to its callback
//! - [`OAuthError`]: every failure of these flows, classified by
//!   [`OAuthError::kind`]
//!
//! # Security Features
//!
//! - **Signature validation**: every request from Shopify is checked with
//!   HMAC-SHA256 (or the legacy scheme for app proxies)
//! - **CSRF protection**: the `state` parameter must equal the `state` cookie
//! - **Constant-time comparison**: signatures, nonces and access tokens are
//!   compared in constant time
//! - **Key rotation**: an old API secret keeps verifying until removed
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::hmac::{sign_query, QueryParams};
//! use shopify_app_auth::auth::oauth::{shop_from_query, OAuthError};
//!
//! let mut params = QueryParams::parse("shop=my-store.myshopify.com&timestamp=1700000000");
//! sign_query(&mut params, "secret");
//!
//! let shop = shop_from_query(&params).unwrap();
//! assert_eq!(shop.as_ref(), "my-store.myshopify.com");
//! ```

mod begin_auth;
mod error;
pub mod hmac;
mod state;
mod validate_callback;

pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::{ErrorKind, OAuthError};
pub use hmac::{QueryParams, SignatureError, SignatureScheme};
pub use state::StateNonce;
pub use validate_callback::{shop_from_query, validate_auth_callback};
