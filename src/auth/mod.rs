//! Authentication types.
//!
//! - [`AuthScopes`]: the OAuth scopes requested at install
//! - [`Credential`]: the per-shop access token granted by the merchant
//! - [`AuthenticatedShop`]: a shop whose credential was confirmed for the
//!   current request
//! - [`session_token`]: the cookie that carries a credential between requests
//! - [`oauth`]: the install flow and request signature verification
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::{AuthScopes, AuthenticatedShop, Credential, ShopDomain};
//!
//! let scopes: AuthScopes = "read_products,write_script_tags".parse().unwrap();
//! let session = AuthenticatedShop::new(
//!     ShopDomain::new("my-store").unwrap(),
//!     Credential::new("shpat_123", scopes),
//! );
//!
//! assert!(session.credential.scope.contains("write_script_tags"));
//! ```

mod credential;
pub mod oauth;
mod scopes;
pub mod session_token;

pub use credential::{AuthenticatedShop, Credential};
pub use scopes::AuthScopes;
pub use session_token::{verify_session_token, SessionToken, SESSION_TOKEN_COOKIE};
