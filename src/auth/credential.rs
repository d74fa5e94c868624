//! Per-shop OAuth credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::oauth::hmac::constant_time_compare;
use crate::auth::AuthScopes;
use crate::config::ShopDomain;

/// The durable credential granted to the app by a shop.
///
/// Obtained by exchanging an authorization code, overwritten on re-install
/// and deleted on uninstall. The JSON form is the one returned by
/// `/admin/oauth/access_token` and embedded in session tokens:
///
/// ```json
/// {"access_token": "shpat_...", "scope": "read_products,write_script_tags"}
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The access token sent in `X-Shopify-Access-Token`.
    pub access_token: String,
    /// The scopes granted by the merchant.
    #[serde(default)]
    pub scope: AuthScopes,
}

impl Credential {
    /// Creates a new credential.
    #[must_use]
    pub fn new(access_token: impl Into<String>, scope: AuthScopes) -> Self {
        Self {
            access_token: access_token.into(),
            scope,
        }
    }

    /// Returns `true` if both credentials carry the same access token.
    ///
    /// Scope is informational and does not take part in the comparison. The
    /// tokens are compared in constant time.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        constant_time_compare(&self.access_token, &other.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"*****")
            .field("scope", &self.scope)
            .finish()
    }
}

/// A shop whose credential has been confirmed for the current request.
///
/// The middleware inserts this into the request extensions before calling
/// the protected handler, which reads it back with
/// `Extension<AuthenticatedShop>`.
#[derive(Clone, Debug)]
pub struct AuthenticatedShop {
    /// The shop the request is for.
    pub shop: ShopDomain,
    /// The credential currently on file for that shop.
    pub credential: Credential,
}

impl AuthenticatedShop {
    /// Creates a new authenticated shop.
    #[must_use]
    pub const fn new(shop: ShopDomain, credential: Credential) -> Self {
        Self { shop, credential }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_compares_access_token_only() {
        let a = Credential::new("token", "read_products".parse().unwrap());
        let b = Credential::new("token", AuthScopes::new());
        let c = Credential::new("other", "read_products".parse().unwrap());

        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_debug_masks_access_token() {
        let credential = Credential::new("shpat_secret", AuthScopes::new());
        let debug = format!("{credential:?}");
        assert!(!debug.contains("shpat_secret"));
        assert!(debug.contains("*****"));
    }

    #[test]
    fn test_deserializes_token_exchange_payload() {
        let credential: Credential = serde_json::from_str(
            r#"{"access_token":"f85632530bf277ec9ac6f649fc327f17","scope":"write_orders,read_customers"}"#,
        )
        .unwrap();

        assert_eq!(credential.access_token, "f85632530bf277ec9ac6f649fc327f17");
        assert_eq!(credential.scope.to_string(), "write_orders,read_customers");
    }
}
