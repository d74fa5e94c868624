//! Validated newtype wrappers for configuration values.
//!
//! Each wrapper validates its contents on construction, so the rest of the
//! crate can rely on well-formed credentials, shop domains, and URLs.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::Url;

/// A validated Shopify API key (the OAuth `client_id`).
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Shopify API secret key.
///
/// The secret signs and verifies every inbound request and is sent to
/// Shopify as the OAuth `client_secret`.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying only
/// `ApiSecretKey(*****)`.
///
/// ```rust
/// use shopify_app_auth::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated Shopify shop domain, the tenant key used everywhere.
///
/// Short names are normalized to the full `shop-name.myshopify.com` form,
/// and the value is lower-cased. Serializes as the full domain string.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// let json = serde_json::to_string(&domain).unwrap();
/// assert_eq!(json, r#""my-store.myshopify.com""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is not a
    /// bare shop name or a `*.myshopify.com` host.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_lowercase();

        if domain.is_empty() {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        let (shop_name, full_domain) = match domain.strip_suffix(Self::SUFFIX) {
            Some(shop_name) => (shop_name.to_string(), domain.clone()),
            None if domain.contains('.') => {
                return Err(ConfigError::InvalidShopDomain { domain });
            }
            None => (domain.clone(), format!("{domain}{}", Self::SUFFIX)),
        };

        if !Self::is_valid_shop_name(&shop_name) {
            return Err(ConfigError::InvalidShopDomain {
                domain: full_domain,
            });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain,
        })
    }

    /// Returns the shop name portion of the domain.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    /// Returns the shop's HTTPS origin, e.g. `https://my-store.myshopify.com/`.
    ///
    /// Relative script tag sources are resolved against this URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the origin cannot be
    /// represented as a URL, which validation already rules out.
    pub fn origin(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!("https://{}/", self.full_domain)).map_err(|_| {
            ConfigError::InvalidShopDomain {
                domain: self.full_domain.clone(),
            }
        })
    }

    fn is_valid_shop_name(name: &str) -> bool {
        if name.is_empty() || name.starts_with('-') || name.ends_with('-') {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// The application's public URL.
///
/// Users land here after a completed installation, and the OAuth
/// `redirect_uri` is derived from it. Only absolute `http` and `https`
/// URLs with a host are accepted.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::PublicUrl;
///
/// let url = PublicUrl::new("https://myapp.example.com/app").unwrap();
/// assert_eq!(url.host_name(), Some("myapp.example.com"));
/// assert_eq!(
///     url.join_path("/oauth/callback").as_str(),
///     "https://myapp.example.com/oauth/callback"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicUrl(Url);

impl PublicUrl {
    /// Creates a new validated public URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPublicUrl`] if the URL does not parse,
    /// is not `http`/`https`, or has no host.
    pub fn new(url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let raw = url.as_ref().trim();
        let invalid = || ConfigError::InvalidPublicUrl {
            url: raw.to_string(),
        };

        let parsed = Url::parse(raw).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid());
        }

        Ok(Self(parsed))
    }

    /// Returns the URL scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the underlying URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns a copy of this URL with its path replaced by `path` and no
    /// query or fragment.
    #[must_use]
    pub fn join_path(&self, path: &str) -> Url {
        let mut url = self.0.clone();
        url.set_path(path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    /// Returns a copy of this URL with its query replaced by `pairs`.
    #[must_use]
    pub fn with_query<'a>(&self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Url {
        let mut url = self.0.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut().extend_pairs(pairs);
        url
    }
}

impl AsRef<str> for PublicUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_empty_string() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_api_secret_key_masks_value_in_debug() {
        let secret = ApiSecretKey::new("super-secret-key").unwrap();
        let debug_output = format!("{secret:?}");
        assert_eq!(debug_output, "ApiSecretKey(*****)");
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_shop_domain_normalizes_short_format() {
        let domain = ShopDomain::new("My-Store").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
        assert_eq!(domain.shop_name(), "my-store");
    }

    #[test]
    fn test_shop_domain_rejects_foreign_hosts_and_bad_names() {
        assert!(ShopDomain::new("").is_err());
        assert!(ShopDomain::new("my store").is_err());
        assert!(ShopDomain::new("my_store").is_err());
        assert!(ShopDomain::new("-my-store").is_err());
        assert!(ShopDomain::new("my-store-").is_err());
        assert!(ShopDomain::new("my-store.evil.com").is_err());
        assert!(ShopDomain::new("evil.com/x.myshopify.com").is_err());
    }

    #[test]
    fn test_shop_domain_origin() {
        let domain = ShopDomain::new("some-shop").unwrap();
        assert_eq!(
            domain.origin().unwrap().as_str(),
            "https://some-shop.myshopify.com/"
        );
    }

    #[test]
    fn test_shop_domain_deserializes_and_validates() {
        let domain: ShopDomain = serde_json::from_str(r#""test-shop.myshopify.com""#).unwrap();
        assert_eq!(domain.shop_name(), "test-shop");

        let bad: Result<ShopDomain, _> = serde_json::from_str(r#""test shop""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_public_url_validates_format() {
        let url = PublicUrl::new("http://localhost:3000/app").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_name(), Some("localhost"));

        assert!(PublicUrl::new("myapp.example.com").is_err());
        assert!(PublicUrl::new("ftp://myapp.example.com").is_err());
        assert!(PublicUrl::new("https://").is_err());
    }

    #[test]
    fn test_public_url_with_query_replaces_existing_query() {
        let url = PublicUrl::new("https://myapp.example.com/app?old=1#frag").unwrap();
        let redirect = url.with_query([("shop", "a.myshopify.com"), ("hmac", "abc")]);
        assert_eq!(
            redirect.as_str(),
            "https://myapp.example.com/app?shop=a.myshopify.com&hmac=abc"
        );
    }
}
