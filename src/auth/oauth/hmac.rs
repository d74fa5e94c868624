//! Request signature verification.
//!
//! Shopify signs the query string of every request it sends to an app:
//! installs, OAuth callbacks, admin launches and app proxy calls. Two
//! schemes are in use:
//!
//! - **HMAC** (`hmac` parameter): the remaining parameters, percent-decoded
//!   and sorted by key, are joined as `key=value` pairs separated by `&`.
//! - **Legacy** (`signature` parameter): the same canonical string with every
//!   `&` removed, used by app proxy requests.
//!
//! The canonical string is signed with HMAC-SHA256 using the app's API secret
//! and hex-encoded in lower case. All comparisons run in constant time.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::hmac::{sign_query, verify_query, QueryParams};
//!
//! let mut params = QueryParams::parse("shop=some-shop.myshopify.com&timestamp=1337178173");
//! sign_query(&mut params, "abcdefgh");
//!
//! assert!(verify_query(&params, ["abcdefgh"]).is_ok());
//! assert!(verify_query(&params, ["another-secret"]).is_err());
//! ```

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Name of the query parameter carrying an HMAC signature.
pub const HMAC_PARAM: &str = "hmac";

/// Name of the query parameter carrying a legacy signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Query parameters of an inbound request, sorted by key.
///
/// Values are stored percent-decoded, with `+` read as a space, and a key may
/// repeat. This is the input both signature schemes canonicalize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw `application/x-www-form-urlencoded` query string.
    ///
    /// Malformed escapes are kept literally rather than rejected.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.append(key.into_owned(), value.into_owned());
        }
        params
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the first non-empty value for `key`.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Returns `true` if `key` is present, even with an empty value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Adds a value for `key`, keeping existing values.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces all values for `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), vec![value.into()]);
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.params.remove(key)
    }

    /// Returns the canonical string that signatures are computed over.
    ///
    /// Pairs are emitted in key order, repeated keys in insertion order.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.pairs()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Encodes the parameters as a URL query string, sorted by key.
    #[must_use]
    pub fn encode(&self) -> String {
        self.pairs()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Iterates over decoded pairs in key order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }
}

/// The two query signing schemes used by Shopify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureScheme {
    /// `hmac` parameter over the `&`-joined canonical string.
    Hmac,
    /// `signature` parameter over the canonical string with `&` removed.
    Legacy,
}

impl SignatureScheme {
    /// Returns the query parameter carrying this scheme's signature.
    #[must_use]
    pub const fn param_name(self) -> &'static str {
        match self {
            Self::Hmac => HMAC_PARAM,
            Self::Legacy => SIGNATURE_PARAM,
        }
    }

    /// Returns a human readable name for error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hmac => "HMAC",
            Self::Legacy => "Signature",
        }
    }

    /// Picks the scheme from the parameters present, preferring `hmac`.
    #[must_use]
    pub fn detect(params: &QueryParams) -> Option<Self> {
        if params.contains(HMAC_PARAM) {
            Some(Self::Hmac)
        } else if params.contains(SIGNATURE_PARAM) {
            Some(Self::Legacy)
        } else {
            None
        }
    }

    /// Computes this scheme's signature over `params`.
    ///
    /// `params` must not contain the signature parameter itself.
    #[must_use]
    pub fn compute(self, params: &QueryParams, secret: &str) -> String {
        let canonical = params.canonical();
        match self {
            Self::Hmac => compute_signature(&canonical, secret),
            Self::Legacy => compute_signature(&canonical.replace('&', ""), secret),
        }
    }
}

/// Reasons a signed query is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature parameter is absent or empty.
    #[error("Missing `{param}` parameter.")]
    MissingSignature {
        /// The parameter that was expected.
        param: &'static str,
    },

    /// The signature does not match under any accepted secret.
    #[error("{} verification failed.", .scheme.label())]
    Mismatch {
        /// The scheme that was checked.
        scheme: SignatureScheme,
    },
}

/// Computes a lower-case hex HMAC-SHA256 of `message` keyed with `secret`.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("test-message", "secret-key");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Computes the `hmac` value Shopify would send for `params`.
#[must_use]
pub fn compute_hmac(params: &QueryParams, secret: &str) -> String {
    SignatureScheme::Hmac.compute(params, secret)
}

/// Computes the legacy `signature` value Shopify would send for `params`.
#[must_use]
pub fn compute_legacy_signature(params: &QueryParams, secret: &str) -> String {
    SignatureScheme::Legacy.compute(params, secret)
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Signs `params` in place with an `hmac` parameter.
///
/// Any existing `hmac` is replaced.
pub fn sign_query(params: &mut QueryParams, secret: &str) {
    params.remove(HMAC_PARAM);
    let hmac = compute_hmac(params, secret);
    params.set(HMAC_PARAM, hmac);
}

/// Signs `params` in place with a legacy `signature` parameter.
///
/// Any existing `signature` is replaced.
pub fn sign_query_legacy(params: &mut QueryParams, secret: &str) {
    params.remove(SIGNATURE_PARAM);
    let signature = compute_legacy_signature(params, secret);
    params.set(SIGNATURE_PARAM, signature);
}

/// Verifies a signed query, choosing the scheme from the parameters present.
///
/// `hmac` takes precedence when both `hmac` and `signature` are sent. Each
/// secret is tried in order, which lets a rotated-out secret keep working.
///
/// # Errors
///
/// Returns [`SignatureError::MissingSignature`] when neither parameter is
/// present and [`SignatureError::Mismatch`] when no secret reproduces the
/// supplied signature.
pub fn verify_query<'a>(
    params: &QueryParams,
    secrets: impl IntoIterator<Item = &'a str>,
) -> Result<SignatureScheme, SignatureError> {
    let scheme = SignatureScheme::detect(params).ok_or(SignatureError::MissingSignature {
        param: HMAC_PARAM,
    })?;
    verify_query_with(params, scheme, secrets)?;
    Ok(scheme)
}

/// Verifies a signed query under a specific scheme.
///
/// # Errors
///
/// Returns [`SignatureError::MissingSignature`] when the scheme's parameter
/// is absent or empty and [`SignatureError::Mismatch`] when no secret
/// reproduces it.
pub fn verify_query_with<'a>(
    params: &QueryParams,
    scheme: SignatureScheme,
    secrets: impl IntoIterator<Item = &'a str>,
) -> Result<(), SignatureError> {
    let param = scheme.param_name();
    let received = params
        .get_non_empty(param)
        .ok_or(SignatureError::MissingSignature { param })?;

    let mut unsigned = params.clone();
    unsigned.remove(param);

    let verified = secrets
        .into_iter()
        .any(|secret| constant_time_compare(&scheme.compute(&unsigned, secret), received));

    if verified {
        Ok(())
    } else {
        Err(SignatureError::Mismatch { scheme })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "abcdefgh";
    const CALLBACK_QUERY: &str = "code=0907a61c0c8d55e99db179b68161bc00&shop=some-shop.myshopify.com&state=0.6784241404160823&timestamp=1337178173";
    const CALLBACK_HMAC: &str = "26015c6ad20dccdc7017bc4ad3b7c7b239a18db8c79e26945e13d0ca551ae996";

    #[test]
    fn test_compute_hmac_matches_known_vector() {
        let params = QueryParams::parse(CALLBACK_QUERY);
        assert_eq!(compute_hmac(&params, SECRET), CALLBACK_HMAC);
    }

    #[test]
    fn test_canonical_string_is_sorted_and_decoded() {
        let params = QueryParams::parse("timestamp=1337178173&state=a%3D%3D&code=x+y");
        assert_eq!(params.canonical(), "code=x y&state=a==&timestamp=1337178173");
    }

    #[test]
    fn test_compute_hmac_over_escaped_values() {
        let params = QueryParams::parse(
            "code=0907a61c0c8d55e99db179b68161bc00&shop=some-shop.myshopify.com&state=a%3D%3D&timestamp=1337178173",
        );
        assert_eq!(
            compute_hmac(&params, SECRET),
            "02efe8e8d299cb8d403022a485b6685cd186f499258110568c9af306a3598083"
        );
    }

    #[test]
    fn test_compute_legacy_signature_matches_known_vector() {
        let params = QueryParams::parse(
            "shop=some-shop.myshopify.com&path_prefix=/apps/awesome_reviews&timestamp=1317327555",
        );
        assert_eq!(
            compute_legacy_signature(&params, "hush"),
            "b855dd80571c98a2596bbe646dc951a0924e43282cf276902b0f3ba6e716c481"
        );
    }

    #[test]
    fn test_verify_query_accepts_valid_hmac() {
        let params = QueryParams::parse(&format!("{CALLBACK_QUERY}&hmac={CALLBACK_HMAC}"));
        assert_eq!(verify_query(&params, [SECRET]), Ok(SignatureScheme::Hmac));
    }

    #[test]
    fn test_verify_query_rejects_altered_parameter() {
        let query = CALLBACK_QUERY.replace("timestamp=1337178173", "timestamp=2337178173");
        let params = QueryParams::parse(&format!("{query}&hmac={CALLBACK_HMAC}"));
        assert_eq!(
            verify_query(&params, [SECRET]),
            Err(SignatureError::Mismatch {
                scheme: SignatureScheme::Hmac
            })
        );
    }

    #[test]
    fn test_verify_query_requires_signature() {
        let params = QueryParams::parse(CALLBACK_QUERY);
        assert_eq!(
            verify_query(&params, [SECRET]),
            Err(SignatureError::MissingSignature { param: "hmac" })
        );
    }

    #[test]
    fn test_verify_query_rejects_empty_hmac() {
        let params = QueryParams::parse(&format!("{CALLBACK_QUERY}&hmac="));
        assert!(matches!(
            verify_query(&params, [SECRET]),
            Err(SignatureError::MissingSignature { .. })
        ));
    }

    #[test]
    fn test_verify_query_falls_back_to_old_secret() {
        let mut params = QueryParams::parse(CALLBACK_QUERY);
        sign_query(&mut params, "old-secret");

        assert!(verify_query(&params, ["new-secret"]).is_err());
        assert!(verify_query(&params, ["new-secret", "old-secret"]).is_ok());
    }

    #[test]
    fn test_sign_then_verify_detects_any_mutation() {
        let mut params = QueryParams::parse("shop=some-shop.myshopify.com&timestamp=1&extra=a b");
        sign_query(&mut params, SECRET);
        assert!(verify_query(&params, [SECRET]).is_ok());

        let mut tampered = params.clone();
        tampered.set("extra", "a c");
        assert!(verify_query(&tampered, [SECRET]).is_err());

        let mut added = params.clone();
        added.append("extra", "second");
        assert!(verify_query(&added, [SECRET]).is_err());

        assert!(verify_query(&params, ["abcdefgi"]).is_err());
    }

    #[test]
    fn test_legacy_signature_is_used_when_no_hmac() {
        let mut params = QueryParams::parse("shop=some-shop.myshopify.com&timestamp=1337178173");
        sign_query_legacy(&mut params, SECRET);

        assert_eq!(verify_query(&params, [SECRET]), Ok(SignatureScheme::Legacy));
        assert_eq!(
            params.get(SIGNATURE_PARAM),
            Some("d8c4ffaafc38564cea3d017dc8cfea9ab11355ea0b2b14984e66d32c39dbb5dc")
        );
    }

    #[test]
    fn test_legacy_signature_ignores_ampersand_placement() {
        let split = QueryParams::parse("a=1&b=2");
        let mut joined = QueryParams::new();
        joined.set("a", "1b=2");

        assert_eq!(
            compute_legacy_signature(&split, SECRET),
            compute_legacy_signature(&joined, SECRET)
        );
        assert_ne!(compute_hmac(&split, SECRET), compute_hmac(&joined, SECRET));
    }

    #[test]
    fn test_encode_round_trips_through_parse() {
        let mut params = QueryParams::new();
        params.set("state", "a==");
        params.set("shop", "some-shop.myshopify.com");
        let encoded = params.encode();

        assert_eq!(encoded, "shop=some-shop.myshopify.com&state=a%3D%3D");
        assert_eq!(QueryParams::parse(&encoded), params);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }
}
