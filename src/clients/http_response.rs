//! HTTP response types for Admin API calls.

use std::collections::HashMap;

/// Media type required for JSON responses.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// An HTTP response from the Admin API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers keyed by lower-cased name (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body, `{}` when empty or not JSON.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of header `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the `X-Shopify-API-Deprecated-Reason` header value, if present.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        self.header("x-shopify-api-deprecated-reason")
    }

    /// Returns the media type of the `Content-Type` header without
    /// parameters, lower-cased.
    ///
    /// `application/json; charset=utf-8` yields `application/json`.
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        self.header("content-type").map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Returns `true` if the response declares `application/json`.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.media_type().as_deref() == Some(JSON_MEDIA_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_header(name: &str, value: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert(name.to_string(), vec![value.to_string()]);
        HttpResponse::new(200, headers, json!({}))
    }

    #[test]
    fn test_is_ok_returns_true_for_2xx_only() {
        assert!(HttpResponse::new(201, HashMap::new(), json!({})).is_ok());
        assert!(!HttpResponse::new(404, HashMap::new(), json!({})).is_ok());
        assert!(!HttpResponse::new(500, HashMap::new(), json!({})).is_ok());
    }

    #[test]
    fn test_is_json_ignores_parameters_and_case() {
        assert!(with_header("content-type", "application/json").is_json());
        assert!(with_header("content-type", "Application/JSON; charset=utf-8").is_json());
        assert!(!with_header("content-type", "text/html").is_json());
        assert!(!HttpResponse::new(200, HashMap::new(), json!({})).is_json());
    }

    #[test]
    fn test_request_id_extraction() {
        let response = with_header("x-request-id", "abc-123");
        assert_eq!(response.request_id(), Some("abc-123"));
    }

    #[test]
    fn test_deprecation_reason_extraction() {
        let response = with_header("x-shopify-api-deprecated-reason", "use GraphQL");
        assert_eq!(response.deprecation_reason(), Some("use GraphQL"));
    }
}
