//! Transport response types.
//!
//! This module provides the [`HttpResponse`] every transport returns.

use std::collections::HashMap;

/// A raw HTTP response from a provider.
///
/// The body is kept as text; the dispatcher decides how to decode it once it
/// knows whether the call succeeded.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lower-cased names (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body_text: String,
    /// Transport-level failure summary for non-2xx responses.
    pub error_message: Option<String>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    ///
    /// Non-2xx responses get an `error_message` of the form `"HTTP 404"`.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body_text: String) -> Self {
        let error_message = if (200..=299).contains(&code) {
            None
        } else {
            Some(format!("HTTP {code}"))
        };

        Self {
            code,
            headers,
            body_text,
            error_message,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Parses the body as JSON. Empty or malformed bodies yield `None`.
    #[must_use]
    pub fn body(&self) -> Option<serde_json::Value> {
        if self.body_text.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body_text).ok()
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

    /// Returns the `Retry-After` header in seconds, if present and numeric.
    #[must_use]
    pub fn retry_after(&self) -> Option<f64> {
        self.header("retry-after")
            .and_then(|value| value.trim().parse::<f64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_success_returns_true_for_2xx() {
        for code in 200..=299 {
            let response = HttpResponse::new(code, HashMap::new(), String::new());
            assert!(
                response.is_success(),
                "Expected is_success() to be true for code {code}"
            );
            assert!(response.error_message.is_none());
        }
    }

    #[test]
    fn test_is_success_returns_false_for_4xx_and_5xx() {
        for code in [400, 401, 404, 429, 500, 503] {
            let response = HttpResponse::new(code, HashMap::new(), String::new());
            assert!(!response.is_success());
            assert_eq!(response.error_message, Some(format!("HTTP {code}")));
        }
    }

    #[test]
    fn test_body_parses_json() {
        let response = HttpResponse::new(200, HashMap::new(), r#"{"id":"m-1"}"#.to_string());
        assert_eq!(response.body(), Some(json!({"id": "m-1"})));
    }

    #[test]
    fn test_body_is_none_for_empty_or_invalid() {
        let empty = HttpResponse::new(204, HashMap::new(), "  ".to_string());
        assert!(empty.body().is_none());

        let invalid = HttpResponse::new(502, HashMap::new(), "<html>bad gateway</html>".to_string());
        assert!(invalid.body().is_none());
    }

    #[test]
    fn test_request_id_extraction() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["req_abc".to_string()]);

        let response = HttpResponse::new(200, headers, String::new());
        assert_eq!(response.request_id(), Some("req_abc"));
        assert_eq!(response.header("X-Request-Id"), Some("req_abc"));
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["2.5".to_string()]);

        let response = HttpResponse::new(429, headers, String::new());
        assert!((response.retry_after().unwrap() - 2.5).abs() < f64::EPSILON);
    }
}
