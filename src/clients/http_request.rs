//! Transport request types.
//!
//! This module provides the [`TransportRequest`] the dispatcher hands to a
//! [`Transport`](crate::clients::Transport), together with [`HttpMethod`] and
//! [`MimeType`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use uuid::Uuid;

use crate::clients::errors::InvalidHttpRequestError;
use crate::config::Header;
use crate::rest::{CancellationToken, StreamHandler};

/// HTTP methods used by the CRUD verbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Retrieve and list.
    Get,
    /// Create and full update.
    Post,
    /// Full replacement.
    Put,
    /// Partial update.
    Patch,
    /// Delete.
    Delete,
}

impl HttpMethod {
    /// Returns `true` for methods that must carry a body.
    #[must_use]
    pub const fn requires_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Patch => write!(f, "patch"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Content type for request bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MimeType {
    /// `application/json`
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `text/plain`
    Text,
}

impl MimeType {
    /// Returns the MIME type string for this content type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Text => "text/plain",
        }
    }
}

/// One fully-resolved outbound call, ready for a transport.
///
/// Built by the dispatcher from a [`RestRequest`](crate::rest::RestRequest)
/// once parameters are resolved and the route is built. The body is already
/// serialized to JSON so transports stay object-safe.
#[derive(Clone)]
pub struct TransportRequest {
    /// Identity of the originating request.
    pub id: Uuid,
    /// Absolute URL, query string included.
    pub url: String,
    /// Headers in the order they were attached.
    pub headers: Vec<Header>,
    /// Serialized body, if any.
    pub body: Option<serde_json::Value>,
    /// Body content type.
    pub mime_type: MimeType,
    /// Per-request timeout; `None` uses the transport default.
    pub timeout: Option<Duration>,
    /// Receives response chunks in arrival order.
    pub stream_handler: Option<StreamHandler>,
    /// Writes the raw response body to this path instead of returning it.
    pub output_path: Option<PathBuf>,
    /// Cooperative cancellation.
    pub cancellation: Option<CancellationToken>,
}

impl TransportRequest {
    /// Validates the request for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the URL is empty or a body is
    /// required by `method` but missing.
    pub fn verify(&self, method: HttpMethod) -> Result<(), InvalidHttpRequestError> {
        if self.url.is_empty() {
            return Err(InvalidHttpRequestError::EmptyUrl);
        }

        if method.requires_body() && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: method.to_string(),
            });
        }

        Ok(())
    }

    /// Returns the first header with `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))
            .map(Header::value)
    }

    /// The URL without its query string or fragment.
    ///
    /// Query-placed API keys travel in the query string, so this is the form
    /// used in errors and `Debug` output.
    #[must_use]
    pub fn display_url(&self) -> &str {
        self.url
            .find(['?', '#'])
            .map_or(self.url.as_str(), |end| &self.url[..end])
    }
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRequest")
            .field("id", &self.id)
            .field("url", &self.display_url())
            .field("headers", &self.headers)
            .field("mime_type", &self.mime_type)
            .field("timeout", &self.timeout)
            .field("streaming", &self.stream_handler.is_some())
            .field("output_path", &self.output_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(url: &str, body: Option<serde_json::Value>) -> TransportRequest {
        TransportRequest {
            id: Uuid::new_v4(),
            url: url.to_string(),
            headers: vec![Header::new("Authorization", "Bearer sk").unwrap()],
            body,
            mime_type: MimeType::Json,
            timeout: None,
            stream_handler: None,
            output_path: None,
            cancellation: None,
        }
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "get");
        assert_eq!(HttpMethod::Post.to_string(), "post");
        assert_eq!(HttpMethod::Put.to_string(), "put");
        assert_eq!(HttpMethod::Patch.to_string(), "patch");
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_mime_type_content_type() {
        assert_eq!(MimeType::default(), MimeType::Json);
        assert_eq!(MimeType::Json.as_content_type(), "application/json");
        assert_eq!(
            MimeType::Form.as_content_type(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(MimeType::Text.as_content_type(), "text/plain");
    }

    #[test]
    fn test_verify_requires_body_for_post_and_patch() {
        let req = request("https://api.example.com/files", None);
        assert!(matches!(
            req.verify(HttpMethod::Post),
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "post"
        ));
        assert!(matches!(
            req.verify(HttpMethod::Patch),
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "patch"
        ));
        assert!(req.verify(HttpMethod::Get).is_ok());
        assert!(req.verify(HttpMethod::Delete).is_ok());
    }

    #[test]
    fn test_display_url_drops_query_and_fragment() {
        let req = request(
            "https://generativelanguage.googleapis.com/v1beta/models?key=AIza-secret",
            None,
        );
        assert_eq!(
            req.display_url(),
            "https://generativelanguage.googleapis.com/v1beta/models"
        );
        assert!(!format!("{req:?}").contains("AIza-secret"));

        let plain = request("https://api.openai.com/v1/files#top", None);
        assert_eq!(plain.display_url(), "https://api.openai.com/v1/files");
    }

    #[test]
    fn test_verify_rejects_empty_url() {
        let req = request("", Some(json!({})));
        assert_eq!(
            req.verify(HttpMethod::Post),
            Err(InvalidHttpRequestError::EmptyUrl)
        );
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request("https://api.example.com", None);
        assert_eq!(req.header("authorization"), Some("Bearer sk"));
        assert!(req.header("x-missing").is_none());
    }
}
