//! One outbound dispatch call.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::clients::{MimeType, TransportRequest};
use crate::config::Header;
use crate::rest::options::RequestOptions;

/// A single outbound request.
///
/// The endpoint is assigned by the dispatcher once the route is built; it is
/// `None` before that. Identity is a random v4 UUID, so two requests built
/// from the same values are never equal.
///
/// # Example
///
/// ```rust
/// use crud_client::rest::{RequestOptions, RestRequest};
///
/// let a: RestRequest = RestRequest::new(RequestOptions::default());
/// let b: RestRequest = RestRequest::new(RequestOptions::default());
/// assert_ne!(a, b);
/// assert!(a.endpoint().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RestRequest<T = ()> {
    id: Uuid,
    endpoint: Option<String>,
    headers: Vec<Header>,
    body: Option<T>,
    options: RequestOptions,
}

impl<T> RestRequest<T> {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(options: RequestOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint: None,
            headers: Vec::new(),
            body: None,
            options,
        }
    }

    /// Creates a request with a typed body.
    #[must_use]
    pub fn with_body(body: T, options: RequestOptions) -> Self {
        Self {
            body: Some(body),
            ..Self::new(options)
        }
    }

    /// The request identity.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The resolved URL, once dispatch has built it.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: String) {
        self.endpoint = Some(endpoint);
    }

    /// Headers in attachment order.
    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Appends a header.
    pub fn add_header(&mut self, header: Header) {
        self.headers.push(header);
    }

    /// Appends several headers in order.
    pub fn add_headers(&mut self, headers: impl IntoIterator<Item = Header>) {
        self.headers.extend(headers);
    }

    /// The typed body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// The request options.
    #[must_use]
    pub const fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Maximum number of retries.
    #[must_use]
    pub const fn max_retry(&self) -> u32 {
        self.options.max_retry()
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.options.timeout()
    }

    /// Body content type.
    #[must_use]
    pub const fn mime_type(&self) -> MimeType {
        self.options.mime_type()
    }

    /// Whether dispatch logging is suppressed.
    #[must_use]
    pub const fn ignore_logs(&self) -> bool {
        self.options.ignore_logs()
    }

    /// Whether the response is streamed to a handler.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.options.is_streaming()
    }

    /// Cancels the request's token, if any, and detaches it.
    ///
    /// Returns `true` if a token was cancelled.
    pub fn cancel_request(&mut self) -> bool {
        let Some(token) = self.options.take_cancellation() else {
            return false;
        };
        token.cancel();
        true
    }
}

impl<T: Serialize> RestRequest<T> {
    /// Serializes the body and produces the transport form of this request.
    pub(crate) fn to_transport(&self, url: String) -> Result<TransportRequest, serde_json::Error> {
        let body = self.body.as_ref().map(serde_json::to_value).transpose()?;

        Ok(TransportRequest {
            id: self.id,
            url,
            headers: self.headers.clone(),
            body,
            mime_type: self.options.mime_type(),
            timeout: self.options.timeout(),
            stream_handler: self.options.stream_handler().cloned(),
            output_path: self.options.output_path().map(ToOwned::to_owned),
            cancellation: self.options.cancellation().cloned(),
        })
    }
}

impl<T> PartialEq for RestRequest<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for RestRequest<T> {}

impl<T> Hash for RestRequest<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
