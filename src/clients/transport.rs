//! The pluggable HTTP transport seam.
//!
//! The dispatcher never talks to an HTTP library directly; it hands a
//! [`TransportRequest`] to an `Arc<dyn Transport>`. [`ReqwestTransport`](crate::clients::ReqwestTransport)
//! is the default implementation. Tests substitute a recording transport.

use async_trait::async_trait;

use crate::clients::errors::TransportError;
use crate::clients::http_request::{HttpMethod, TransportRequest};
use crate::clients::http_response::HttpResponse;

/// An HTTP transport.
///
/// Implementors only provide [`send`](Transport::send); the verb primitives
/// delegate to it. A non-2xx status is returned as a normal
/// [`HttpResponse`], not as an error.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use crud_client::clients::{
///     HttpMethod, HttpResponse, Transport, TransportError, TransportRequest,
/// };
///
/// struct NotFound;
///
/// #[async_trait]
/// impl Transport for NotFound {
///     async fn send(
///         &self,
///         _method: HttpMethod,
///         _request: TransportRequest,
///     ) -> Result<HttpResponse, TransportError> {
///         Ok(HttpResponse::new(404, Default::default(), String::new()))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` with `method` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was obtained.
    async fn send(
        &self,
        method: HttpMethod,
        request: TransportRequest,
    ) -> Result<HttpResponse, TransportError>;

    /// Sends a POST request.
    async fn post(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        self.send(HttpMethod::Post, request).await
    }

    /// Sends a GET request.
    async fn get(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        self.send(HttpMethod::Get, request).await
    }

    /// Sends a PATCH request.
    async fn patch(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        self.send(HttpMethod::Patch, request).await
    }

    /// Sends a DELETE request.
    async fn delete(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        self.send(HttpMethod::Delete, request).await
    }
}
