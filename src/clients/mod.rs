//! HTTP transport layer.
//!
//! This module provides the transport seam the CRUD dispatcher sends requests
//! through. A transport performs exactly one HTTP exchange per call; retries,
//! parameter resolution and response classification live in [`crate::rest`].
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Transport`]: The object-safe async transport trait
//! - [`ReqwestTransport`]: The default reqwest-backed implementation
//! - [`TransportRequest`]: A fully-resolved request ready to send
//! - [`HttpResponse`]: The raw response returned by a transport
//! - [`HttpMethod`]: Supported HTTP methods
//! - [`MimeType`]: Content types for request bodies
//! - [`TransportError`]: Failures where no HTTP response was obtained
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crud_client::clients::{ReqwestTransport, Transport};
//!
//! let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new().unwrap());
//! ```

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod transport;

pub use errors::{InvalidHttpRequestError, TransportError};
pub use http_client::{ReqwestTransport, SDK_VERSION};
pub use http_request::{HttpMethod, MimeType, TransportRequest};
pub use http_response::HttpResponse;
pub use transport::Transport;
