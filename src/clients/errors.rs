//! Transport error types.
//!
//! This module contains the errors a [`Transport`](crate::clients::Transport)
//! can fail with. An HTTP response with a non-2xx status is *not* an error at
//! this layer: it is returned as an [`HttpResponse`](crate::clients::HttpResponse)
//! and classified by the dispatcher.
//!
//! # Example
//!
//! ```rust,ignore
//! use crud_client::clients::{Transport, TransportError};
//!
//! match transport.get(request).await {
//!     Ok(response) => println!("{}: {}", response.code, response.body_text),
//!     Err(TransportError::Timeout { url, .. }) => println!("{url} timed out"),
//!     Err(TransportError::Cancelled { url }) => println!("{url} was cancelled"),
//!     Err(e) => println!("transport failed: {e}"),
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error returned when a transport request fails validation before sending.
///
/// # Example
///
/// ```rust
/// use crud_client::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "post".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use post without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The request URL is empty.
    #[error("Cannot send a request without a URL.")]
    EmptyUrl,

    /// A POST, PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for transport failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request did not complete within its timeout.
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout {
        /// The URL that timed out, without its query string.
        url: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// The request's cancellation token fired.
    #[error("Request to {url} was cancelled")]
    Cancelled {
        /// The URL whose request was cancelled, without its query string.
        url: String,
    },

    /// The response could not be written to the requested output path.
    #[error("Failed to write response to '{}': {source}", path.display())]
    Io {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a custom transport.
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if the error is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
