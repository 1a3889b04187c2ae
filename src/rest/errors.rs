//! Error types for CRUD dispatch.
//!
//! This module contains the error taxonomy for the REST layer:
//!
//! - [`ParamError`]: authentication or version parameters could not be resolved
//! - [`RouteError`]: an endpoint template could not be turned into a route
//! - [`CrudError`]: the union returned by every dispatch operation
//!
//! # Error Handling
//!
//! Dispatch failures fall into two groups:
//!
//! - **HTTP failures**: the provider answered with a non-2xx status.
//!   [`CrudError::Api`] carries the status, a provider-formatted message and
//!   whatever body was returned. The exception observer is not notified.
//! - **Everything else**: route, transport, serialization and decode errors.
//!   These are reported to the exception observer once and then returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use crud_client::rest::CrudError;
//!
//! match models.retrieve("gpt-4", None).await {
//!     Ok(model) => println!("{}", model.id),
//!     Err(CrudError::Api { status: 404, .. }) => println!("no such model"),
//!     Err(e) => println!("request failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::TransportError;
use crate::error::ConfigError;

/// Error raised while resolving authentication and version parameters.
///
/// # Example
///
/// ```rust
/// use crud_client::rest::ParamError;
///
/// let error = ParamError::MissingApiKey {
///     provider: "OpenAI".to_string(),
/// };
/// assert_eq!(error.to_string(), "OpenAI API key is missing");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// The client has an empty provider name.
    #[error("Client name is empty")]
    EmptyClientName,

    /// The API-key provider returned an empty value.
    #[error("{provider} API key is missing")]
    MissingApiKey {
        /// Provider name.
        provider: String,
    },

    /// The API key is configured as a query parameter without a key name.
    #[error("{provider} API key is sent as a query parameter but no query key is configured")]
    MissingQueryKey {
        /// Provider name.
        provider: String,
    },

    /// The service is a beta service but no beta version resolved.
    #[error("{provider} beta version is missing")]
    MissingBetaVersion {
        /// Provider name.
        provider: String,
    },

    /// The version descriptor is set but its value is empty.
    #[error("{provider} API version is missing")]
    MissingVersion {
        /// Provider name.
        provider: String,
    },

    /// A descriptor produced an invalid header.
    #[error(transparent)]
    InvalidHeader(#[from] ConfigError),
}

/// Error raised while building a route from an endpoint template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A placeholder was left without a matching parameter.
    #[error("Endpoint template '{template}' has no value for '{placeholder}'")]
    UnresolvedPlaceholder {
        /// The endpoint template.
        template: String,
        /// The placeholder left in the route, e.g. `{0}` or `{ver}`.
        placeholder: String,
    },
}

/// Unified error type returned by dispatch and service operations.
#[derive(Debug, Error)]
pub enum CrudError {
    /// Parameter resolution failed under
    /// [`MisconfigurationPolicy::Abort`](crate::config::MisconfigurationPolicy::Abort).
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Route building failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The transport did not produce a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A successful response body could not be decoded.
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        /// The route that was called.
        endpoint: String,
        /// The decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The provider returned a non-2xx status.
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider-formatted error message.
        message: String,
        /// The response body, if it was valid JSON.
        body: Option<serde_json::Value>,
        /// The `X-Request-Id` header value, if present.
        request_id: Option<String>,
    },
}

impl CrudError {
    /// Returns the HTTP status for [`CrudError::Api`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the partial response body for [`CrudError::Api`].
    #[must_use]
    pub const fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if the request was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_cancelled())
    }
}

/// Result alias for dispatch and service operations.
pub type CrudResult<T> = Result<T, CrudError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_error_messages_name_the_provider() {
        let provider = "Google".to_string();
        assert_eq!(
            ParamError::MissingVersion {
                provider: provider.clone()
            }
            .to_string(),
            "Google API version is missing"
        );
        assert_eq!(
            ParamError::MissingBetaVersion { provider }.to_string(),
            "Google beta version is missing"
        );
    }

    #[test]
    fn test_param_error_wraps_config_error() {
        let error: ParamError = ConfigError::InvalidHeaderName {
            name: "bad name".to_string(),
        }
        .into();
        assert!(error.to_string().contains("bad name"));
    }

    #[test]
    fn test_route_error_message() {
        let error = RouteError::UnresolvedPlaceholder {
            template: "models/{0}".to_string(),
            placeholder: "{0}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Endpoint template 'models/{0}' has no value for '{0}'"
        );
    }

    #[test]
    fn test_api_error_accessors() {
        let error = CrudError::Api {
            status: 404,
            message: "model not found".to_string(),
            body: Some(json!({"error": {"message": "model not found"}})),
            request_id: None,
        };

        assert_eq!(error.status(), Some(404));
        assert!(error.body().is_some());
        assert!(!error.is_cancelled());
        assert_eq!(
            error.to_string(),
            "API request failed with status 404: model not found"
        );
    }

    #[test]
    fn test_transport_cancellation_is_detected() {
        let error: CrudError = TransportError::Cancelled {
            url: "https://api.openai.com/v1/files".to_string(),
        }
        .into();
        assert!(error.is_cancelled());
        assert_eq!(error.status(), None);
        assert!(error.body().is_none());
    }

    #[test]
    fn test_crud_error_from_param_error() {
        let error: CrudError = ParamError::EmptyClientName.into();
        assert!(matches!(error, CrudError::Param(ParamError::EmptyClientName)));
    }
}
