//! Error types for client configuration.
//!
//! This module contains the errors raised while constructing a client or its
//! configuration. These are the only failures the framework returns eagerly:
//! everything that happens later, during dispatch, is reported through
//! [`CrudError`](crate::rest::CrudError) instead.
//!
//! # Example
//!
//! ```rust
//! use crud_client::{ConfigError, ProviderName};
//!
//! let result = ProviderName::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyProviderName)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Provider name cannot be empty.
    #[error("Provider name cannot be empty. Every client must be registered under a provider name.")]
    EmptyProviderName,

    /// Base URL cannot be empty.
    #[error("Base URL cannot be empty. Please provide the provider's API root (e.g., 'https://api.example.com').")]
    EmptyBaseUrl,

    /// Base URL is malformed.
    #[error("Invalid base URL '{url}'. Expected an absolute http or https URL (e.g., 'https://api.example.com/v1').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Header name is malformed.
    #[error("Invalid header name '{name}'. Header names must be non-empty and contain no whitespace or ':'.")]
    InvalidHeaderName {
        /// The invalid header name that was provided.
        name: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_provider_name_error_message() {
        let message = ConfigError::EmptyProviderName.to_string();
        assert!(message.contains("Provider name cannot be empty"));
    }

    #[test]
    fn test_invalid_base_url_error_message() {
        let error = ConfigError::InvalidBaseUrl {
            url: "ftp://nope".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("ftp://nope"));
        assert!(message.contains("http or https"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "base_url" };
        let message = error.to_string();
        assert!(message.contains("base_url"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyBaseUrl;
        let _: &dyn std::error::Error = &error;
    }
}
