//! Parameter descriptors for authentication and versioning.
//!
//! A [`ParamDescriptor`] tells the parameter resolver *where* a value goes
//! (a header or a query-string entry) and a [`ValueProvider`] tells it *what*
//! the value is. Providers are asked for their value once per request, so a
//! host application can rotate credentials between calls without rebuilding
//! the client.
//!
//! # Example
//!
//! ```rust
//! use crud_client::config::{EnvValue, FixedValue, ParamDescriptor, ParamKind};
//!
//! // `Authorization: Bearer <key>` read from the environment on every call
//! let api_key = ParamDescriptor::header(EnvValue::new("OPENAI_API_KEY"));
//! assert_eq!(api_key.kind(), ParamKind::Header);
//!
//! // `?key=<key>` with a fixed value
//! let api_key = ParamDescriptor::query("key", FixedValue::new("AIza-test"));
//! assert_eq!(api_key.kind(), ParamKind::Query);
//! assert_eq!(api_key.resolve().expose(), "AIza-test");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::{Header, SecretString};
use crate::error::ConfigError;

/// Default header used by [`ParamDescriptor::header`].
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// Default format used by [`ParamDescriptor::header`].
pub const DEFAULT_AUTH_FORMAT: &str = "Bearer {}";

/// Produces a parameter value at request time.
///
/// An empty value means "not configured"; the resolver turns it into a
/// [`ParamError`](crate::rest::ParamError).
pub trait ValueProvider: Send + Sync {
    /// Returns the current value.
    fn value(&self) -> SecretString;
}

impl<F> ValueProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn value(&self) -> SecretString {
        SecretString::new(self())
    }
}

/// A value fixed at construction time.
#[derive(Clone, Debug)]
pub struct FixedValue(SecretString);

impl FixedValue {
    /// Creates a fixed value provider.
    #[must_use]
    pub fn new(value: impl Into<SecretString>) -> Self {
        Self(value.into())
    }
}

impl ValueProvider for FixedValue {
    fn value(&self) -> SecretString {
        self.0.clone()
    }
}

/// A value read from an environment variable on every call.
///
/// A missing or non-unicode variable yields an empty value.
#[derive(Clone, Debug)]
pub struct EnvValue {
    var: String,
}

impl EnvValue {
    /// Creates a provider reading `var`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl ValueProvider for EnvValue {
    fn value(&self) -> SecretString {
        SecretString::new(std::env::var(&self.var).unwrap_or_default())
    }
}

/// Where a descriptor places its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Not configured; the resolver skips it.
    Unset,
    /// Sent as a request header.
    Header,
    /// Sent as a query-string entry (or a `{ver}` path segment for versions).
    Query,
}

/// A tagged value source for the API key, version or beta version.
#[derive(Clone, Default)]
pub enum ParamDescriptor {
    /// Not configured.
    #[default]
    Unset,
    /// Sent as `name: format` with `{}` replaced by the value.
    Header {
        /// Header name.
        name: String,
        /// Header value format; every `{}` is replaced by the value.
        format: String,
        /// Value source.
        provider: Arc<dyn ValueProvider>,
    },
    /// Sent as `?key=value`.
    Query {
        /// Query-string key. May be empty for version descriptors, which
        /// substitute `{ver}` instead of adding a query entry.
        key: String,
        /// Value source.
        provider: Arc<dyn ValueProvider>,
    },
}

impl ParamDescriptor {
    /// An unset descriptor.
    #[must_use]
    pub const fn unset() -> Self {
        Self::Unset
    }

    /// `Authorization: Bearer <value>`.
    #[must_use]
    pub fn header(provider: impl ValueProvider + 'static) -> Self {
        Self::header_with_format(DEFAULT_AUTH_HEADER, DEFAULT_AUTH_FORMAT, provider)
    }

    /// `<name>: <value>`.
    #[must_use]
    pub fn header_named(name: impl Into<String>, provider: impl ValueProvider + 'static) -> Self {
        Self::header_with_format(name, "{}", provider)
    }

    /// `<name>: <format>` with every `{}` replaced by the value.
    #[must_use]
    pub fn header_with_format(
        name: impl Into<String>,
        format: impl Into<String>,
        provider: impl ValueProvider + 'static,
    ) -> Self {
        Self::Header {
            name: name.into(),
            format: format.into(),
            provider: Arc::new(provider),
        }
    }

    /// `?<key>=<value>`.
    #[must_use]
    pub fn query(key: impl Into<String>, provider: impl ValueProvider + 'static) -> Self {
        Self::Query {
            key: key.into(),
            provider: Arc::new(provider),
        }
    }

    /// Returns where this descriptor places its value.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Unset => ParamKind::Unset,
            Self::Header { .. } => ParamKind::Header,
            Self::Query { .. } => ParamKind::Query,
        }
    }

    /// Returns `true` for [`ParamDescriptor::Unset`].
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Asks the provider for its current value. Unset descriptors yield an
    /// empty value.
    #[must_use]
    pub fn resolve(&self) -> SecretString {
        match self {
            Self::Unset => SecretString::default(),
            Self::Header { provider, .. } | Self::Query { provider, .. } => provider.value(),
        }
    }

    /// Returns the query key for `Query` descriptors.
    #[must_use]
    pub fn query_key(&self) -> Option<&str> {
        match self {
            Self::Query { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Formats `value` into a header for `Header` descriptors.
    ///
    /// Returns `Ok(None)` for other kinds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] if the configured header
    /// name is invalid.
    pub fn format_header(&self, value: &str) -> Result<Option<Header>, ConfigError> {
        match self {
            Self::Header { name, format, .. } => {
                Header::new(name.clone(), format.replace("{}", value)).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for ParamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Header { name, format, .. } => f
                .debug_struct("Header")
                .field("name", name)
                .field("format", format)
                .finish_non_exhaustive(),
            Self::Query { key, .. } => f
                .debug_struct("Query")
                .field("key", key)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_descriptor_is_unset() {
        let descriptor = ParamDescriptor::default();
        assert!(descriptor.is_unset());
        assert_eq!(descriptor.kind(), ParamKind::Unset);
        assert!(descriptor.resolve().is_empty());
    }

    #[test]
    fn test_header_descriptor_formats_bearer_token() {
        let descriptor = ParamDescriptor::header(FixedValue::new("sk-123"));
        let header = descriptor.format_header("sk-123").unwrap().unwrap();
        assert_eq!(header.name(), "Authorization");
        assert_eq!(header.value(), "Bearer sk-123");
    }

    #[test]
    fn test_header_named_uses_raw_value() {
        let descriptor = ParamDescriptor::header_named("xi-api-key", FixedValue::new("abc"));
        let header = descriptor.format_header("abc").unwrap().unwrap();
        assert_eq!(header.name(), "xi-api-key");
        assert_eq!(header.value(), "abc");
    }

    #[test]
    fn test_format_header_is_none_for_query() {
        let descriptor = ParamDescriptor::query("key", FixedValue::new("abc"));
        assert!(descriptor.format_header("abc").unwrap().is_none());
        assert_eq!(descriptor.query_key(), Some("key"));
    }

    #[test]
    fn test_format_header_rejects_invalid_name() {
        let descriptor = ParamDescriptor::header_named("bad name", FixedValue::new("abc"));
        assert!(descriptor.format_header("abc").is_err());
    }

    #[test]
    fn test_closure_provider_is_evaluated_on_every_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let descriptor = ParamDescriptor::header(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            format!("key-{n}")
        });

        assert_eq!(descriptor.resolve().expose(), "key-1");
        assert_eq!(descriptor.resolve().expose(), "key-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_env_provider_reads_missing_variable_as_empty() {
        let provider = EnvValue::new("CRUD_CLIENT_TEST_DEFINITELY_UNSET_VAR");
        assert!(provider.value().is_empty());
    }

    #[test]
    fn test_debug_does_not_expose_provider() {
        let descriptor = ParamDescriptor::query("key", FixedValue::new("secret-value"));
        let debug = format!("{descriptor:?}");
        assert!(debug.contains("key"));
        assert!(!debug.contains("secret-value"));
    }
}
