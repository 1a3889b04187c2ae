//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated provider name.
///
/// Identifies the provider a client talks to (e.g., `"OpenAI"`). The name is
/// used in every log line the client emits and must be non-empty.
///
/// # Example
///
/// ```rust
/// use crud_client::ProviderName;
///
/// let name = ProviderName::new("  OpenAI ").unwrap();
/// assert_eq!(name.as_ref(), "OpenAI");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProviderName(String);

impl ProviderName {
    /// Creates a new validated provider name. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyProviderName`] if the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyProviderName);
        }
        Ok(Self(name.to_string()))
    }
}

impl AsRef<str> for ProviderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated provider base URL.
///
/// The URL must carry an `http` or `https` scheme and a host. Trailing slashes
/// are removed so routes can be joined with a single `/`.
///
/// # Example
///
/// ```rust
/// use crud_client::BaseUrl;
///
/// let url = BaseUrl::new("https://api.openai.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://api.openai.com");
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), "api.openai.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] for an empty value and
    /// [`ConfigError::InvalidBaseUrl`] if the scheme or host is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();

        if url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let scheme_end = url
            .find("://")
            .ok_or_else(|| ConfigError::InvalidBaseUrl { url: url.clone() })?;

        let scheme = &url[..scheme_end];
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(ConfigError::InvalidBaseUrl { url: url.clone() });
        }

        let host_start = scheme_end + 3;
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        if host_end == host_start || remainder.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidBaseUrl { url: url.clone() });
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }

    /// Joins a relative route onto this base URL with exactly one `/`.
    #[must_use]
    pub fn join(&self, route: &str) -> String {
        let route = route.trim_start_matches('/');
        if route.is_empty() {
            self.url.clone()
        } else {
            format!("{}/{route}", self.url)
        }
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A string that never reveals its contents in `Debug` or `Display`.
///
/// Used for API keys and any other credential that passes through the
/// parameter resolver.
///
/// # Example
///
/// ```rust
/// use crud_client::SecretString;
///
/// let secret = SecretString::new("sk-live-123");
/// assert_eq!(format!("{secret:?}"), "SecretString(*****)");
/// assert_eq!(secret.expose(), "sk-live-123");
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value. Call sites should be limited to the places
    /// that put the value on the wire.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(*****)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*****")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single HTTP header (name and value).
///
/// Header names are validated on construction; values are taken as-is.
///
/// # Example
///
/// ```rust
/// use crud_client::Header;
///
/// let header = Header::new("OpenAI-Beta", "assistants=v2").unwrap();
/// assert_eq!(header.name(), "OpenAI-Beta");
/// assert_eq!(header.value(), "assistants=v2");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    /// Creates a new header.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] if the name is empty or
    /// contains whitespace or `:`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == ':') {
            return Err(ConfigError::InvalidHeaderName { name });
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// Returns the header name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the header value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

// Header values frequently carry credentials.
impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("name", &self.name)
            .field("value", &"*****")
            .finish()
    }
}
