//! Configuration types for CRUD clients.
//!
//! This module provides the configuration a [`CrudClient`](crate::rest::CrudClient)
//! is constructed from.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: Provider identity plus authentication and versioning settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ParamDescriptor`]: Where an API key or version value is placed on the wire
//! - [`ValueProvider`]: Where that value comes from at request time
//! - [`ProviderName`], [`BaseUrl`], [`Header`], [`SecretString`]: Validated newtypes
//!
//! # Example
//!
//! ```rust
//! use crud_client::config::{ClientConfig, EnvValue, FixedValue, ParamDescriptor};
//!
//! let config = ClientConfig::builder()
//!     .name("OpenAI")
//!     .base_url("https://api.openai.com/v1")
//!     .api_key(ParamDescriptor::header(EnvValue::new("OPENAI_API_KEY")))
//!     .beta_version(ParamDescriptor::header_named(
//!         "OpenAI-Beta",
//!         FixedValue::new("assistants=v2"),
//!     ))
//!     .header("OpenAI-Organization", "org-123")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.name().as_ref(), "OpenAI");
//! ```

mod newtypes;
mod param;

pub use newtypes::{BaseUrl, Header, ProviderName, SecretString};
pub use param::{
    EnvValue, FixedValue, ParamDescriptor, ParamKind, ValueProvider, DEFAULT_AUTH_FORMAT,
    DEFAULT_AUTH_HEADER,
};

use crate::error::ConfigError;

/// What the dispatcher does when authentication or version parameters
/// cannot be resolved for a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MisconfigurationPolicy {
    /// Log the resolution error and send the request without the missing
    /// parameters.
    #[default]
    Continue,
    /// Fail the call with [`CrudError::Param`](crate::rest::CrudError::Param)
    /// before anything is sent.
    Abort,
}

/// Configuration for a provider-bound CRUD client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`. Descriptor value providers
/// are shared, not copied, when the config is cloned.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    name: ProviderName,
    base_url: BaseUrl,
    api_key: ParamDescriptor,
    version: ParamDescriptor,
    beta_version: ParamDescriptor,
    additional_headers: Vec<Header>,
    misconfiguration_policy: MisconfigurationPolicy,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn name(&self) -> &ProviderName {
        &self.name
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the API key descriptor.
    #[must_use]
    pub const fn api_key(&self) -> &ParamDescriptor {
        &self.api_key
    }

    /// Returns the version descriptor.
    #[must_use]
    pub const fn version(&self) -> &ParamDescriptor {
        &self.version
    }

    /// Returns the beta version descriptor.
    #[must_use]
    pub const fn beta_version(&self) -> &ParamDescriptor {
        &self.beta_version
    }

    /// Returns the static headers attached to every request, in order.
    #[must_use]
    pub fn additional_headers(&self) -> &[Header] {
        &self.additional_headers
    }

    /// Returns the misconfiguration policy.
    #[must_use]
    pub const fn misconfiguration_policy(&self) -> MisconfigurationPolicy {
        self.misconfiguration_policy
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `name` and `base_url` are required. All descriptors default to
/// [`ParamDescriptor::Unset`], the header list to empty and the
/// misconfiguration policy to [`MisconfigurationPolicy::Continue`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    name: Option<String>,
    base_url: Option<String>,
    api_key: ParamDescriptor,
    version: ParamDescriptor,
    beta_version: ParamDescriptor,
    headers: Vec<(String, String)>,
    misconfiguration_policy: MisconfigurationPolicy,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider name (required).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key descriptor.
    #[must_use]
    pub fn api_key(mut self, descriptor: ParamDescriptor) -> Self {
        self.api_key = descriptor;
        self
    }

    /// Sets the version descriptor.
    #[must_use]
    pub fn version(mut self, descriptor: ParamDescriptor) -> Self {
        self.version = descriptor;
        self
    }

    /// Sets the beta version descriptor.
    #[must_use]
    pub fn beta_version(mut self, descriptor: ParamDescriptor) -> Self {
        self.beta_version = descriptor;
        self
    }

    /// Adds a static header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the misconfiguration policy.
    #[must_use]
    pub const fn misconfiguration_policy(mut self, policy: MisconfigurationPolicy) -> Self {
        self.misconfiguration_policy = policy;
        self
    }

    /// Builds the [`ClientConfig`], validating every field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `name` or `base_url`
    /// is not set, and the matching newtype error if a value is invalid.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let name = self
            .name
            .ok_or(ConfigError::MissingRequiredField { field: "name" })?;
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        let additional_headers = self
            .headers
            .into_iter()
            .map(|(name, value)| Header::new(name, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ClientConfig {
            name: ProviderName::new(name)?,
            base_url: BaseUrl::new(base_url)?,
            api_key: self.api_key,
            version: self.version,
            beta_version: self.beta_version,
            additional_headers,
            misconfiguration_policy: self.misconfiguration_policy,
        })
    }
}
