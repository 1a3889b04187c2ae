//! # CRUD Client
//!
//! A provider-agnostic framework for building typed REST clients against
//! CRUD-style HTTP APIs such as OpenAI, Anthropic or Ollama.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe client configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Pluggable placement of API keys and versions in headers or query strings
//! - Per-resource service facades whose supported verbs are checked at compile time
//! - Endpoint templates with version, id and method placeholders
//! - Cursor and page-token pagination
//! - Streaming, file download, timeout and cancellation options per request
//! - A pluggable async [`Transport`](clients::Transport), backed by `reqwest` by default
//!
//! ## Quick Start
//!
//! ```rust
//! use crud_client::{ClientConfig, FixedValue, ParamDescriptor};
//!
//! let config = ClientConfig::builder()
//!     .name("Anthropic")
//!     .base_url("https://api.anthropic.com/v1")
//!     .api_key(ParamDescriptor::header_named("x-api-key", FixedValue::new("sk-ant")))
//!     .version(ParamDescriptor::header_named(
//!         "anthropic-version",
//!         FixedValue::new("2023-06-01"),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://api.anthropic.com/v1");
//! ```
//!
//! ## Defining a Provider
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crud_client::clients::HttpResponse;
//! use crud_client::rest::{CrudClient, CrudService, Provider, Service};
//!
//! struct Anthropic;
//!
//! impl Provider for Anthropic {
//!     fn format_error_message(&self, body: &str) -> String {
//!         serde_json::from_str::<serde_json::Value>(body)
//!             .ok()
//!             .and_then(|v| v["error"]["message"].as_str().map(String::from))
//!             .unwrap_or_else(|| body.to_string())
//!     }
//!
//!     fn is_deleted(&self, response: &HttpResponse) -> bool {
//!         response.body().is_some_and(|v| v["type"] == "model_deleted")
//!     }
//! }
//!
//! let client = CrudClient::with_default_transport(config, Anthropic)?.into_shared();
//! let models: Service<Anthropic, Model> = Service::new(Arc::clone(&client), "models");
//! let model = models.retrieve("claude-sonnet", None).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Clients are values shared explicitly through `Arc`
//! - **Fail-fast configuration**: Newtypes and builders validate on construction
//! - **Errors as values**: Every dispatch failure is returned as a [`CrudError`]
//! - **Thread-safe**: Clients, services and options are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export configuration types at crate root for convenience
pub use config::{
    BaseUrl, ClientConfig, ClientConfigBuilder, EnvValue, FixedValue, Header,
    MisconfigurationPolicy, ParamDescriptor, ParamKind, ProviderName, SecretString, ValueProvider,
};
pub use error::ConfigError;

// Re-export transport types
pub use clients::{
    HttpMethod, HttpResponse, MimeType, ReqwestTransport, Transport, TransportError,
    TransportRequest,
};

// Re-export dispatch types
pub use rest::{
    Creatable, CrudClient, CrudError, CrudResult, CrudService, Listable, Provider,
    RequestOptions, RestRequest, Service,
};
