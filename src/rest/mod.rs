//! Provider-agnostic CRUD dispatch.
//!
//! This module turns a provider's REST API into typed service facades that
//! share one client:
//!
//! - **[`CrudClient`]**: Provider configuration, transport, logger and
//!   exception observer, shared between services through `Arc`
//! - **[`Service`]**: A per-resource facade exposing only the verbs the
//!   resource supports, via [`CrudService`], [`Creatable`] and [`Listable`]
//! - **Parameter resolution**: API key, version and beta settings merged into
//!   each request by [`configure_path_parameters`]
//! - **Routing**: Endpoint templates with `{ver}`, `{0}` and `:method`
//!   placeholders, filled by [`build_route`]
//! - **[`CrudError`]**: One error type for every dispatch failure
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crud_client::config::{ClientConfig, EnvValue, ParamDescriptor};
//! use crud_client::rest::{Creatable, CrudClient, CrudService, CursorQuery, Listable, Service};
//!
//! let config = ClientConfig::builder()
//!     .name("OpenAI")
//!     .base_url("https://api.openai.com/v1")
//!     .api_key(ParamDescriptor::header(EnvValue::new("OPENAI_API_KEY")))
//!     .build()?;
//! let client = CrudClient::with_default_transport(config, OpenAi)?.into_shared();
//!
//! let files: Service<OpenAi, File, FileRequest, CursorQuery> =
//!     Service::new(Arc::clone(&client), "files");
//!
//! let created = files.create(&request, None).await?;
//! let page = files.list(Some(&CursorQuery::new().size(10)), None).await?;
//! let deleted = files.delete(&created.id, None).await?;
//! ```
//!
//! # Key Types
//!
//! - [`RestRequest`] and [`RequestOptions`]: A single call and its options
//! - [`PathParam`] and [`RouteBuilder`]: Route building
//! - [`Query`], [`TokenQuery`], [`CursorQuery`] and [`QueryResponse`]: Pagination
//! - [`JsonBody`]: An untyped request body
//! - [`CrudLogger`]: Provider-tagged structured logging

mod body;
mod client;
mod dispatch;
mod errors;
mod logger;
mod options;
mod params;
mod path;
mod query;
mod request;
mod service;

pub use body::{JsonBody, JsonBodyBuilder};
pub use client::{CrudClient, ExceptionObserver, Provider};
pub use dispatch::{CrudVerb, UPDATE_MASK_KEY};
pub use errors::{CrudError, CrudResult, ParamError, RouteError};
pub use logger::CrudLogger;
pub use options::{
    CancellationToken, RequestOptions, RequestOptionsBuilder, StreamHandler, DEFAULT_MAX_RETRY,
    DEFAULT_RETRY_DELAY_SEC,
};
pub use params::{configure_path_parameters, try_configure_path_parameters, ResolvedParams};
pub use path::{build_route, PathParam, RouteBuilder, VERSION_PLACEHOLDER};
pub use query::{CursorQuery, Query, QueryResponse, SortOrder, TokenQuery};
pub use request::RestRequest;
pub use service::{
    resource_template, Creatable, CrudService, Listable, Service, ServiceBase, Unsupported,
    ID_PLACEHOLDER,
};

// Verify shared types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RequestOptions>();
    assert_send_sync::<CancellationToken>();
    assert_send_sync::<CrudError>();
    assert_send_sync::<JsonBody>();
};
