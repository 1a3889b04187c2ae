//! Per-resource service facades.
//!
//! A service binds one endpoint template of one [`CrudClient`] to the subset
//! of CRUD verbs the resource supports. Support is expressed through traits:
//!
//! - [`CrudService`]: `retrieve` and `delete`, available on every service
//! - [`Creatable`]: `create`, `update` and `patch`, for services with a request type
//! - [`Listable`]: `list`, for services with a query type
//!
//! [`Service`] is the generic facade. Its request and query type parameters
//! default to [`Unsupported`], which implements neither `Serialize` nor
//! [`Query`], so calling `create` or `list` on a service that does not
//! declare them is a compile error:
//!
//! ```rust,compile_fail
//! use crud_client::rest::{Creatable, Provider, Service};
//!
//! fn create_model<P: Provider>(models: &Service<P, serde_json::Value>) {
//!     let _ = models.create(&serde_json::json!({"id": "m"}), None);
//! }
//! ```
//!
//! ```rust,compile_fail
//! use crud_client::rest::{Listable, Provider, Service};
//!
//! fn list_models<P: Provider>(models: &Service<P, serde_json::Value>) {
//!     let _ = models.list(None, None);
//! }
//! ```
//!
//! Nested resources declare their parent ids with [`Service::within`]. The
//! parents fill `{0}`, `{1}`, ... in order and the resource id takes the next
//! position:
//!
//! ```rust
//! use crud_client::rest::resource_template;
//!
//! assert_eq!(resource_template("threads/{0}/messages", 1), "threads/{0}/messages/{1}");
//! ```
//!
//! Declaring the types enables the verbs:
//!
//! ```rust
//! use crud_client::rest::{Creatable, CursorQuery, Listable, Provider, Service};
//!
//! fn use_assistants<P: Provider>(
//!     assistants: &Service<P, serde_json::Value, serde_json::Value, CursorQuery>,
//! ) {
//!     let _ = assistants.create(&serde_json::json!({"model": "gpt-4o"}), None);
//!     let _ = assistants.list(Some(&CursorQuery::new().size(20)), None);
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Header, SecretString, ValueProvider};
use crate::rest::client::{CrudClient, Provider};
use crate::rest::errors::CrudResult;
use crate::rest::options::RequestOptions;
use crate::rest::path::PathParam;
use crate::rest::query::{Query, QueryResponse};

/// Placeholder for the id in single-resource templates without parents.
pub const ID_PLACEHOLDER: &str = "{0}";

/// Marker for a verb a service does not support.
///
/// `Unsupported` has no values and implements neither `Serialize` nor
/// [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {}

/// Settings shared by every service: the client, beta and auth overrides,
/// and the parent ids of a nested resource.
pub struct ServiceBase<P> {
    client: Arc<CrudClient<P>>,
    is_beta: bool,
    api_key: Option<Arc<dyn ValueProvider>>,
    beta_headers: Vec<Header>,
    parents: Vec<String>,
}

impl<P: Provider> ServiceBase<P> {
    /// Creates a non-beta service base without overrides.
    #[must_use]
    pub const fn new(client: Arc<CrudClient<P>>) -> Self {
        Self {
            client,
            is_beta: false,
            api_key: None,
            beta_headers: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Marks the service as a beta service.
    #[must_use]
    pub const fn beta(mut self) -> Self {
        self.is_beta = true;
        self
    }

    /// Overrides the client's API key value for this service.
    ///
    /// The override only applies when the client has an API-key descriptor;
    /// the descriptor still decides where the key is placed.
    #[must_use]
    pub fn with_api_key(mut self, provider: impl ValueProvider + 'static) -> Self {
        self.api_key = Some(Arc::new(provider));
        self
    }

    /// Replaces the beta descriptor's header with `headers` for beta calls.
    #[must_use]
    pub fn with_beta_headers(mut self, headers: impl IntoIterator<Item = Header>) -> Self {
        self.beta_headers = headers.into_iter().collect();
        self
    }

    /// Sets the parent ids that fill the leading positional placeholders.
    #[must_use]
    pub fn with_parents<I>(mut self, parents: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        self.parents = parents.into_iter().map(|p| p.to_string()).collect();
        self
    }

    /// The bound client.
    #[must_use]
    pub const fn client(&self) -> &Arc<CrudClient<P>> {
        &self.client
    }

    /// Whether this is a beta service.
    #[must_use]
    pub const fn is_beta(&self) -> bool {
        self.is_beta
    }

    /// The API key override, if any.
    #[must_use]
    pub fn api_key_override(&self) -> Option<&dyn ValueProvider> {
        self.api_key.as_deref()
    }

    /// The custom beta headers; empty when not overridden.
    #[must_use]
    pub fn custom_beta_headers(&self) -> &[Header] {
        &self.beta_headers
    }

    /// The parent ids, outermost first.
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Path parameters for a call: every parent id, then `id` if given.
    #[must_use]
    pub fn path_params(&self, id: Option<&str>) -> Vec<PathParam> {
        self.parents
            .iter()
            .map(PathParam::id)
            .chain(id.map(PathParam::id))
            .collect()
    }

    /// The API key this service sends: the override if set, else the client's.
    #[must_use]
    pub fn api_key(&self) -> SecretString {
        self.api_key
            .as_ref()
            .map_or_else(|| self.client.api_key(), |provider| provider.value())
    }
}

impl<P> Clone for ServiceBase<P> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            is_beta: self.is_beta,
            api_key: self.api_key.clone(),
            beta_headers: self.beta_headers.clone(),
            parents: self.parents.clone(),
        }
    }
}

impl<P> fmt::Debug for ServiceBase<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBase")
            .field("client", &self.client)
            .field("is_beta", &self.is_beta)
            .field("has_api_key_override", &self.api_key.is_some())
            .field("beta_headers", &self.beta_headers)
            .field("parents", &self.parents)
            .finish()
    }
}

/// Returns the single-resource template for `endpoint` under `parents`
/// parent ids.
///
/// The resource id takes placeholder `{parents}`. Templates that already
/// contain it are returned unchanged; otherwise `/{parents}` is appended.
///
/// # Example
///
/// ```rust
/// use crud_client::rest::resource_template;
///
/// assert_eq!(resource_template("assistants", 0), "assistants/{0}");
/// assert_eq!(resource_template("models/{0}", 0), "models/{0}");
/// assert_eq!(
///     resource_template("threads/{0}/runs/{1}/steps", 2),
///     "threads/{0}/runs/{1}/steps/{2}"
/// );
/// ```
#[must_use]
pub fn resource_template(endpoint: &str, parents: usize) -> Cow<'_, str> {
    let placeholder = format!("{{{parents}}}");
    if endpoint.contains(&placeholder) {
        Cow::Borrowed(endpoint)
    } else {
        Cow::Owned(format!("{}/{placeholder}", endpoint.trim_end_matches('/')))
    }
}

/// Read and delete operations available on every service.
#[allow(async_fn_in_trait)]
pub trait CrudService {
    /// The provider the service's client is bound to.
    type Provider: Provider;

    /// The resource type returned by the service.
    type Data: DeserializeOwned;

    /// The service base.
    fn base(&self) -> &ServiceBase<Self::Provider>;

    /// The collection endpoint template.
    fn endpoint(&self) -> &str;

    /// The single-resource endpoint template.
    fn resource_endpoint(&self) -> Cow<'_, str> {
        resource_template(self.endpoint(), self.base().parents().len())
    }

    /// Retrieves one resource by id.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`](crate::rest::CrudError) on any dispatch failure.
    async fn retrieve(&self, id: &str, options: Option<RequestOptions>) -> CrudResult<Self::Data> {
        let base = self.base();
        base.client()
            .get_retrieve(base, &self.resource_endpoint(), base.path_params(Some(id)), options)
            .await
    }

    /// Deletes one resource by id; `Ok(true)` if the provider confirms it.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`](crate::rest::CrudError) on any dispatch failure.
    async fn delete(&self, id: &str, options: Option<RequestOptions>) -> CrudResult<bool> {
        let base = self.base();
        base.client()
            .delete_delete(base, &self.resource_endpoint(), base.path_params(Some(id)), options)
            .await
    }
}

/// Create and update operations.
#[allow(async_fn_in_trait)]
pub trait Creatable: CrudService {
    /// The request body type.
    type Request: Serialize;

    /// Creates a resource.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`](crate::rest::CrudError) on any dispatch failure.
    async fn create(
        &self,
        request: &Self::Request,
        options: Option<RequestOptions>,
    ) -> CrudResult<Self::Data> {
        let base = self.base();
        base.client()
            .post_create(base, self.endpoint(), request, base.path_params(None), options)
            .await
    }

    /// Replaces a resource with `request`.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`](crate::rest::CrudError) on any dispatch failure.
    async fn update(
        &self,
        id: &str,
        request: &Self::Request,
        options: Option<RequestOptions>,
    ) -> CrudResult<Self::Data> {
        let base = self.base();
        base.client()
            .post_update(
                base,
                &self.resource_endpoint(),
                request,
                base.path_params(Some(id)),
                options,
            )
            .await
    }

    /// Updates the fields named in `update_mask` (comma-separated).
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`](crate::rest::CrudError) on any dispatch failure.
    async fn patch(
        &self,
        id: &str,
        request: &Self::Request,
        update_mask: &str,
        options: Option<RequestOptions>,
    ) -> CrudResult<Self::Data> {
        let base = self.base();
        base.client()
            .patch_update(
                base,
                &self.resource_endpoint(),
                request,
                update_mask,
                base.path_params(Some(id)),
                options,
            )
            .await
    }
}

/// List operation.
#[allow(async_fn_in_trait)]
pub trait Listable: CrudService {
    /// The list query type.
    type Query: Query;

    /// Lists resources.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`](crate::rest::CrudError) on any dispatch failure.
    async fn list(
        &self,
        query: Option<&Self::Query>,
        options: Option<RequestOptions>,
    ) -> CrudResult<QueryResponse<Self::Data>> {
        let base = self.base();
        base.client()
            .get_list(base, self.endpoint(), query, base.path_params(None), options)
            .await
    }
}

/// Generic service facade.
///
/// * `P` - the provider
/// * `D` - the resource type
/// * `R` - the create/update request type, or [`Unsupported`]
/// * `Q` - the list query type, or [`Unsupported`]
///
/// # Example
///
/// ```rust,ignore
/// let models: Service<OpenAi, Model, Unsupported, CursorQuery> =
///     Service::new(Arc::clone(&client), "models");
/// let page = models.list(None, None).await?;
/// let model = models.retrieve("gpt-4o", None).await?;
///
/// let assistants: Service<OpenAi, Assistant, AssistantRequest, CursorQuery> =
///     Service::new(client, "assistants")
///         .beta()
///         .with_beta_headers([Header::new("OpenAI-Beta", "assistants=v2")?]);
/// ```
pub struct Service<P, D, R = Unsupported, Q = Unsupported> {
    base: ServiceBase<P>,
    endpoint: String,
    _types: PhantomData<fn() -> (D, R, Q)>,
}

impl<P: Provider, D, R, Q> Service<P, D, R, Q> {
    /// Creates a service for `endpoint`.
    #[must_use]
    pub fn new(client: Arc<CrudClient<P>>, endpoint: impl Into<String>) -> Self {
        Self::from_base(ServiceBase::new(client), endpoint)
    }

    /// Creates a service from an existing base.
    #[must_use]
    pub fn from_base(base: ServiceBase<P>, endpoint: impl Into<String>) -> Self {
        Self {
            base,
            endpoint: endpoint.into(),
            _types: PhantomData,
        }
    }

    /// Marks the service as a beta service.
    #[must_use]
    pub fn beta(mut self) -> Self {
        self.base = self.base.beta();
        self
    }

    /// Overrides the client's API key value for this service.
    #[must_use]
    pub fn with_api_key(mut self, provider: impl ValueProvider + 'static) -> Self {
        self.base = self.base.with_api_key(provider);
        self
    }

    /// Replaces the beta descriptor's header with `headers` for beta calls.
    #[must_use]
    pub fn with_beta_headers(mut self, headers: impl IntoIterator<Item = Header>) -> Self {
        self.base = self.base.with_beta_headers(headers);
        self
    }

    /// Sets the parent ids of a nested resource.
    #[must_use]
    pub fn with_parents<I>(mut self, parents: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        self.base = self.base.with_parents(parents);
        self
    }

    /// Returns a copy of this service scoped to `parents`.
    ///
    /// ```rust,ignore
    /// let messages: Service<OpenAi, Message, MessageRequest, CursorQuery> =
    ///     Service::new(client, "threads/{0}/messages");
    /// let page = messages.within(["thread_abc"]).list(None, None).await?;
    /// ```
    #[must_use]
    pub fn within<I>(&self, parents: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        self.clone().with_parents(parents)
    }
}

impl<P, D, R, Q> Clone for Service<P, D, R, Q> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            endpoint: self.endpoint.clone(),
            _types: PhantomData,
        }
    }
}

impl<P, D, R, Q> fmt::Debug for Service<P, D, R, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("endpoint", &self.endpoint)
            .field("base", &self.base)
            .finish()
    }
}

impl<P: Provider, D: DeserializeOwned, R, Q> CrudService for Service<P, D, R, Q> {
    type Provider = P;
    type Data = D;

    fn base(&self) -> &ServiceBase<P> {
        &self.base
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<P: Provider, D: DeserializeOwned, R: Serialize, Q> Creatable for Service<P, D, R, Q> {
    type Request = R;
}

impl<P: Provider, D: DeserializeOwned, R, Q: Query> Listable for Service<P, D, R, Q> {
    type Query = Q;
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Unsupported>();
};
