//! CRUD verb dispatch.
//!
//! Every verb runs the same pipeline:
//!
//! 1. Build a [`RestRequest`], with a typed body when the verb sends one
//! 2. Resolve authentication and version parameters
//! 3. Build the route and assign it to the request
//! 4. Log the start of the call unless the options suppress it
//! 5. Send the request through the client's transport
//! 6. Classify the response
//!
//! A non-2xx response becomes [`CrudError::Api`] with the provider-formatted
//! message and the partial body. Every other failure is reported to the
//! client's exception observer with the requested endpoint template and then
//! returned.
//!
//! Logged URLs and the URL inside [`CrudError::Decode`] mask the value of a
//! query-placed API key.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clients::{HttpMethod, HttpResponse};
use crate::config::MisconfigurationPolicy;
use crate::rest::client::{CrudClient, Provider};
use crate::rest::errors::{CrudError, CrudResult};
use crate::rest::options::RequestOptions;
use crate::rest::params::{configure_path_parameters, try_configure_path_parameters};
use crate::rest::path::{PathParam, RouteBuilder};
use crate::rest::query::{Query, QueryResponse};
use crate::rest::request::RestRequest;
use crate::rest::service::ServiceBase;

/// Query key carrying the field mask of a partial update.
pub const UPDATE_MASK_KEY: &str = "updateMask";

const REDACTED: &str = "REDACTED";

/// The CRUD verb being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudVerb {
    /// `POST` to the collection endpoint.
    Create,
    /// `GET` a single resource.
    Retrieve,
    /// `POST` a full update to a single resource.
    Update,
    /// `PATCH` a single resource with an update mask.
    PartialUpdate,
    /// `DELETE` a single resource.
    Delete,
    /// `GET` the collection endpoint.
    List,
}

impl CrudVerb {
    /// Returns the verb name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Retrieve => "retrieve",
            Self::Update => "update",
            Self::PartialUpdate => "partial_update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }

    /// Returns the HTTP method the verb is sent with.
    #[must_use]
    pub const fn http_method(&self) -> HttpMethod {
        match self {
            Self::Create | Self::Update => HttpMethod::Post,
            Self::Retrieve | Self::List => HttpMethod::Get,
            Self::PartialUpdate => HttpMethod::Patch,
            Self::Delete => HttpMethod::Delete,
        }
    }
}

impl fmt::Display for CrudVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed HTTP exchange.
struct Exchange {
    /// The requested URL with a query-placed API key masked.
    display_url: String,
    response: HttpResponse,
}

impl<P: Provider> CrudClient<P> {
    /// Creates a resource at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`] on any failure; see the [module docs](self).
    pub async fn post_create<B, T>(
        &self,
        service: &ServiceBase<P>,
        endpoint: &str,
        body: &B,
        params: Vec<PathParam>,
        options: Option<RequestOptions>,
    ) -> CrudResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RestRequest::with_body(body, options.unwrap_or_default());
        let exchange = self
            .execute(service, CrudVerb::Create, endpoint, request, params)
            .await?;
        self.classify(CrudVerb::Create, endpoint, &exchange)
    }

    /// Retrieves a resource.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`] on any failure; see the [module docs](self).
    pub async fn get_retrieve<T: DeserializeOwned>(
        &self,
        service: &ServiceBase<P>,
        endpoint: &str,
        params: Vec<PathParam>,
        options: Option<RequestOptions>,
    ) -> CrudResult<T> {
        let request: RestRequest = RestRequest::new(options.unwrap_or_default());
        let exchange = self
            .execute(service, CrudVerb::Retrieve, endpoint, request, params)
            .await?;
        self.classify(CrudVerb::Retrieve, endpoint, &exchange)
    }

    /// Sends a full update with `POST`.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`] on any failure; see the [module docs](self).
    pub async fn post_update<B, T>(
        &self,
        service: &ServiceBase<P>,
        endpoint: &str,
        body: &B,
        params: Vec<PathParam>,
        options: Option<RequestOptions>,
    ) -> CrudResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RestRequest::with_body(body, options.unwrap_or_default());
        let exchange = self
            .execute(service, CrudVerb::Update, endpoint, request, params)
            .await?;
        self.classify(CrudVerb::Update, endpoint, &exchange)
    }

    /// Sends a partial update with `PATCH`.
    ///
    /// A non-empty `update_mask` is sent as the `updateMask` query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`] on any failure; see the [module docs](self).
    pub async fn patch_update<B, T>(
        &self,
        service: &ServiceBase<P>,
        endpoint: &str,
        body: &B,
        update_mask: &str,
        mut params: Vec<PathParam>,
        options: Option<RequestOptions>,
    ) -> CrudResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !update_mask.is_empty() {
            params.push(PathParam::query(UPDATE_MASK_KEY, update_mask));
        }
        let request = RestRequest::with_body(body, options.unwrap_or_default());
        let exchange = self
            .execute(service, CrudVerb::PartialUpdate, endpoint, request, params)
            .await?;
        self.classify(CrudVerb::PartialUpdate, endpoint, &exchange)
    }

    /// Deletes a resource.
    ///
    /// Returns `Ok(true)` when [`Provider::is_deleted`] accepts the response,
    /// `Ok(false)` for a 2xx response it rejects.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Api`] for a non-2xx response the provider does not
    /// treat as deleted, and [`CrudError`] on any other failure.
    pub async fn delete_delete(
        &self,
        service: &ServiceBase<P>,
        endpoint: &str,
        params: Vec<PathParam>,
        options: Option<RequestOptions>,
    ) -> CrudResult<bool> {
        let request: RestRequest = RestRequest::new(options.unwrap_or_default());
        let exchange = self
            .execute(service, CrudVerb::Delete, endpoint, request, params)
            .await?;

        if self.provider().is_deleted(&exchange.response) {
            Ok(true)
        } else if exchange.response.is_success() {
            Ok(false)
        } else {
            Err(self.api_error(CrudVerb::Delete, &exchange))
        }
    }

    /// Lists resources, sending `query` as query-string parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError`] on any failure; see the [module docs](self).
    pub async fn get_list<T, Q>(
        &self,
        service: &ServiceBase<P>,
        endpoint: &str,
        query: Option<&Q>,
        mut params: Vec<PathParam>,
        options: Option<RequestOptions>,
    ) -> CrudResult<QueryResponse<T>>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        if let Some(query) = query {
            let query_params = query
                .to_path_params()
                .map_err(|e| self.report(endpoint, CrudError::Serialization(e)))?;
            params.extend(query_params);
        }

        let request: RestRequest = RestRequest::new(options.unwrap_or_default());
        let exchange = self
            .execute(service, CrudVerb::List, endpoint, request, params)
            .await?;
        self.classify(CrudVerb::List, endpoint, &exchange)
    }

    async fn execute<B: Serialize>(
        &self,
        service: &ServiceBase<P>,
        verb: CrudVerb,
        endpoint: &str,
        request: RestRequest<B>,
        params: Vec<PathParam>,
    ) -> CrudResult<Exchange> {
        let (mut request, params) = match self.config().misconfiguration_policy() {
            MisconfigurationPolicy::Continue => configure_path_parameters(service, request, params),
            MisconfigurationPolicy::Abort => try_configure_path_parameters(service, request, params)
                .map_err(|e| self.report(endpoint, e.into()))?,
        };

        let url = RouteBuilder::build(self.base_url(), endpoint, &params)
            .map_err(|e| self.report(endpoint, e.into()))?;
        request.set_endpoint(url.clone());
        let display_url = self.display_url(endpoint, &params, &url);

        if !request.ignore_logs() {
            self.logger().verb_started(verb, &display_url);
        }

        let outbound = request
            .to_transport(url)
            .map_err(|e| self.report(endpoint, CrudError::Serialization(e)))?;

        let transport = self.transport();
        let result = match verb.http_method() {
            HttpMethod::Post | HttpMethod::Put => transport.post(outbound).await,
            HttpMethod::Get => transport.get(outbound).await,
            HttpMethod::Patch => transport.patch(outbound).await,
            HttpMethod::Delete => transport.delete(outbound).await,
        };
        let response = result.map_err(|e| self.report(endpoint, e.into()))?;

        Ok(Exchange {
            display_url,
            response,
        })
    }

    /// Returns `url` with the value of a query-placed API key masked.
    fn display_url(&self, endpoint: &str, params: &[PathParam], url: &str) -> String {
        let Some(secret_key) = self.config().api_key().query_key() else {
            return url.to_string();
        };
        let is_secret = |p: &PathParam| matches!(p, PathParam::Query { key, .. } if key == secret_key);
        if !params.iter().any(is_secret) {
            return url.to_string();
        }

        let masked: Vec<PathParam> = params
            .iter()
            .map(|p| {
                if is_secret(p) {
                    PathParam::query(secret_key, REDACTED)
                } else {
                    p.clone()
                }
            })
            .collect();
        RouteBuilder::build(self.base_url(), endpoint, &masked)
            .unwrap_or_else(|_| self.base_url().join(endpoint))
    }

    fn classify<T: DeserializeOwned>(
        &self,
        verb: CrudVerb,
        endpoint: &str,
        exchange: &Exchange,
    ) -> CrudResult<T> {
        if !exchange.response.is_success() {
            return Err(self.api_error(verb, exchange));
        }

        // Empty bodies decode as `null` so `()` and `Option<T>` responses work.
        let text = exchange.response.body_text.trim();
        let text = if text.is_empty() { "null" } else { text };

        serde_json::from_str(text).map_err(|source| {
            self.report(
                endpoint,
                CrudError::Decode {
                    endpoint: exchange.display_url.clone(),
                    source,
                },
            )
        })
    }

    fn api_error(&self, verb: CrudVerb, exchange: &Exchange) -> CrudError {
        let response = &exchange.response;
        let message = if response.body_text.trim().is_empty() {
            response
                .error_message
                .clone()
                .unwrap_or_else(|| format!("HTTP {}", response.code))
        } else {
            self.provider().format_error_message(&response.body_text)
        };

        self.logger()
            .verb_failed(verb, &exchange.display_url, response.code, &message);

        CrudError::Api {
            status: response.code,
            message,
            body: response.body(),
            request_id: response.request_id().map(String::from),
        }
    }
}
