//! Authentication and version parameter resolution.
//!
//! Before a request is routed, the dispatcher merges the client's and the
//! service's authentication and versioning settings into the request headers
//! and the path-parameter list. The steps run in a fixed order:
//!
//! 1. The client must have a non-empty name.
//! 2. API key: a header descriptor attaches a formatted header; a query
//!    descriptor appends a query parameter under its key.
//! 3. Beta services: a query descriptor appends a version parameter and
//!    suppresses step 4; otherwise the service's custom beta headers are
//!    attached if it has any, else the descriptor's own header.
//! 4. Version: a query descriptor appends a version parameter, a header
//!    descriptor attaches a header.
//! 5. The client's static headers are appended.
//!
//! Descriptor values are read once per request into a [`ResolvedParams`]
//! snapshot. Either every addition is applied or none is.

use crate::config::{Header, ParamDescriptor, ParamKind, SecretString};
use crate::rest::client::Provider;
use crate::rest::errors::ParamError;
use crate::rest::path::PathParam;
use crate::rest::request::RestRequest;
use crate::rest::service::ServiceBase;

/// Descriptor values read once for one request.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParams {
    api_key: SecretString,
    beta_version: SecretString,
    version: SecretString,
}

impl ResolvedParams {
    /// Reads every configured descriptor for `service`.
    ///
    /// The service's API key override replaces the client's value when the
    /// client has an API-key descriptor. The beta version is only read for
    /// beta services.
    #[must_use]
    pub fn resolve<P: Provider>(service: &ServiceBase<P>) -> Self {
        let config = service.client().config();

        let api_key = match (config.api_key().is_unset(), service.api_key_override()) {
            (true, _) => SecretString::default(),
            (false, Some(provider)) => provider.value(),
            (false, None) => config.api_key().resolve(),
        };

        let beta_version = if service.is_beta() {
            config.beta_version().resolve()
        } else {
            SecretString::default()
        };

        Self {
            api_key,
            beta_version,
            version: config.version().resolve(),
        }
    }

    /// The resolved API key.
    #[must_use]
    pub const fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// The resolved beta version.
    #[must_use]
    pub const fn beta_version(&self) -> &SecretString {
        &self.beta_version
    }

    /// The resolved version.
    #[must_use]
    pub const fn version(&self) -> &SecretString {
        &self.version
    }
}

/// Headers and path parameters to add to one request.
#[derive(Debug, Default)]
struct Additions {
    headers: Vec<Header>,
    params: Vec<PathParam>,
}

impl Additions {
    fn apply<T>(
        self,
        mut request: RestRequest<T>,
        mut params: Vec<PathParam>,
    ) -> (RestRequest<T>, Vec<PathParam>) {
        request.add_headers(self.headers);
        params.extend(self.params);
        (request, params)
    }

    fn attach(&mut self, descriptor: &ParamDescriptor, value: &str) -> Result<(), ParamError> {
        self.headers.extend(descriptor.format_header(value)?);
        Ok(())
    }
}

fn require(value: &SecretString, error: impl FnOnce() -> ParamError) -> Result<&str, ParamError> {
    if value.is_empty() {
        Err(error())
    } else {
        Ok(value.expose())
    }
}

fn plan<P: Provider>(
    service: &ServiceBase<P>,
    resolved: &ResolvedParams,
) -> Result<Additions, ParamError> {
    let client = service.client();
    let config = client.config();
    let provider = client.name().to_string();

    if provider.trim().is_empty() {
        return Err(ParamError::EmptyClientName);
    }

    let mut additions = Additions::default();

    let api_key = config.api_key();
    match api_key.kind() {
        ParamKind::Unset => {}
        ParamKind::Header => {
            let value = require(resolved.api_key(), || ParamError::MissingApiKey {
                provider: provider.clone(),
            })?;
            additions.attach(api_key, value)?;
        }
        ParamKind::Query => {
            let value = require(resolved.api_key(), || ParamError::MissingApiKey {
                provider: provider.clone(),
            })?;
            let key = api_key
                .query_key()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| ParamError::MissingQueryKey {
                    provider: provider.clone(),
                })?;
            additions.params.push(PathParam::query(key, value));
        }
    }

    let mut version_set = false;
    if service.is_beta() {
        let beta = config.beta_version();
        let missing = || ParamError::MissingBetaVersion {
            provider: provider.clone(),
        };
        match beta.kind() {
            ParamKind::Query => {
                let value = require(resolved.beta_version(), missing)?;
                additions.params.push(PathParam::version(value));
                version_set = true;
            }
            _ if !service.custom_beta_headers().is_empty() => {
                additions
                    .headers
                    .extend(service.custom_beta_headers().iter().cloned());
            }
            ParamKind::Header => {
                let value = require(resolved.beta_version(), missing)?;
                additions.attach(beta, value)?;
            }
            ParamKind::Unset => return Err(missing()),
        }
    }

    if !version_set {
        let version = config.version();
        let missing = || ParamError::MissingVersion {
            provider: provider.clone(),
        };
        match version.kind() {
            ParamKind::Unset => {}
            ParamKind::Query => {
                let value = require(resolved.version(), missing)?;
                additions.params.push(PathParam::version(value));
            }
            ParamKind::Header => {
                let value = require(resolved.version(), missing)?;
                additions.attach(version, value)?;
            }
        }
    }

    additions
        .headers
        .extend(config.additional_headers().iter().cloned());

    Ok(additions)
}

/// Applies authentication, version and static headers to `request` and
/// `params`.
///
/// # Errors
///
/// Returns [`ParamError`] if a configured value is missing; the request and
/// parameters are dropped in that case.
pub fn try_configure_path_parameters<P: Provider, T>(
    service: &ServiceBase<P>,
    request: RestRequest<T>,
    params: Vec<PathParam>,
) -> Result<(RestRequest<T>, Vec<PathParam>), ParamError> {
    let resolved = ResolvedParams::resolve(service);
    plan(service, &resolved).map(|additions| additions.apply(request, params))
}

/// Applies authentication, version and static headers to `request` and
/// `params`.
///
/// A resolution error is logged through the client's logger and the original
/// request and parameters are returned unchanged.
///
/// # Example
///
/// ```rust,ignore
/// let (request, params) = configure_path_parameters(&service, request, params);
/// ```
pub fn configure_path_parameters<P: Provider, T>(
    service: &ServiceBase<P>,
    request: RestRequest<T>,
    params: Vec<PathParam>,
) -> (RestRequest<T>, Vec<PathParam>) {
    let resolved = ResolvedParams::resolve(service);
    match plan(service, &resolved) {
        Ok(additions) => additions.apply(request, params),
        Err(error) => {
            service.client().logger().param_error(&error);
            (request, params)
        }
    }
}
