//! Provider-bound CRUD client.
//!
//! This module provides [`CrudClient`], the long-lived value a provider
//! integration builds once and shares between its services, and the
//! [`Provider`] trait for provider-specific response semantics.

use std::fmt;
use std::sync::Arc;

use crate::clients::{HttpResponse, ReqwestTransport, Transport, TransportError};
use crate::config::{BaseUrl, ClientConfig, ProviderName, SecretString};
use crate::rest::errors::CrudError;
use crate::rest::logger::CrudLogger;

/// Provider-specific response semantics.
///
/// # Example
///
/// ```rust
/// use crud_client::clients::HttpResponse;
/// use crud_client::rest::Provider;
///
/// struct OpenAi;
///
/// impl Provider for OpenAi {
///     fn format_error_message(&self, body: &str) -> String {
///         serde_json::from_str::<serde_json::Value>(body)
///             .ok()
///             .and_then(|v| v["error"]["message"].as_str().map(String::from))
///             .unwrap_or_else(|| body.to_string())
///     }
///
///     fn is_deleted(&self, response: &HttpResponse) -> bool {
///         response
///             .body()
///             .and_then(|v| v["deleted"].as_bool())
///             .unwrap_or(false)
///     }
/// }
/// ```
pub trait Provider: Send + Sync + 'static {
    /// Turns a raw error body into a display message.
    fn format_error_message(&self, body: &str) -> String;

    /// Decides whether a delete call succeeded.
    fn is_deleted(&self, response: &HttpResponse) -> bool;
}

/// Receives the endpoint template and the error for every dispatch failure
/// that is not an HTTP error status.
pub type ExceptionObserver = Arc<dyn Fn(&str, &CrudError) + Send + Sync>;

/// A provider-bound CRUD client.
///
/// The client owns the provider's [`ClientConfig`], its [`Provider`] hooks,
/// a shared [`Transport`] and a [`CrudLogger`]. It is constructed once and
/// shared between services through `Arc`.
///
/// # Thread Safety
///
/// `CrudClient` is `Send + Sync` when `P` is. It holds no locks; value
/// providers are read on every request.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use crud_client::clients::{HttpResponse, ReqwestTransport};
/// use crud_client::config::{ClientConfig, FixedValue, ParamDescriptor};
/// use crud_client::rest::{CrudClient, Provider};
///
/// struct Ollama;
///
/// impl Provider for Ollama {
///     fn format_error_message(&self, body: &str) -> String {
///         body.to_string()
///     }
///     fn is_deleted(&self, response: &HttpResponse) -> bool {
///         response.is_success()
///     }
/// }
///
/// let config = ClientConfig::builder()
///     .name("Ollama")
///     .base_url("http://localhost:11434/api")
///     .api_key(ParamDescriptor::header(FixedValue::new("local")))
///     .build()
///     .unwrap();
///
/// let transport = Arc::new(ReqwestTransport::new().unwrap());
/// let client = CrudClient::new(config, Ollama, transport)
///     .on_exception(|endpoint, error| eprintln!("{endpoint}: {error}"))
///     .into_shared();
///
/// assert_eq!(client.api_key().expose(), "local");
/// ```
pub struct CrudClient<P> {
    config: ClientConfig,
    provider: P,
    transport: Arc<dyn Transport>,
    logger: CrudLogger,
    on_exception: Option<ExceptionObserver>,
}

impl<P: Provider> CrudClient<P> {
    /// Creates a client from a validated configuration.
    #[must_use]
    pub fn new(config: ClientConfig, provider: P, transport: Arc<dyn Transport>) -> Self {
        let logger = CrudLogger::new(config.name().as_ref());
        Self {
            config,
            provider,
            transport,
            logger,
            on_exception: None,
        }
    }

    /// Creates a client using a new [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the transport cannot be created.
    pub fn with_default_transport(config: ClientConfig, provider: P) -> Result<Self, TransportError> {
        Ok(Self::new(config, provider, Arc::new(ReqwestTransport::new()?)))
    }

    /// Registers the exception observer.
    #[must_use]
    pub fn on_exception(
        mut self,
        observer: impl Fn(&str, &CrudError) + Send + Sync + 'static,
    ) -> Self {
        self.on_exception = Some(Arc::new(observer));
        self
    }

    /// Wraps the client in an `Arc` for sharing with services.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The provider name.
    #[must_use]
    pub const fn name(&self) -> &ProviderName {
        self.config.name()
    }

    /// The base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        self.config.base_url()
    }

    /// The provider hooks.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The logger.
    #[must_use]
    pub const fn logger(&self) -> &CrudLogger {
        &self.logger
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// The current API key, read through its descriptor.
    #[must_use]
    pub fn api_key(&self) -> SecretString {
        self.config.api_key().resolve()
    }

    /// The current API version, read through its descriptor.
    #[must_use]
    pub fn version(&self) -> SecretString {
        self.config.version().resolve()
    }

    /// The current beta version, read through its descriptor.
    #[must_use]
    pub fn beta_version(&self) -> SecretString {
        self.config.beta_version().resolve()
    }

    /// Logs `error` and forwards it to the exception observer.
    pub(crate) fn report(&self, endpoint: &str, error: CrudError) -> CrudError {
        self.logger.exception(endpoint, &error);
        if let Some(observer) = &self.on_exception {
            observer(endpoint, &error);
        }
        error
    }
}

impl<P> fmt::Debug for CrudClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudClient")
            .field("config", &self.config)
            .field("has_exception_observer", &self.on_exception.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpMethod, TransportRequest};
    use crate::config::{FixedValue, ParamDescriptor};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct TestProvider;

    impl Provider for TestProvider {
        fn format_error_message(&self, body: &str) -> String {
            body.to_string()
        }

        fn is_deleted(&self, response: &HttpResponse) -> bool {
            response.is_success()
        }
    }

    struct NoopTransport;

    #[async_trait]
    impl Transport for NoopTransport {
        async fn send(
            &self,
            _method: HttpMethod,
            _request: TransportRequest,
        ) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, Default::default(), String::new()))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::builder()
            .name("OpenAI")
            .base_url("https://api.openai.com/v1")
            .api_key(ParamDescriptor::header(FixedValue::new("sk-test")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_accessors() {
        let client = CrudClient::new(config(), TestProvider, Arc::new(NoopTransport));
        assert_eq!(client.name().as_ref(), "OpenAI");
        assert_eq!(client.base_url().as_ref(), "https://api.openai.com/v1");
        assert_eq!(client.logger().provider(), "OpenAI");
        assert_eq!(client.api_key().expose(), "sk-test");
        assert!(client.version().is_empty());
        assert!(client.beta_version().is_empty());
    }

    #[test]
    fn test_api_key_is_read_live() {
        let key = Arc::new(Mutex::new("first".to_string()));
        let source = Arc::clone(&key);
        let config = ClientConfig::builder()
            .name("OpenAI")
            .base_url("https://api.openai.com/v1")
            .api_key(ParamDescriptor::header(move || source.lock().unwrap().clone()))
            .build()
            .unwrap();
        let client = CrudClient::new(config, TestProvider, Arc::new(NoopTransport));

        assert_eq!(client.api_key().expose(), "first");
        *key.lock().unwrap() = "second".to_string();
        assert_eq!(client.api_key().expose(), "second");
    }

    #[test]
    fn test_report_notifies_observer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let client = CrudClient::new(config(), TestProvider, Arc::new(NoopTransport))
            .on_exception(move |endpoint, _| {
                assert_eq!(endpoint, "files");
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let error = client.report("files", TransportError::Other("down".to_string()).into());
        assert!(matches!(error, CrudError::Transport(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let client = CrudClient::new(config(), TestProvider, Arc::new(NoopTransport));
        let debug = format!("{client:?}");
        assert!(debug.contains("CrudClient"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CrudClient<TestProvider>>();
    }
}
