//! Structured per-verb logging.
//!
//! [`CrudLogger`] wraps [`tracing`] and tags every event with the provider
//! name. Dispatch events also carry the verb and the endpoint URL. Header
//! values are never logged, and the dispatcher masks a query-placed API key
//! before the URL reaches the logger.

use crate::rest::dispatch::CrudVerb;
use crate::rest::errors::{CrudError, ParamError};

/// Logger bound to one provider.
#[derive(Debug, Clone)]
pub struct CrudLogger {
    provider: String,
}

impl CrudLogger {
    /// Creates a logger for `provider`.
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }

    /// The provider name attached to every event.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Logs at info level.
    pub fn info(&self, message: &str) {
        tracing::info!(provider = %self.provider, "{message}");
    }

    /// Logs at warn level.
    pub fn warning(&self, message: &str) {
        tracing::warn!(provider = %self.provider, "{message}");
    }

    /// Logs at error level.
    pub fn error(&self, message: &str) {
        tracing::error!(provider = %self.provider, "{message}");
    }

    pub(crate) fn verb_started(&self, verb: CrudVerb, endpoint: &str) {
        tracing::info!(
            provider = %self.provider,
            verb = verb.as_str(),
            endpoint,
            "{} {verb} request started",
            self.provider
        );
    }

    pub(crate) fn verb_failed(&self, verb: CrudVerb, endpoint: &str, status: u16, message: &str) {
        tracing::error!(
            provider = %self.provider,
            verb = verb.as_str(),
            endpoint,
            status,
            "{} {verb} request failed: {message}",
            self.provider
        );
    }

    pub(crate) fn param_error(&self, error: &ParamError) {
        tracing::error!(
            provider = %self.provider,
            error = %error,
            "Failed to configure request parameters; sending request without them"
        );
    }

    pub(crate) fn exception(&self, endpoint: &str, error: &CrudError) {
        tracing::error!(
            provider = %self.provider,
            endpoint,
            error = %error,
            "{} request to {endpoint} failed",
            self.provider
        );
    }
}
