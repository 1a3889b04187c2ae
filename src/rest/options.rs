//! Per-call request options.
//!
//! [`RequestOptions`] carries the retry policy values, timeout, body content
//! type, streaming and cancellation settings for one dispatch call. The retry
//! values are carried for transports and callers that implement a retry loop;
//! the dispatcher itself sends each request once.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use crud_client::clients::MimeType;
//! use crud_client::rest::RequestOptions;
//!
//! let options = RequestOptions::builder().build();
//! assert_eq!(options.max_retry(), 3);
//! assert!((options.retry_delay_sec() - 1.0).abs() < f64::EPSILON);
//! assert_eq!(options.mime_type(), MimeType::Json);
//!
//! let options = RequestOptions::builder()
//!     .max_retry(0)
//!     .timeout(Duration::from_secs(30))
//!     .ignore_logs(true)
//!     .build();
//! assert_eq!(options.timeout(), Some(Duration::from_secs(30)));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::clients::MimeType;

/// Default maximum number of retries.
pub const DEFAULT_MAX_RETRY: u32 = 3;

/// Default delay between retries, in seconds.
pub const DEFAULT_RETRY_DELAY_SEC: f64 = 1.0;

/// Receives streamed response chunks in arrival order.
pub type StreamHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// A cooperative cancellation signal shared between a caller and a request.
///
/// Clones share state: cancelling any clone cancels them all.
///
/// # Example
///
/// ```rust
/// use crud_client::rest::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes when the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Options for a single dispatch call.
///
/// Build with [`RequestOptions::builder`]; `RequestOptions::default()` is the
/// same as an empty builder.
#[derive(Clone)]
pub struct RequestOptions {
    max_retry: u32,
    retry_delay_sec: f64,
    timeout: Option<Duration>,
    mime_type: MimeType,
    ignore_logs: bool,
    cancellation: Option<CancellationToken>,
    stream_handler: Option<StreamHandler>,
    output_path: Option<PathBuf>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            max_retry: DEFAULT_MAX_RETRY,
            retry_delay_sec: DEFAULT_RETRY_DELAY_SEC,
            timeout: None,
            mime_type: MimeType::Json,
            ignore_logs: false,
            cancellation: None,
            stream_handler: None,
            output_path: None,
        }
    }
}

impl RequestOptions {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    /// Maximum number of retries.
    #[must_use]
    pub const fn max_retry(&self) -> u32 {
        self.max_retry
    }

    /// Delay between retries, in seconds.
    #[must_use]
    pub const fn retry_delay_sec(&self) -> f64 {
        self.retry_delay_sec
    }

    /// Delay between retries.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_sec)
    }

    /// Request timeout; `None` uses the transport default.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Body content type.
    #[must_use]
    pub const fn mime_type(&self) -> MimeType {
        self.mime_type
    }

    /// Whether dispatch logging is suppressed.
    #[must_use]
    pub const fn ignore_logs(&self) -> bool {
        self.ignore_logs
    }

    /// The cancellation token, if any.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// The stream handler, if any.
    #[must_use]
    pub const fn stream_handler(&self) -> Option<&StreamHandler> {
        self.stream_handler.as_ref()
    }

    /// Returns `true` if a stream handler is set.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.stream_handler.is_some()
    }

    /// The output path, if any.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub(crate) fn take_cancellation(&mut self) -> Option<CancellationToken> {
        self.cancellation.take()
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("max_retry", &self.max_retry)
            .field("retry_delay_sec", &self.retry_delay_sec)
            .field("timeout", &self.timeout)
            .field("mime_type", &self.mime_type)
            .field("ignore_logs", &self.ignore_logs)
            .field("cancellation", &self.cancellation)
            .field("streaming", &self.stream_handler.is_some())
            .field("output_path", &self.output_path)
            .finish()
    }
}

/// Fluent builder for [`RequestOptions`].
#[derive(Default)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
}

impl RequestOptionsBuilder {
    /// Sets the maximum number of retries.
    #[must_use]
    pub const fn max_retry(mut self, max_retry: u32) -> Self {
        self.options.max_retry = max_retry;
        self
    }

    /// Sets the retry delay in seconds. Negative or non-finite values are
    /// clamped to zero.
    #[must_use]
    pub fn retry_delay_sec(mut self, seconds: f64) -> Self {
        self.options.retry_delay_sec = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        };
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Sets the body content type.
    #[must_use]
    pub const fn mime_type(mut self, mime_type: MimeType) -> Self {
        self.options.mime_type = mime_type;
        self
    }

    /// Suppresses dispatch logging for this call.
    #[must_use]
    pub const fn ignore_logs(mut self, ignore: bool) -> Self {
        self.options.ignore_logs = ignore;
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.options.cancellation = Some(token);
        self
    }

    /// Streams response chunks to `handler`.
    #[must_use]
    pub fn stream_handler(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.options.stream_handler = Some(Arc::new(handler));
        self
    }

    /// Writes the raw response body to `path`.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.output_path = Some(path.into());
        self
    }

    /// Builds the options.
    #[must_use]
    pub fn build(self) -> RequestOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_default_builder_values() {
        let options = RequestOptions::builder().build();
        assert_eq!(options.max_retry(), 3);
        assert!((options.retry_delay_sec() - 1.0).abs() < f64::EPSILON);
        assert_eq!(options.mime_type(), MimeType::Json);
        assert_eq!(options.timeout(), None);
        assert!(!options.ignore_logs());
        assert!(options.cancellation().is_none());
        assert!(!options.is_streaming());
        assert!(options.output_path().is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let options = RequestOptions::builder()
            .max_retry(5)
            .retry_delay_sec(2.5)
            .timeout(Duration::from_secs(10))
            .mime_type(MimeType::Form)
            .ignore_logs(true)
            .output_path("out/speech.mp3")
            .build();

        assert_eq!(options.max_retry(), 5);
        assert_eq!(options.retry_delay(), Duration::from_millis(2500));
        assert_eq!(options.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(options.mime_type(), MimeType::Form);
        assert!(options.ignore_logs());
        assert_eq!(options.output_path(), Some(Path::new("out/speech.mp3")));
    }

    #[test]
    fn test_retry_delay_is_clamped() {
        let options = RequestOptions::builder().retry_delay_sec(-1.0).build();
        assert!(options.retry_delay_sec().abs() < f64::EPSILON);

        let options = RequestOptions::builder().retry_delay_sec(f64::NAN).build();
        assert!(options.retry_delay_sec().abs() < f64::EPSILON);
    }

    #[test]
    fn test_stream_handler_is_invoked() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = RequestOptions::builder()
            .stream_handler(move |chunk| sink.lock().unwrap().push(chunk.to_string()))
            .build();

        let handler = options.stream_handler().unwrap();
        handler("data: a");
        handler("data: b");
        assert_eq!(*seen.lock().unwrap(), vec!["data: a", "data: b"]);
    }

    #[test]
    fn test_debug_hides_handler() {
        let options = RequestOptions::builder().stream_handler(|_| {}).build();
        let debug = format!("{options:?}");
        assert!(debug.contains("streaming: true"));
    }

    #[test]
    fn test_cancellation_token_shares_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_completes_after_cancel() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        tokio::task::yield_now().await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("cancelled() did not complete")
            .unwrap();
    }

    #[test]
    fn test_cancelled_returns_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        tokio_test::block_on(token.cancelled());
        assert!(token.is_cancelled());
    }
}
