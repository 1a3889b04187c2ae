//! Default reqwest-backed transport.
//!
//! This module provides [`ReqwestTransport`], which sends a single attempt of
//! a [`TransportRequest`] over HTTPS. Neither the transport nor the dispatcher
//! retries; `max_retry` and `retry_delay_sec` are carried on the request
//! options for callers that implement their own retry loop.
//!
//! Errors never carry the query string of the request URL, since query-placed
//! API keys travel there.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::clients::errors::TransportError;
use crate::clients::http_request::{HttpMethod, MimeType, TransportRequest};
use crate::clients::http_response::HttpResponse;
use crate::clients::transport::Transport;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP transport built on [`reqwest`].
///
/// The transport handles:
/// - Default `User-Agent` and `Accept` headers
/// - Body encoding per [`MimeType`]
/// - Per-request timeouts and cancellation
/// - Streaming chunks to a handler, or writing the body to a file
///
/// # Thread Safety
///
/// `ReqwestTransport` is `Send + Sync`; the inner client pools connections
/// and should be shared.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use crud_client::clients::{ReqwestTransport, Transport};
///
/// let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    user_agent: String,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with a rustls-backed client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self::with_client(client))
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        Self {
            client,
            user_agent: format!("crud-client v{SDK_VERSION} | Rust {rust_version}"),
        }
    }

    /// Prepends `prefix` to the `User-Agent` header.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: &str) -> Self {
        self.user_agent = format!("{prefix} | {}", self.user_agent);
        self
    }

    /// Returns the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn exchange(
        &self,
        method: HttpMethod,
        request: &TransportRequest,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(method.as_reqwest(), &request.url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json");

        for header in &request.headers {
            builder = builder.header(header.name(), header.value());
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = match request.mime_type {
                MimeType::Json => builder
                    .header(CONTENT_TYPE, MimeType::Json.as_content_type())
                    .body(body.to_string()),
                MimeType::Form => builder.form(body),
                MimeType::Text => builder
                    .header(CONTENT_TYPE, MimeType::Text.as_content_type())
                    .body(body.as_str().map_or_else(|| body.to_string(), str::to_string)),
            };
        }

        let mut res = builder
            .send()
            .await
            .map_err(|e| Self::classify(e, request))?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let success = res.status().is_success();

        let body_text = match (&request.output_path, &request.stream_handler) {
            (Some(path), _) if success => {
                let bytes = res.bytes().await.map_err(|e| Self::classify(e, request))?;
                Self::write_output(path, &bytes).await?;
                serde_json::Value::String(path.display().to_string()).to_string()
            }
            (_, Some(handler)) if success => {
                let mut decoder = StreamDecoder::default();
                let mut body = String::new();
                while let Some(chunk) = res.chunk().await.map_err(|e| Self::classify(e, request))? {
                    let text = decoder.push(&chunk);
                    if !text.is_empty() {
                        handler(&text);
                        body.push_str(&text);
                    }
                }
                let tail = decoder.finish();
                if !tail.is_empty() {
                    handler(&tail);
                    body.push_str(&tail);
                }
                body
            }
            _ => res.text().await.map_err(|e| Self::classify(e, request))?,
        };

        Ok(HttpResponse::new(code, headers, body_text))
    }

    async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), TransportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TransportError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| TransportError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn classify(mut error: reqwest::Error, request: &TransportRequest) -> TransportError {
        match request.timeout {
            Some(timeout) if error.is_timeout() => TransportError::Timeout {
                url: request.display_url().to_string(),
                timeout,
            },
            _ => {
                if let Some(url) = error.url_mut() {
                    url.set_query(None);
                    url.set_fragment(None);
                }
                TransportError::Network(error)
            }
        }
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

/// Decodes a chunked byte stream as UTF-8 without splitting a multi-byte
/// character across two chunks.
#[derive(Debug, Default)]
struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    /// Returns the text for every complete character received so far.
    ///
    /// An incomplete sequence at the end is held until the next chunk.
    /// Invalid bytes become `U+FFFD`.
    fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut complete = 0;
        loop {
            match std::str::from_utf8(&self.pending[complete..]) {
                Ok(_) => {
                    complete = self.pending.len();
                    break;
                }
                Err(e) => match e.error_len() {
                    Some(invalid) => complete += e.valid_up_to() + invalid,
                    None => {
                        complete += e.valid_up_to();
                        break;
                    }
                },
            }
        }

        let text = String::from_utf8_lossy(&self.pending[..complete]).into_owned();
        self.pending.drain(..complete);
        text
    }

    /// Flushes whatever is left; a truncated sequence becomes `U+FFFD`.
    fn finish(self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: HttpMethod,
        request: TransportRequest,
    ) -> Result<HttpResponse, TransportError> {
        request.verify(method)?;

        let Some(token) = request.cancellation.clone() else {
            return self.exchange(method, &request).await;
        };

        if token.is_cancelled() {
            return Err(TransportError::Cancelled {
                url: request.display_url().to_string(),
            });
        }

        tokio::select! {
            biased;
            () = token.cancelled() => Err(TransportError::Cancelled {
                url: request.display_url().to_string(),
            }),
            result = self.exchange(method, &request) => result,
        }
    }
}
