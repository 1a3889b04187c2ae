//! Shared helpers for dispatcher integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crud_client::clients::{HttpMethod, HttpResponse, Transport, TransportError, TransportRequest};
use crud_client::config::{ClientConfig, ClientConfigBuilder, FixedValue, ParamDescriptor};
use crud_client::rest::{CrudClient, CrudError, Provider};

/// Provider whose errors look like `{"error": {"message": "..."}}`.
pub struct TestProvider;

impl Provider for TestProvider {
    fn format_error_message(&self, body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or_else(|| body.to_string())
    }

    fn is_deleted(&self, response: &HttpResponse) -> bool {
        response
            .body()
            .and_then(|v| v["deleted"].as_bool())
            .unwrap_or(false)
    }
}

/// Transport that records every request and replays queued outcomes.
///
/// With an empty queue it answers `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(HttpMethod, TransportRequest)>>,
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, code: u16, body: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok(response(code, body)));
    }

    pub fn fail(&self, error: TransportError) {
        self.queue.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Returns the method, URL and headers of the last request.
    pub fn last(&self) -> (HttpMethod, String, Vec<(String, String)>) {
        let sent = self.sent.lock().unwrap();
        let (method, request) = sent.last().expect("no request was sent");
        let headers = request
            .headers
            .iter()
            .map(|h| (h.name().to_string(), h.value().to_string()))
            .collect();
        (*method, request.url.clone(), headers)
    }

    pub fn last_request(&self) -> TransportRequest {
        let sent = self.sent.lock().unwrap();
        sent.last().expect("no request was sent").1.clone()
    }

    pub fn last_body(&self) -> Option<serde_json::Value> {
        let sent = self.sent.lock().unwrap();
        sent.last().and_then(|(_, request)| request.body.clone())
    }

    pub fn last_header(&self, name: &str) -> Option<String> {
        let (_, _, headers) = self.last();
        headers
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        method: HttpMethod,
        request: TransportRequest,
    ) -> Result<HttpResponse, TransportError> {
        self.sent.lock().unwrap().push((method, request));
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(response(200, "{}")))
    }
}

pub fn response(code: u16, body: &str) -> HttpResponse {
    let mut headers = HashMap::new();
    headers.insert("x-request-id".to_string(), vec!["req_123".to_string()]);
    HttpResponse::new(code, headers, body.to_string())
}

/// A builder with a name, base URL and bearer API key.
pub fn config_builder() -> ClientConfigBuilder {
    ClientConfig::builder()
        .name("TestAI")
        .base_url("https://api.test.ai/v1")
        .api_key(ParamDescriptor::header(FixedValue::new("sk-test")))
}

pub fn client_with(
    config: ClientConfig,
    transport: &Arc<RecordingTransport>,
) -> Arc<CrudClient<TestProvider>> {
    let transport: Arc<dyn Transport> = transport.clone();
    CrudClient::new(config, TestProvider, transport).into_shared()
}

/// A client whose exception observer records every call.
pub fn observed_client(
    config: ClientConfig,
    transport: &Arc<RecordingTransport>,
) -> (Arc<CrudClient<TestProvider>>, Arc<ObserverLog>) {
    let log = Arc::new(ObserverLog::default());
    let sink = Arc::clone(&log);
    let transport: Arc<dyn Transport> = transport.clone();
    let client = CrudClient::new(config, TestProvider, transport)
        .on_exception(move |endpoint, error| sink.record(endpoint, error))
        .into_shared();
    (client, log)
}

#[derive(Default)]
pub struct ObserverLog {
    count: AtomicUsize,
    endpoints: Mutex<Vec<String>>,
    messages: Mutex<Vec<String>>,
}

impl ObserverLog {
    fn record(&self, endpoint: &str, error: &CrudError) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().unwrap().push(endpoint.to_string());
        self.messages.lock().unwrap().push(error.to_string());
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}
