//! Transport layer for A2A client communication.
//!
//! Provides the `Transport` trait for abstracting over the two protocol
//! bindings a server exposes: [`HttpJsonTransport`] for the REST binding
//! (`/v1/message:send`, `/v1/message:stream`) and [`JsonRpcTransport`] for the
//! JSON-RPC 2.0 binding.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::error::{A2AError, A2AResult};
use crate::types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Message, SendMessageParams};
use crate::utils::constants::{
    MESSAGE_SEND_PATH, MESSAGE_STREAM_PATH, METHOD_MESSAGE_SEND, METHOD_MESSAGE_STREAM,
};

use super::sse::DeltaStream;

/// Transport abstraction for A2A communication.
///
/// Implementations handle the wire details of one binding and report
/// failures as typed [`A2AError`]s: server-reported errors keep their kind
/// (see [`A2AError::from_rpc_error`]), connection problems become
/// `Transport`/`Timeout`/`Http`, undecodable bodies become `Protocol`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message and wait for the single reply.
    async fn send_message(&self, params: &SendMessageParams) -> A2AResult<Message>;

    /// Send a message and receive the reply as a stream of text deltas.
    async fn send_message_stream(&self, params: &SendMessageParams) -> A2AResult<DeltaStream>;

    /// Close the transport and release any held resources.
    ///
    /// The default implementation is a no-op.
    async fn close(&self) -> A2AResult<()> {
        Ok(())
    }
}

/// Configuration shared by the HTTP transports.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout. Defaults to 60 seconds.
    ///
    /// Bounds a unary exchange from connect to the last body byte. For a
    /// streaming exchange it bounds only the wait for the response headers;
    /// an open stream is never cut off by it.
    pub timeout: Duration,
    /// Additional HTTP headers to include on every request.
    pub headers: HashMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            headers: HashMap::new(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` honouring this configuration.
    ///
    /// The client carries no total timeout; transports apply
    /// [`timeout`](Self::timeout) per request.
    pub(crate) fn build_client(&self) -> reqwest::Client {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &self.headers {
            if let (Ok(name), Ok(val)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                default_headers.insert(name, val);
            }
        }

        reqwest::Client::builder()
            .connect_timeout(self.timeout)
            .default_headers(default_headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}

// ---------------------------------------------------------------------------
// Shared HTTP plumbing
// ---------------------------------------------------------------------------

/// POST `body` as JSON.
///
/// With `timeout` set, a unary request is bounded end to end while a
/// streaming request is bounded only until its response headers arrive.
async fn post_json(
    client: &reqwest::Client,
    url: &str,
    body: &impl Serialize,
    streaming: bool,
    timeout: Option<Duration>,
) -> A2AResult<reqwest::Response> {
    let body = serde_json::to_vec(body)
        .map_err(|e| A2AError::Other(format!("failed to serialize request: {e}")))?;

    let mut request = client
        .post(url)
        .header("Content-Type", "application/json")
        .body(body);
    if streaming {
        request = request.header("Accept", "text/event-stream");
    }

    tracing::debug!(url, streaming, "sending request");

    let sent = match timeout {
        Some(limit) if streaming => tokio::time::timeout(limit, request.send())
            .await
            .map_err(|_| {
                A2AError::Timeout(format!("no response from {url} within {limit:?}"))
            })?,
        Some(limit) => request.timeout(limit).send().await,
        None => request.send().await,
    };

    sent.map_err(|e| {
        if e.is_timeout() {
            A2AError::Timeout(format!("request to {url} timed out: {e}"))
        } else if e.is_connect() {
            A2AError::Transport(format!("connection to {url} failed: {e}"))
        } else {
            A2AError::Transport(format!("HTTP request to {url} failed: {e}"))
        }
    })
}

/// Turn a non-2xx response into an error, keeping the server's error kind
/// when the body carries one.
async fn error_from_response(response: reqwest::Response) -> A2AError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    if let Ok(rpc_err) = serde_json::from_str::<JsonRpcError>(&body) {
        return A2AError::from_rpc_error(rpc_err);
    }
    if let Ok(JsonRpcResponse {
        error: Some(rpc_err),
        ..
    }) = serde_json::from_str::<JsonRpcResponse>(&body)
    {
        return A2AError::from_rpc_error(rpc_err);
    }
    if status == 404 {
        return A2AError::not_found(format!("endpoint not found (HTTP 404): {body}"));
    }
    A2AError::Http { status, body }
}

/// Read the whole body and decode it as `T`.
async fn decode_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> A2AResult<T> {
    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            A2AError::Timeout(format!("timed out reading response body: {e}"))
        } else {
            A2AError::Transport(format!("failed to read response body: {e}"))
        }
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| A2AError::Protocol(format!("failed to parse {what}: {e}")))
}

fn is_event_stream(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/event-stream"))
}

// ---------------------------------------------------------------------------
// REST binding
// ---------------------------------------------------------------------------

/// REST (HTTP+JSON) transport using `reqwest`.
///
/// Posts `SendMessageParams` to `{url}/v1/message:send` and
/// `{url}/v1/message:stream`. Error bodies are `{code, message, data?}`.
///
/// # Example
///
/// ```no_run
/// use a2a_bridge::client::HttpJsonTransport;
///
/// let transport = HttpJsonTransport::new("http://localhost:5001/echo");
/// ```
#[derive(Debug, Clone)]
pub struct HttpJsonTransport {
    client: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl HttpJsonTransport {
    /// Create a new transport targeting the agent's base URL.
    ///
    /// Uses default configuration (60s timeout, no extra headers).
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(url, TransportConfig::default())
    }

    /// Create a new transport with custom configuration.
    pub fn with_config(url: impl Into<String>, config: TransportConfig) -> Self {
        let mut transport = Self::with_client(url, config.build_client());
        transport.timeout = Some(config.timeout);
        transport
    }

    /// Create a new transport with an existing `reqwest::Client`.
    ///
    /// Timeouts are left to the client's own settings.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        let url: String = url.into();
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// The agent base URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpJsonTransport {
    async fn send_message(&self, params: &SendMessageParams) -> A2AResult<Message> {
        let url = format!("{}{}", self.url, MESSAGE_SEND_PATH);
        let response = post_json(&self.client, &url, params, false, self.timeout).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        decode_body(response, "reply message").await
    }

    async fn send_message_stream(&self, params: &SendMessageParams) -> A2AResult<DeltaStream> {
        let url = format!("{}{}", self.url, MESSAGE_STREAM_PATH);
        let response = post_json(&self.client, &url, params, true, self.timeout).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(DeltaStream::from_response(response))
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC binding
// ---------------------------------------------------------------------------

/// JSON-RPC over HTTP transport using `reqwest`.
///
/// Sends POST requests with `Content-Type: application/json` to the agent URL
/// and parses the response as a JSON-RPC result or error. For
/// `message/stream`, the response is interpreted as an SSE event stream of
/// JSON-RPC envelopes.
///
/// # Example
///
/// ```no_run
/// use a2a_bridge::client::JsonRpcTransport;
///
/// let transport = JsonRpcTransport::new("http://localhost:5001/echo");
/// ```
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    client: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl JsonRpcTransport {
    /// Create a new transport targeting the given A2A endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(url, TransportConfig::default())
    }

    /// Create a new transport with custom configuration.
    pub fn with_config(url: impl Into<String>, config: TransportConfig) -> Self {
        let mut transport = Self::with_client(url, config.build_client());
        transport.timeout = Some(config.timeout);
        transport
    }

    /// Create a new transport with an existing `reqwest::Client`.
    ///
    /// Timeouts are left to the client's own settings.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: None,
        }
    }

    /// Returns the URL this transport sends requests to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn send_message(&self, params: &SendMessageParams) -> A2AResult<Message> {
        let request = build_request(METHOD_MESSAGE_SEND, params)?;
        let response = post_json(&self.client, &self.url, &request, false, self.timeout).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let rpc_response: JsonRpcResponse = decode_body(response, "JSON-RPC response").await?;
        parse_result(rpc_response)
    }

    async fn send_message_stream(&self, params: &SendMessageParams) -> A2AResult<DeltaStream> {
        let request = build_request(METHOD_MESSAGE_STREAM, params)?;
        let response = post_json(&self.client, &self.url, &request, true, self.timeout).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // Errors raised before streaming starts come back as a plain
        // JSON-RPC response.
        if !is_event_stream(&response) {
            let rpc_response: JsonRpcResponse =
                decode_body(response, "JSON-RPC response").await?;
            return Err(match rpc_response.error {
                Some(rpc_err) => A2AError::from_rpc_error(rpc_err),
                None => A2AError::Protocol(
                    "expected an event stream for message/stream".to_string(),
                ),
            });
        }

        Ok(DeltaStream::from_response(response))
    }
}

fn build_request(method: &str, params: &impl Serialize) -> A2AResult<JsonRpcRequest> {
    let params_value = serde_json::to_value(params)
        .map_err(|e| A2AError::Other(format!("failed to serialize request params: {e}")))?;

    Ok(JsonRpcRequest::new(
        uuid::Uuid::new_v4().to_string(),
        method,
        Some(params_value),
    ))
}

/// Parse the `result` field from a JSON-RPC response into the expected type.
fn parse_result<T: serde::de::DeserializeOwned>(response: JsonRpcResponse) -> A2AResult<T> {
    if let Some(error) = response.error {
        return Err(A2AError::from_rpc_error(error));
    }

    let result = response.result.ok_or_else(|| {
        A2AError::Protocol("JSON-RPC response has neither 'result' nor 'error'".to_string())
    })?;

    serde_json::from_value(result)
        .map_err(|e| A2AError::Protocol(format!("failed to deserialize response result: {e}")))
}
