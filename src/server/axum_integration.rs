//! Axum integration: ready-made HTTP routes for an agent.
//!
//! [`a2a_router`] mounts, under the configured agent path `{p}`:
//!
//! | Route | Binding |
//! |-------|---------|
//! | `GET  {p}{card_path}` | card discovery (default `/.well-known/agent-card.json`) |
//! | `GET  {p}/v1/card` | card discovery, alternate path |
//! | `POST {p}/v1/message:send` | REST unary exchange |
//! | `POST {p}/v1/message:stream` | REST streaming exchange (SSE) |
//! | `POST {p}` (or `/`) | JSON-RPC 2.0: `message/send`, `message/stream` |
//!
//! Every request gets its own [`CancellationToken`]. A [`DropGuard`] for it
//! lives in the handler future, or in the SSE body once streaming starts, so
//! a client that disconnects cancels the work it started.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a2a_bridge::server::{a2a_router, ResponderAdapter, ServerConfig, TaskManager};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = Arc::new(TaskManager::with_adapter(Arc::new(ResponderAdapter::echo())));
//! let app = a2a_router(manager, ServerConfig::default().with_agent_path("/echo"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::stream::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, warn};

use crate::error::{self, A2AError};
use crate::types::{JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse, Message, SendMessageParams, TextDelta};
use crate::utils::constants::{
    CARD_PATH, MESSAGE_SEND_PATH, MESSAGE_STREAM_PATH, METHOD_MESSAGE_SEND, METHOD_MESSAGE_STREAM,
    SSE_EVENT_DELTA, SSE_EVENT_DONE, SSE_EVENT_ERROR,
};

use super::config::ServerConfig;
use super::delta_channel::DeltaReceiver;
use super::task_manager::TaskManager;

/// Shared state for the axum routes.
struct AppState {
    manager: Arc<TaskManager>,
    config: ServerConfig,
}

/// Create an axum Router serving the agent attached to `manager`.
pub fn a2a_router(manager: Arc<TaskManager>, config: ServerConfig) -> Router {
    let prefix = config.agent_path.clone();
    let card_route = format!("{prefix}{}", config.card_path);
    let alt_card_route = format!("{prefix}{CARD_PATH}");
    let rpc_route = if prefix.is_empty() {
        "/".to_string()
    } else {
        prefix.clone()
    };

    let state = Arc::new(AppState { manager, config });

    let mut router = Router::new().route(&card_route, get(handle_agent_card));
    if alt_card_route != card_route {
        router = router.route(&alt_card_route, get(handle_agent_card));
    }
    router
        .route(&format!("{prefix}{MESSAGE_SEND_PATH}"), post(handle_message_send))
        .route(
            &format!("{prefix}{MESSAGE_STREAM_PATH}"),
            post(handle_message_stream),
        )
        .route(&rpc_route, post(handle_jsonrpc))
        .with_state(state)
}

/// A fresh token plus the guard that cancels it when dropped.
fn request_token() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    (token.clone(), token.drop_guard())
}

/// Base URL of the agent as the caller sees it.
fn self_url(config: &ServerConfig, headers: &HeaderMap) -> String {
    match &config.public_url {
        Some(url) => format!("{url}{}", config.agent_path),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}{}", config.agent_path)
        }
    }
}

/// HTTP status of a REST error response.
fn status_for(err: &A2AError) -> StatusCode {
    match err {
        A2AError::ParseError { .. }
        | A2AError::InvalidRequest { .. }
        | A2AError::InvalidParams { .. }
        | A2AError::EmptyMessage { .. } => StatusCode::BAD_REQUEST,
        A2AError::NotFound { .. } | A2AError::MethodNotFound { .. } => StatusCode::NOT_FOUND,
        // 499: client closed request.
        A2AError::Cancelled { .. } => {
            StatusCode::from_u16(499).unwrap_or(StatusCode::REQUEST_TIMEOUT)
        }
        A2AError::ResponderFailure { .. } => StatusCode::BAD_GATEWAY,
        A2AError::NotAttached { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// REST error body: `{code, message, data?}`.
fn error_response(err: A2AError) -> Response {
    let status = status_for(&err);
    let body: JsonRpcError = err.into();
    (status, Json(body)).into_response()
}

/// Parse `SendMessageParams` from a request body or JSON-RPC params.
fn parse_send_message_params(params: Value) -> Result<SendMessageParams, String> {
    let obj = params.as_object().ok_or("params must be an object")?;

    let message: Message = serde_json::from_value(
        obj.get("message")
            .cloned()
            .ok_or("missing 'message' field")?,
    )
    .map_err(|e| format!("invalid message: {}", e))?;

    let metadata = obj
        .get("metadata")
        .and_then(|v| if v.is_null() { None } else { Some(v.clone()) });

    Ok(SendMessageParams { message, metadata })
}

fn parse_body(body: &Bytes) -> Result<SendMessageParams, A2AError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| A2AError::parse_error(format!("invalid JSON body: {e}")))?;
    parse_send_message_params(value).map_err(A2AError::invalid_params)
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

async fn handle_agent_card(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (cancel, _guard) = request_token();
    let url = self_url(&state.config, &headers);
    match state.manager.agent_card(&url, cancel).await {
        Ok(card) => Json(card).into_response(),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// REST binding
// ---------------------------------------------------------------------------

async fn handle_message_send(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = match parse_body(&body) {
        Ok(p) => p,
        Err(e) => return error_response(e),
    };

    let (cancel, _guard) = request_token();
    match state.manager.send_message(params, cancel).await {
        Ok(message) => Json(message).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_message_stream(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = match parse_body(&body) {
        Ok(p) => p,
        Err(e) => return error_response(e),
    };

    let (cancel, guard) = request_token();
    match state.manager.send_message_stream(params, cancel).await {
        Ok(rx) => {
            let stream = make_sse_stream(rx, guard, Framing::Rest);
            Sse::new(stream)
                .keep_alive(KeepAlive::new().interval(state.config.keep_alive))
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC binding
// ---------------------------------------------------------------------------

/// Main JSON-RPC dispatch handler.
///
/// Errors are reported inside the JSON-RPC envelope with HTTP 200.
async fn handle_jsonrpc(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return Json(JsonRpcResponse::from_a2a_error(
                None,
                A2AError::parse_error(e.to_string()),
            ))
            .into_response();
        }
    };

    if request.jsonrpc != "2.0" {
        return Json(JsonRpcResponse::from_a2a_error(
            request.id,
            A2AError::invalid_request("Invalid JSON-RPC version, must be \"2.0\""),
        ))
        .into_response();
    }

    debug!(method = %request.method, "JSON-RPC request received");

    match request.method.as_str() {
        METHOD_MESSAGE_SEND => rpc_message_send(state, request).await,
        METHOD_MESSAGE_STREAM => rpc_message_stream(state, &headers, request).await,
        method => {
            warn!(method = %method, "Unknown JSON-RPC method");
            Json(JsonRpcResponse::from_a2a_error(
                request.id,
                A2AError::method_not_found(format!("Method not found: {}", method)),
            ))
            .into_response()
        }
    }
}

fn rpc_params(request: &mut JsonRpcRequest) -> Result<SendMessageParams, Response> {
    let params = request.params.take().unwrap_or(Value::Null);
    parse_send_message_params(params).map_err(|e| {
        Json(JsonRpcResponse::error(
            request.id.clone(),
            JsonRpcError {
                code: error::INVALID_PARAMS,
                message: format!("Invalid params: {}", e),
                data: None,
            },
        ))
        .into_response()
    })
}

async fn rpc_message_send(state: Arc<AppState>, mut request: JsonRpcRequest) -> Response {
    let params = match rpc_params(&mut request) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let (cancel, _guard) = request_token();
    match state.manager.send_message(params, cancel).await {
        Ok(message) => match serde_json::to_value(&message) {
            Ok(v) => Json(JsonRpcResponse::success(request.id, v)).into_response(),
            Err(e) => {
                error!(error = %e, "Failed to serialize response");
                Json(JsonRpcResponse::from_a2a_error(
                    request.id,
                    A2AError::internal_error(e.to_string()),
                ))
                .into_response()
            }
        },
        Err(e) => Json(JsonRpcResponse::from_a2a_error(request.id, e)).into_response(),
    }
}

/// `message/stream` is refused unless the served card advertises streaming.
async fn rpc_message_stream(
    state: Arc<AppState>,
    headers: &HeaderMap,
    mut request: JsonRpcRequest,
) -> Response {
    let (cancel, guard) = request_token();

    let url = self_url(&state.config, headers);
    match state.manager.agent_card(&url, cancel.clone()).await {
        Ok(card) if card.supports_streaming() => {}
        Ok(_) => {
            return Json(JsonRpcResponse::from_a2a_error(
                request.id,
                A2AError::unsupported_operation("Streaming is not supported by the agent"),
            ))
            .into_response();
        }
        Err(e) => return Json(JsonRpcResponse::from_a2a_error(request.id, e)).into_response(),
    }

    let params = match rpc_params(&mut request) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match state.manager.send_message_stream(params, cancel).await {
        Ok(rx) => {
            let stream = make_sse_stream(rx, guard, Framing::JsonRpc(request.id));
            Sse::new(stream)
                .keep_alive(KeepAlive::new().interval(state.config.keep_alive))
                .into_response()
        }
        Err(e) => Json(JsonRpcResponse::from_a2a_error(request.id, e)).into_response(),
    }
}

// ---------------------------------------------------------------------------
// SSE streaming
// ---------------------------------------------------------------------------

/// How delta and error frames are encoded.
enum Framing {
    /// Bare `TextDelta` / `{code, message}` payloads.
    Rest,
    /// Every payload wrapped in a JSON-RPC response envelope.
    JsonRpc(Option<JsonRpcId>),
}

impl Framing {
    fn delta_event(&self, delta: &TextDelta) -> Result<Event, serde_json::Error> {
        let data = match self {
            Framing::Rest => serde_json::to_string(delta)?,
            Framing::JsonRpc(id) => serde_json::to_string(&JsonRpcResponse::success(
                id.clone(),
                serde_json::to_value(delta)?,
            ))?,
        };
        Ok(Event::default().event(SSE_EVENT_DELTA).data(data))
    }

    fn error_event(&self, err: A2AError) -> Event {
        let rpc_err: JsonRpcError = err.into();
        let data = match self {
            Framing::Rest => serde_json::to_string(&rpc_err),
            Framing::JsonRpc(id) => {
                serde_json::to_string(&JsonRpcResponse::error(id.clone(), rpc_err))
            }
        };
        let data = data.unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialize SSE error frame");
            format!(r#"{{"code":{},"message":"internal error"}}"#, error::INTERNAL_ERROR)
        });
        Event::default().event(SSE_EVENT_ERROR).data(data)
    }
}

/// Turn a delta receiver into SSE frames.
///
/// Deltas become `delta` frames in order. An error becomes one `error` frame
/// and ends the stream; a clean end is marked by a `done` frame. Dropping the
/// returned stream drops `guard`, which cancels the request.
fn make_sse_stream(
    mut rx: DeltaReceiver,
    guard: DropGuard,
    framing: Framing,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let _guard = guard;
        while let Some(item) = rx.next().await {
            match item {
                Ok(delta) => match framing.delta_event(&delta) {
                    Ok(event) => yield Ok(event),
                    Err(e) => error!(error = %e, "Failed to serialize SSE delta"),
                },
                Err(err) => {
                    yield Ok(framing.error_event(err));
                    return;
                }
            }
        }
        yield Ok(Event::default().event(SSE_EVENT_DONE).data(""));
    }
}
