//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use a2a_bridge::builders::AgentCardBuilder;
use a2a_bridge::server::{a2a_router, BoxError, Responder, ResponderAdapter, ServerConfig, TaskManager};
use a2a_bridge::types::{AgentCard, Message, SendMessageParams};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};

/// Agent path every test server is mounted under.
pub const AGENT_PATH: &str = "/echo";

/// Replays a fixed list of increments and counts invocations.
pub struct ScriptedResponder {
    increments: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedResponder {
    pub fn new(increments: &[&str]) -> Self {
        Self {
            increments: increments.iter().map(|s| s.to_string()).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared invocation counter, readable after the responder is attached.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    fn respond_stream(&self, _question: String) -> BoxStream<'static, Result<String, BoxError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<String, BoxError>> =
            self.increments.iter().cloned().map(Ok).collect();
        futures::stream::iter(items).boxed()
    }
}

/// Yields `partial` and then fails with `error`.
pub struct FailingResponder {
    pub partial: &'static str,
    pub error: &'static str,
}

#[async_trait]
impl Responder for FailingResponder {
    fn respond_stream(&self, _question: String) -> BoxStream<'static, Result<String, BoxError>> {
        futures::stream::iter(vec![
            Ok(self.partial.to_string()),
            Err::<String, BoxError>(self.error.into()),
        ])
        .boxed()
    }
}

/// Yields `partial` and then panics.
pub struct PanickingResponder {
    pub partial: &'static str,
}

#[async_trait]
impl Responder for PanickingResponder {
    fn respond_stream(&self, _question: String) -> BoxStream<'static, Result<String, BoxError>> {
        let partial = self.partial;
        futures::stream::iter([true, false])
            .map(move |first| -> Result<String, BoxError> {
                if !first {
                    panic!("responder crashed");
                }
                Ok(partial.to_string())
            })
            .boxed()
    }
}

/// Yields `"p0 "`, `"p1 "`, ... with `gap` before each piece.
pub struct PacedResponder {
    pub pieces: usize,
    pub gap: Duration,
}

#[async_trait]
impl Responder for PacedResponder {
    fn respond_stream(&self, _question: String) -> BoxStream<'static, Result<String, BoxError>> {
        let gap = self.gap;
        futures::stream::iter(0..self.pieces)
            .then(move |i| async move {
                tokio::time::sleep(gap).await;
                Ok::<String, BoxError>(format!("p{i} "))
            })
            .boxed()
    }
}

/// Sets its flag when dropped.
struct StopFlag(Arc<AtomicBool>);

impl Drop for StopFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Produces `"tick "` every 10ms forever; `stopped` flips once the producer
/// stream is dropped.
pub struct EndlessResponder {
    pub stopped: Arc<AtomicBool>,
}

impl EndlessResponder {
    pub fn new() -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Responder for EndlessResponder {
    fn respond_stream(&self, _question: String) -> BoxStream<'static, Result<String, BoxError>> {
        let flag = StopFlag(self.stopped.clone());
        futures::stream::unfold(flag, |flag| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Some((Ok::<String, BoxError>("tick ".to_string()), flag))
        })
        .boxed()
    }
}

/// Answers only once `parties` requests are in flight at the same time.
pub struct BarrierResponder {
    barrier: Arc<tokio::sync::Barrier>,
}

impl BarrierResponder {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Arc::new(tokio::sync::Barrier::new(parties)),
        }
    }
}

#[async_trait]
impl Responder for BarrierResponder {
    fn respond_stream(&self, question: String) -> BoxStream<'static, Result<String, BoxError>> {
        let barrier = self.barrier.clone();
        futures::stream::once(async move {
            barrier.wait().await;
            Ok::<String, BoxError>(format!("Done: {question}"))
        })
        .boxed()
    }
}

/// Card used by test adapters.
pub fn test_card(name: &str, streaming: bool) -> AgentCard {
    AgentCardBuilder::new(name, "An agent for testing", "0.1.0")
        .with_streaming(streaming)
        .with_skill(
            "echo",
            "Echo",
            "Echoes back messages",
            vec!["test".to_string()],
        )
        .build()
}

/// Wrap `responder` into an adapter with a streaming test card.
pub fn adapter<R: Responder>(responder: R) -> Arc<ResponderAdapter<R>> {
    Arc::new(ResponderAdapter::new(responder, test_card("Test Agent", true)))
}

/// Start a test server on a random port. Returns the agent base URL
/// (`http://127.0.0.1:{port}/echo`) and the server task.
pub async fn start_test_server(manager: Arc<TaskManager>) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}{}", addr, AGENT_PATH);

    let app = a2a_router(manager, ServerConfig::default().with_agent_path(AGENT_PATH));

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Brief wait for the server to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (base_url, handle)
}

/// Start a server with the echo adapter attached.
pub async fn start_echo_server() -> (String, Arc<TaskManager>, tokio::task::JoinHandle<()>) {
    let manager = Arc::new(TaskManager::with_adapter(Arc::new(ResponderAdapter::echo())));
    let (base_url, handle) = start_test_server(manager.clone()).await;
    (base_url, manager, handle)
}

/// A user text message, optionally inside a conversation.
pub fn user_params(text: &str, context_id: Option<&str>) -> SendMessageParams {
    let mut message = Message::user("test-msg-1", text);
    message.context_id = context_id.map(str::to_string);
    SendMessageParams::new(message)
}

/// REST request body for `/v1/message:send` and `/v1/message:stream`.
pub fn rest_body(text: &str, context_id: Option<&str>) -> serde_json::Value {
    let mut message = serde_json::json!({
        "messageId": "test-msg-1",
        "role": "user",
        "parts": [{"kind": "text", "text": text}]
    });
    if let Some(ctx) = context_id {
        message["contextId"] = serde_json::json!(ctx);
    }
    serde_json::json!({ "message": message })
}

/// Helper to build a JSON-RPC request body.
pub fn jsonrpc_request(
    id: serde_json::Value,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}
