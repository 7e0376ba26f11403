//! Full round-trip exchange tests: `A2AClient` (reqwest) → axum router →
//! `TaskManager` → `ResponderAdapter`.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use a2a_bridge::builders::{Binding, ClientBuilder};
use a2a_bridge::client::{A2AClient, HttpJsonTransport, JsonRpcTransport, TransportConfig};
use a2a_bridge::error::{A2AError, ExchangeOutcome};
use a2a_bridge::server::{ResponderAdapter, TaskManager};
use a2a_bridge::types::{Part, Role, SendMessageParams};
use common::{
    adapter, start_echo_server, start_test_server, test_card, user_params, FailingResponder,
    PacedResponder, PanickingResponder, ScriptedResponder,
};

// ===========================================================================
// Unary
// ===========================================================================

#[tokio::test]
async fn ping_is_echoed() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::from_url(&base_url).await.unwrap();

    let reply = client.send_text("ping").await.unwrap();

    assert_eq!(reply.role, Role::Agent);
    assert_eq!(reply.first_text(), Some("Echo: ping"));
}

#[tokio::test]
async fn reply_keeps_request_context() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::from_url(&base_url).await.unwrap();

    let reply = client.send_text_in_context("conv-123", "hello").await.unwrap();

    assert_eq!(reply.context_id.as_deref(), Some("conv-123"));
}

#[tokio::test]
async fn missing_context_is_assigned() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::from_endpoint(&base_url);

    let reply = client.send_text("hello").await.unwrap();

    let context_id = reply.context_id.expect("server assigns a context id");
    assert!(!context_id.is_empty());
}

#[tokio::test]
async fn message_without_text_is_rejected() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::from_endpoint(&base_url);

    let mut params = user_params("ignored", None);
    params.message.parts = vec![Part::data(serde_json::json!({"k": 1}))];
    let err = client.send_message(params).await.unwrap_err();
    assert!(matches!(err, A2AError::EmptyMessage { .. }), "got {err:?}");

    let mut params = user_params("ignored", None);
    params.message.parts.clear();
    let err = client.send_message(params).await.unwrap_err();
    assert!(matches!(err, A2AError::EmptyMessage { .. }), "got {err:?}");
}

#[tokio::test]
async fn agent_role_is_invalid_params() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::from_endpoint(&base_url);

    let mut params = user_params("hi", None);
    params.message.role = Role::Agent;
    let err = client.send_message(params).await.unwrap_err();
    assert!(matches!(err, A2AError::InvalidParams { .. }), "got {err:?}");
}

#[tokio::test]
async fn no_adapter_is_not_attached() {
    let (base_url, _h) = start_test_server(Arc::new(TaskManager::new())).await;
    let client = A2AClient::from_endpoint(&base_url);

    let err = client.send_text("ping").await.unwrap_err();
    assert!(matches!(err, A2AError::NotAttached { .. }), "got {err:?}");

    let err = client.send_text_stream("ping").await.unwrap_err();
    assert!(matches!(err, A2AError::NotAttached { .. }), "got {err:?}");
}

#[tokio::test]
async fn unary_responder_fault_is_responder_failure() {
    let manager = Arc::new(TaskManager::with_adapter(adapter(FailingResponder {
        partial: "partial ",
        error: "model offline",
    })));
    let (base_url, _h) = start_test_server(manager).await;
    let client = A2AClient::from_endpoint(&base_url);

    let err = client.send_text("q").await.unwrap_err();
    assert!(matches!(err, A2AError::ResponderFailure { .. }), "got {err:?}");
    assert_eq!(err.message(), "model offline");
}

#[tokio::test]
async fn last_attached_adapter_answers() {
    let first = ScriptedResponder::new(&["from A"]);
    let first_calls = first.calls();
    let second = ScriptedResponder::new(&["from B"]);
    let second_calls = second.calls();

    let manager = Arc::new(TaskManager::with_adapter(adapter(first)));
    let (base_url, _h) = start_test_server(manager.clone()).await;
    let client = A2AClient::from_endpoint(&base_url);

    assert_eq!(client.send_text("q").await.unwrap().first_text(), Some("from A"));

    manager.attach(adapter(second));
    assert_eq!(client.send_text("q").await.unwrap().first_text(), Some("from B"));
    assert_eq!(client.send_text("q").await.unwrap().first_text(), Some("from B"));

    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 2);
}

// ===========================================================================
// Streaming
// ===========================================================================

#[tokio::test]
async fn streamed_text_equals_unary_text() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::from_url(&base_url).await.unwrap();

    let unary = client.send_text("hello there general").await.unwrap();
    let transcript = client
        .send_text_stream("hello there general")
        .await
        .unwrap()
        .drain()
        .await;

    assert_eq!(transcript.outcome(), ExchangeOutcome::Completed);
    assert!(transcript.deltas.len() > 1);
    assert_eq!(Some(transcript.text.as_str()), unary.first_text());
}

#[tokio::test]
async fn increments_arrive_as_ordered_deltas() {
    let manager = Arc::new(TaskManager::with_adapter(adapter(ScriptedResponder::new(&[
        "Hel", "lo",
    ]))));
    let (base_url, _h) = start_test_server(manager).await;
    let client = A2AClient::from_endpoint(&base_url);

    let mut stream = client
        .send_message_stream(user_params("q", Some("conv-7")))
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    let second = stream.next().await.unwrap().unwrap();
    assert!(stream.next().await.is_none());

    assert_eq!(first.text, "Hel");
    assert_eq!(second.text, "lo");
    assert_eq!((first.index, second.index), (0, 1));
    assert_eq!(first.message_id, second.message_id);
    assert_eq!(first.context_id.as_deref(), Some("conv-7"));
    assert_eq!(format!("{}{}", first.text, second.text), "Hello");
}

#[tokio::test]
async fn streaming_failure_follows_partial_output() {
    let manager = Arc::new(TaskManager::with_adapter(adapter(FailingResponder {
        partial: "partial ",
        error: "model offline",
    })));
    let (base_url, _h) = start_test_server(manager).await;
    let client = A2AClient::from_endpoint(&base_url);

    let transcript = client.send_text_stream("q").await.unwrap().drain().await;

    assert_eq!(transcript.text, "partial ");
    assert_eq!(transcript.outcome(), ExchangeOutcome::Failed);
    let err = transcript.error.unwrap();
    assert!(matches!(err, A2AError::ResponderFailure { .. }), "got {err:?}");
    assert_eq!(err.message(), "model offline");
}

#[tokio::test]
async fn responder_panic_is_a_failure_not_a_completion() {
    let manager = Arc::new(TaskManager::with_adapter(adapter(PanickingResponder {
        partial: "Hel",
    })));
    let (base_url, _h) = start_test_server(manager).await;
    let client = A2AClient::from_endpoint(&base_url);

    let transcript = client.send_text_stream("q").await.unwrap().drain().await;
    assert_eq!(transcript.text, "Hel");
    assert_eq!(transcript.outcome(), ExchangeOutcome::Failed);
    let err = transcript.error.unwrap();
    assert!(matches!(err, A2AError::ResponderFailure { .. }), "got {err:?}");

    let err = client.send_text("q").await.unwrap_err();
    assert!(matches!(err, A2AError::ResponderFailure { .. }), "got {err:?}");
}

#[tokio::test]
async fn stream_outlives_request_timeout() {
    let manager = Arc::new(TaskManager::with_adapter(adapter(PacedResponder {
        pieces: 6,
        gap: Duration::from_millis(150),
    })));
    let (base_url, _h) = start_test_server(manager).await;
    let config = TransportConfig {
        timeout: Duration::from_millis(400),
        ..Default::default()
    };

    let rest = A2AClient::with_transport(Box::new(HttpJsonTransport::with_config(
        &base_url,
        config.clone(),
    )));
    let transcript = rest.send_text_stream("q").await.unwrap().drain().await;
    assert_eq!(transcript.outcome(), ExchangeOutcome::Completed, "{:?}", transcript.error);
    assert_eq!(transcript.deltas.len(), 6);
    assert_eq!(transcript.text, "p0 p1 p2 p3 p4 p5 ");

    let rpc = A2AClient::with_transport(Box::new(JsonRpcTransport::with_config(&base_url, config)));
    let transcript = rpc.send_text_stream("q").await.unwrap().drain().await;
    assert_eq!(transcript.outcome(), ExchangeOutcome::Completed, "{:?}", transcript.error);
    assert_eq!(transcript.deltas.len(), 6);
}

#[tokio::test]
async fn unary_request_is_bounded_by_timeout() {
    let manager = Arc::new(TaskManager::with_adapter(adapter(PacedResponder {
        pieces: 6,
        gap: Duration::from_millis(150),
    })));
    let (base_url, _h) = start_test_server(manager).await;
    let client = A2AClient::with_transport(Box::new(HttpJsonTransport::with_config(
        &base_url,
        TransportConfig {
            timeout: Duration::from_millis(300),
            ..Default::default()
        },
    )));

    let err = client.send_text("q").await.unwrap_err();
    assert!(matches!(err, A2AError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn streaming_rejects_empty_message_before_streaming() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::from_endpoint(&base_url);

    let mut params = user_params("ignored", None);
    params.message.parts.clear();
    let err = client.send_message_stream(params).await.unwrap_err();
    assert!(matches!(err, A2AError::EmptyMessage { .. }), "got {err:?}");
}

// ===========================================================================
// JSON-RPC binding
// ===========================================================================

#[tokio::test]
async fn jsonrpc_transport_round_trip() {
    let (base_url, _manager, _h) = start_echo_server().await;
    let client = A2AClient::with_transport(Box::new(JsonRpcTransport::new(&base_url)));

    let reply = client.send_text_in_context("conv-123", "ping").await.unwrap();
    assert_eq!(reply.first_text(), Some("Echo: ping"));
    assert_eq!(reply.context_id.as_deref(), Some("conv-123"));

    let transcript = client.send_text_stream("ping").await.unwrap().drain().await;
    assert_eq!(transcript.outcome(), ExchangeOutcome::Completed);
    assert_eq!(transcript.text, "Echo: ping");
}

#[tokio::test]
async fn jsonrpc_errors_keep_their_kind() {
    let (base_url, _h) = start_test_server(Arc::new(TaskManager::new())).await;
    let client = A2AClient::with_transport(Box::new(JsonRpcTransport::new(&base_url)));

    let err = client.send_text("ping").await.unwrap_err();
    assert!(matches!(err, A2AError::NotAttached { .. }), "got {err:?}");
}

#[tokio::test]
async fn jsonrpc_streaming_refused_without_capability() {
    let card = test_card("Unary Only", false);
    let manager = Arc::new(TaskManager::with_adapter(Arc::new(ResponderAdapter::new(
        ScriptedResponder::new(&["x"]),
        card,
    ))));
    let (base_url, _h) = start_test_server(manager).await;
    let client = A2AClient::with_transport(Box::new(JsonRpcTransport::new(&base_url)));

    let err = client.send_text_stream("q").await.unwrap_err();
    assert!(
        matches!(err, A2AError::UnsupportedOperation { .. }),
        "got {err:?}"
    );

    // Unary still works.
    assert_eq!(client.send_text("q").await.unwrap().first_text(), Some("x"));
}

#[tokio::test]
async fn client_builder_selects_binding() {
    let (base_url, _manager, _h) = start_echo_server().await;

    let client = ClientBuilder::new(&base_url)
        .with_binding(Binding::JsonRpc)
        .with_timeout(std::time::Duration::from_secs(5))
        .build()
        .await
        .unwrap();

    assert_eq!(client.get_card().unwrap().name, "Echo Agent");
    let reply = client
        .send_message(SendMessageParams::new(
            a2a_bridge::types::Message::user("m-1", "ping"),
        ))
        .await
        .unwrap();
    assert_eq!(reply.first_text(), Some("Echo: ping"));
}

// ===========================================================================
// Raw wire checks
// ===========================================================================

#[tokio::test]
async fn rest_stream_wire_format() {
    let (base_url, _manager, _h) = start_echo_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/v1/message:stream"))
        .json(&common::rest_body("hi", Some("conv-1")))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let body = resp.text().await.unwrap();
    assert!(body.contains("event: delta"), "body: {body}");
    assert!(body.contains("\"kind\":\"text-delta\""), "body: {body}");
    assert!(body.contains("\"contextId\":\"conv-1\""), "body: {body}");
    assert!(body.contains("event: done"), "body: {body}");
    assert!(!body.contains("event: error"), "body: {body}");
}

#[tokio::test]
async fn rest_error_body_and_status() {
    let (base_url, _h) = start_test_server(Arc::new(TaskManager::new())).await;

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/v1/message:send"))
        .json(&common::rest_body("hi", None))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 503);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], -32010);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn jsonrpc_envelope_is_well_formed() {
    let (base_url, _manager, _h) = start_echo_server().await;

    let body = common::jsonrpc_request(
        serde_json::json!(42),
        "message/send",
        common::rest_body("envelope", None),
    );
    let resp = reqwest::Client::new()
        .post(&base_url)
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["id"], 42);
    assert!(json.get("error").is_none());
    assert_eq!(json["result"]["kind"], "message");
    assert_eq!(json["result"]["parts"][0]["text"], "Echo: envelope");
}
