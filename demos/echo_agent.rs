//! Echo Agent: a minimal A2A server that echoes messages back.
//!
//! Run with (port defaults to 5001):
//! ```sh
//! cargo run --example echo_agent -- 5001
//! ```
//!
//! Then test with curl:
//! ```sh
//! # Check agent card
//! curl http://localhost:5001/echo/.well-known/agent-card.json | jq
//!
//! # Unary exchange (REST)
//! curl -X POST http://localhost:5001/echo/v1/message:send \
//!   -H "Content-Type: application/json" \
//!   -d '{"message": {"role": "user", "messageId": "m1", "contextId": "conv-123",
//!        "parts": [{"kind": "text", "text": "ping"}]}}'
//!
//! # Streaming exchange (REST, SSE)
//! curl -N -X POST http://localhost:5001/echo/v1/message:stream \
//!   -H "Content-Type: application/json" \
//!   -d '{"message": {"role": "user", "messageId": "m2",
//!        "parts": [{"kind": "text", "text": "hello there"}]}}'
//! ```

use std::sync::Arc;

use a2a_bridge::builders::{AgentCardBuilder, ServerBuilder};
use a2a_bridge::server::{EchoResponder, ResponderAdapter};
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 5001;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug for per-request logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u16>()?,
        None => DEFAULT_PORT,
    };

    let card = AgentCardBuilder::new("Echo Agent", "Echoes messages back to the user", "1.0.0")
        .with_streaming(true)
        .with_skill(
            "echo",
            "Echo",
            "Repeats any text message you send, prefixed with 'Echo: '",
            vec!["echo".to_string(), "test".to_string()],
        )
        .build();
    let adapter = ResponderAdapter::new(EchoResponder, card);

    let app = ServerBuilder::new(Arc::new(adapter))
        .with_agent_path("/echo")
        .with_cors(true)
        .build();

    let addr = format!("0.0.0.0:{port}");
    println!("Echo Agent listening on http://localhost:{port}/echo");
    println!("  Agent card: http://localhost:{port}/echo/.well-known/agent-card.json");
    println!("  REST:       http://localhost:{port}/echo/v1/message:send");
    println!("  JSON-RPC:   http://localhost:{port}/echo");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
