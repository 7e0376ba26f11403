//! # a2a-bridge: a minimal Agent-to-Agent (A2A) bridge
//!
//! Exposes an opaque question/answer backend as an A2A agent, and calls such
//! agents from Rust. Agents describe themselves with a capability card served
//! at a well-known path; callers exchange messages with them either unary
//! (one reply) or streaming (a sequence of text deltas over Server-Sent
//! Events).
//!
//! This crate provides:
//! - **Types** for cards, messages and text deltas ([`types`])
//! - **Client** for resolving cards and exchanging messages
//!   ([`client::A2AClient`], [`client::CardResolver`])
//! - **Server** dispatch hub, adapters and axum routes
//!   ([`server::TaskManager`], [`server::ResponderAdapter`],
//!   [`server::a2a_router`])
//! - **Card renderer** for a human-readable identity sheet ([`render`])
//! - **Builders** ([`AgentCardBuilder`], [`ClientBuilder`], [`ServerBuilder`])
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | HTTP client for calling A2A agents (reqwest + SSE) |
//! | `server` | yes     | Task manager + axum integration for serving agents |
//! | `full`   | no      | Enable all features |
//!
//! ## Quick Start: Client
//!
//! ```no_run
//! use a2a_bridge::client::A2AClient;
//! use a2a_bridge::render::render_card;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Resolve the card and connect to the URL it advertises.
//!     let client = A2AClient::from_url("http://localhost:5001/echo").await?;
//!     if let Some(card) = client.get_card() {
//!         println!("{}", render_card(card));
//!     }
//!
//!     let reply = client.send_text("ping").await?;
//!     println!("{}", reply.first_text().unwrap_or_default());
//!
//!     let transcript = client.send_text_stream("hello there").await?.drain().await;
//!     println!("{} ({})", transcript.text, transcript.outcome());
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start: Server
//!
//! Implement [`server::Responder`] for your backend, wrap it in a
//! [`server::ResponderAdapter`] and serve it:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a2a_bridge::server::{BoxError, Responder, ResponderAdapter};
//! use a2a_bridge::{AgentCardBuilder, ServerBuilder};
//! use async_trait::async_trait;
//! use futures::stream::{BoxStream, StreamExt};
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl Responder for Shout {
//!     fn respond_stream(&self, question: String) -> BoxStream<'static, Result<String, BoxError>> {
//!         futures::stream::once(async move { Ok(question.to_uppercase()) }).boxed()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let card = AgentCardBuilder::new("Shout Agent", "Repeats you, louder", "1.0.0")
//!         .with_streaming(true)
//!         .build();
//!     let app = ServerBuilder::new(Arc::new(ResponderAdapter::new(Shout, card)))
//!         .with_agent_path("/shout")
//!         .build();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! The router provides, below the agent path:
//! - `GET /.well-known/agent-card.json` and `GET /v1/card`: the card
//! - `POST /v1/message:send` and `POST /v1/message:stream`: REST binding
//! - `POST /`: JSON-RPC 2.0 (`message/send`, `message/stream`)
//!
//! ## Demos
//!
//! See `demos/`:
//! - `echo_agent.rs`: the echo agent under `/echo`
//! - `hello_client.rs`: resolves a card, prints it, sends one unary and one
//!   streaming exchange

pub mod builders;
pub mod error;
pub mod render;
pub mod types;
pub mod utils;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod server;

/// Prelude module that re-exports commonly used types and traits.
///
/// # Example
///
/// ```
/// use a2a_bridge::prelude::*;
///
/// let message = Message::user("m1", "ping").with_context_id("conv-123");
/// assert_eq!(message.role, Role::User);
/// ```
pub mod prelude {
    // Core types
    pub use crate::types::{
        AgentCapabilities, AgentCard, AgentSkill, Message, Part, Role, SendMessageParams,
        TextDelta,
    };

    // Error types
    pub use crate::error::{A2AError, A2AResult, ExchangeOutcome};

    // Builders
    pub use crate::builders::AgentCardBuilder;

    pub use crate::render::render_card;

    #[cfg(feature = "client")]
    pub use crate::builders::ClientBuilder;

    #[cfg(feature = "client")]
    pub use crate::client::{A2AClient, CardResolver, DeltaStream};

    #[cfg(feature = "server")]
    pub use crate::builders::ServerBuilder;

    #[cfg(feature = "server")]
    pub use crate::server::{
        a2a_router, AgentAdapter, EchoResponder, Responder, ResponderAdapter, ServerConfig,
        TaskManager,
    };
}

// Re-export core types at crate root for convenience.
pub use builders::AgentCardBuilder;
pub use error::{A2AError, A2AResult};
pub use types::*;

#[cfg(feature = "client")]
pub use builders::ClientBuilder;

#[cfg(feature = "server")]
pub use builders::ServerBuilder;
