//! High-level A2A client for interacting with remote agents.
//!
//! Wraps a [`Transport`] with card discovery and text conveniences.

use crate::error::{A2AError, A2AResult};
use crate::types::{AgentCard, Message, SendMessageParams};
use crate::utils::new_user_text_message;

use super::card_resolver::CardResolver;
use super::sse::DeltaStream;
use super::transport::{HttpJsonTransport, Transport};

/// Client for interacting with A2A-compatible agents.
///
/// Two exchanges are supported:
/// - unary: one message in, one agent message out
///   ([`send_message`](Self::send_message));
/// - streaming: one message in, a [`DeltaStream`] of text deltas out
///   ([`send_message_stream`](Self::send_message_stream)).
///
/// # Construction
///
/// ```no_run
/// use a2a_bridge::client::A2AClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // From a base URL (resolves the agent card, then talks to `card.url`):
/// let client = A2AClient::from_url("http://localhost:5001/echo").await?;
///
/// // With the JSON-RPC binding instead of REST:
/// use a2a_bridge::client::JsonRpcTransport;
/// let transport = JsonRpcTransport::new("http://localhost:5001/echo");
/// let client = A2AClient::with_transport(Box::new(transport));
/// # Ok(())
/// # }
/// ```
pub struct A2AClient {
    transport: Box<dyn Transport>,
    agent_card: Option<AgentCard>,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient")
            .field("agent_card", &self.agent_card)
            .finish_non_exhaustive()
    }
}

impl A2AClient {
    /// Create a client from a base URL.
    ///
    /// Resolves the agent card from `{url}/.well-known/agent-card.json` and
    /// sends messages to the card's `url` over the REST binding.
    ///
    /// # Errors
    ///
    /// Whatever [`CardResolver::resolve`] reports, or `Protocol` when the card
    /// has no `url`.
    pub async fn from_url(url: &str) -> A2AResult<Self> {
        let card = CardResolver::new().resolve(url).await?;
        Self::from_card(card)
    }

    /// Create a client from an already-resolved agent card.
    pub fn from_card(card: AgentCard) -> A2AResult<Self> {
        if card.url.trim().is_empty() {
            return Err(A2AError::Protocol(format!(
                "agent card for '{}' has no url",
                card.name
            )));
        }

        let transport = HttpJsonTransport::new(card.url.clone());
        Ok(Self {
            transport: Box::new(transport),
            agent_card: Some(card),
        })
    }

    /// Create a client with a custom transport.
    ///
    /// Use this for the JSON-RPC binding, custom HTTP configuration or a
    /// non-HTTP transport implementation.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            agent_card: None,
        }
    }

    /// Create a client from a direct endpoint URL (skips card resolution).
    pub fn from_endpoint(url: &str) -> Self {
        Self::with_transport(Box::new(HttpJsonTransport::new(url)))
    }

    /// Attach a card to a client built without one.
    pub fn with_card(mut self, card: AgentCard) -> Self {
        self.agent_card = Some(card);
        self
    }

    // ──────────────────────────────────────────────────
    // Exchanges
    // ──────────────────────────────────────────────────

    /// Send a message and wait for the agent's reply.
    ///
    /// The reply carries the request's `contextId` (or a server-assigned one
    /// when the request had none).
    pub async fn send_message(&self, params: SendMessageParams) -> A2AResult<Message> {
        tracing::debug!(
            message_id = %params.message.message_id,
            context_id = ?params.message.context_id,
            "send_message"
        );
        self.transport.send_message(&params).await
    }

    /// Send a message and stream the reply.
    ///
    /// The returned stream yields deltas in order and ends when the agent
    /// signals completion. Drop it to stop receiving; the connection is
    /// closed and the agent stops producing.
    pub async fn send_message_stream(&self, params: SendMessageParams) -> A2AResult<DeltaStream> {
        tracing::debug!(
            message_id = %params.message.message_id,
            context_id = ?params.message.context_id,
            "send_message_stream"
        );
        self.transport.send_message_stream(&params).await
    }

    /// Send a single text message in a fresh conversation.
    pub async fn send_text(&self, text: &str) -> A2AResult<Message> {
        self.send_message(text_params(text, None)).await
    }

    /// Send a single text message within an existing conversation.
    pub async fn send_text_in_context(&self, context_id: &str, text: &str) -> A2AResult<Message> {
        self.send_message(text_params(text, Some(context_id))).await
    }

    /// Stream the reply to a single text message.
    pub async fn send_text_stream(&self, text: &str) -> A2AResult<DeltaStream> {
        self.send_message_stream(text_params(text, None)).await
    }

    // ──────────────────────────────────────────────────
    // Utility
    // ──────────────────────────────────────────────────

    /// The agent card, if the client was built from one.
    pub fn get_card(&self) -> Option<&AgentCard> {
        self.agent_card.as_ref()
    }

    /// Close the underlying transport.
    pub async fn close(&self) -> A2AResult<()> {
        self.transport.close().await
    }
}

fn text_params(text: &str, context_id: Option<&str>) -> SendMessageParams {
    SendMessageParams::new(new_user_text_message(text, context_id))
}
