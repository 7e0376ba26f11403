//! Agent card discovery and resolution.
//!
//! Implements the well-known URI convention for discovering A2A agent cards.
//! A card describes the agent's identity, capabilities and skills, and
//! carries the `url` messages should be sent to.

use std::time::Duration;

use crate::error::{A2AError, A2AResult};
use crate::types::AgentCard;
use crate::utils::constants::AGENT_CARD_WELL_KNOWN_PATH;

/// Resolves [`AgentCard`]s from agent base URLs.
///
/// Fetches the card from `{base_url}/.well-known/agent-card.json` (or a
/// configured path) and deserializes it. There is no retry and no fallback
/// path.
///
/// # Example
///
/// ```no_run
/// use a2a_bridge::client::CardResolver;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = CardResolver::new();
/// let card = resolver.resolve("http://localhost:5001/echo").await?;
/// println!("Agent: {} v{}", card.name, card.version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardResolver {
    client: reqwest::Client,
    card_path: String,
    timeout: Option<Duration>,
}

impl CardResolver {
    /// Create a new resolver with default settings.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a new resolver with an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            card_path: AGENT_CARD_WELL_KNOWN_PATH.to_string(),
            timeout: None,
        }
    }

    /// Bound each card fetch to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the card path (e.g. `/v1/card`).
    pub fn with_card_path(mut self, path: impl Into<String>) -> Self {
        let path: String = path.into();
        self.card_path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    /// The path appended to base URLs.
    pub fn card_path(&self) -> &str {
        &self.card_path
    }

    /// Fetch and parse the agent card from the given base URL.
    ///
    /// # Errors
    ///
    /// - [`A2AError::Transport`] / [`A2AError::Timeout`] when the agent cannot
    ///   be reached,
    /// - [`A2AError::NotFound`] on HTTP 404,
    /// - [`A2AError::Http`] on any other non-2xx response,
    /// - [`A2AError::Protocol`] when the body is not a card.
    pub async fn resolve(&self, base_url: &str) -> A2AResult<AgentCard> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), self.card_path);

        tracing::debug!(url = %url, "resolving agent card");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    A2AError::Timeout(format!("timed out fetching agent card from {url}: {e}"))
                } else if e.is_connect() {
                    A2AError::Transport(format!("failed to connect to agent at {url}: {e}"))
                } else {
                    A2AError::Transport(format!("failed to fetch agent card from {url}: {e}"))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(A2AError::not_found(format!("no agent card at {url}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(A2AError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| A2AError::Transport(format!("failed to read agent card response: {e}")))?;

        let card: AgentCard = serde_json::from_slice(&bytes)
            .map_err(|e| A2AError::Protocol(format!("failed to parse agent card: {e}")))?;

        tracing::debug!(
            name = %card.name,
            url = %card.url,
            streaming = card.capabilities.streaming,
            "resolved agent card"
        );

        Ok(card)
    }
}

impl Default for CardResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_card_path() {
        assert_eq!(
            CardResolver::new().card_path(),
            "/.well-known/agent-card.json"
        );
    }

    #[test]
    fn test_card_path_gets_leading_slash() {
        let resolver = CardResolver::new().with_card_path("v1/card");
        assert_eq!(resolver.card_path(), "/v1/card");
    }
}
