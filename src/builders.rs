//! Builder patterns for ergonomic construction of A2A types.

use crate::types::*;
#[cfg(feature = "client")]
use std::collections::HashMap;

/// Builder for constructing [`AgentCard`] with sensible defaults.
///
/// Input and output modes default to `["text"]`; capabilities default to
/// off; `url` is usually left empty and filled in per card query.
///
/// # Example
///
/// ```
/// use a2a_bridge::builders::AgentCardBuilder;
///
/// let card = AgentCardBuilder::new("My Agent", "An example agent", "1.0.0")
///     .with_skill("chat", "Chat", "Conversational AI", vec!["conversation".to_string()])
///     .with_streaming(true)
///     .build();
/// assert!(card.supports_streaming());
/// ```
#[derive(Debug, Clone)]
pub struct AgentCardBuilder {
    name: String,
    description: String,
    version: String,
    url: String,
    provider: Option<AgentProvider>,
    documentation_url: Option<String>,
    capabilities: AgentCapabilities,
    default_input_modes: Vec<String>,
    default_output_modes: Vec<String>,
    skills: Vec<AgentSkill>,
    protocol_version: Option<String>,
    extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl AgentCardBuilder {
    /// Create a new builder with required fields.
    ///
    /// # Arguments
    ///
    /// * `name` - Human-readable agent name
    /// * `description` - Description of agent capabilities
    /// * `version` - Version string (e.g., "1.0.0")
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            url: String::new(),
            provider: None,
            documentation_url: None,
            capabilities: AgentCapabilities::default(),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            skills: Vec::new(),
            protocol_version: Some(DEFAULT_PROTOCOL_VERSION.to_string()),
            extensions: None,
        }
    }

    /// Set the agent's base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the provider information.
    pub fn with_provider(
        mut self,
        organization: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.provider = Some(AgentProvider {
            organization: organization.into(),
            url: url.into(),
        });
        self
    }

    /// Set the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Enable or disable streaming support.
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.capabilities.streaming = enabled;
        self
    }

    /// Enable or disable push notifications support.
    pub fn with_push_notifications(mut self, enabled: bool) -> Self {
        self.capabilities.push_notifications = enabled;
        self
    }

    /// Add a skill. A skill with the same `id` is replaced.
    pub fn with_skill(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        self.with_agent_skill(AgentSkill {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            tags,
            examples: None,
            operations: None,
        })
    }

    /// Add a fully specified skill. A skill with the same `id` is replaced.
    pub fn with_agent_skill(mut self, skill: AgentSkill) -> Self {
        match self.skills.iter_mut().find(|s| s.id == skill.id) {
            Some(existing) => *existing = skill,
            None => self.skills.push(skill),
        }
        self
    }

    /// Set the default input modes.
    pub fn with_input_modes(mut self, modes: Vec<String>) -> Self {
        self.default_input_modes = modes;
        self
    }

    /// Set the default output modes.
    pub fn with_output_modes(mut self, modes: Vec<String>) -> Self {
        self.default_output_modes = modes;
        self
    }

    /// Set the protocol version.
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    /// Add a free-form extension field.
    pub fn with_extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }

    /// Build the [`AgentCard`].
    pub fn build(self) -> AgentCard {
        AgentCard {
            name: self.name,
            description: self.description,
            url: self.url,
            version: self.version,
            protocol_version: self.protocol_version,
            default_input_modes: self.default_input_modes,
            default_output_modes: self.default_output_modes,
            capabilities: self.capabilities,
            skills: self.skills,
            provider: self.provider,
            documentation_url: self.documentation_url,
            extensions: self.extensions,
        }
    }
}

/// Which protocol binding a [`ClientBuilder`] talks.
#[cfg(feature = "client")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Binding {
    /// `/v1/message:send` and `/v1/message:stream`.
    #[default]
    Rest,
    /// JSON-RPC 2.0 posted to the agent URL.
    JsonRpc,
}

/// Builder for constructing [`crate::client::A2AClient`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use a2a_bridge::builders::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new("http://localhost:5001/echo")
///     .with_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "client")]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    url: String,
    timeout: Option<std::time::Duration>,
    headers: HashMap<String, String>,
    card_path: Option<String>,
    binding: Binding,
}

#[cfg(feature = "client")]
impl ClientBuilder {
    /// Create a new client builder for the given base URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            headers: HashMap::new(),
            card_path: None,
            binding: Binding::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add an Authorization header with a bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", token.into()),
        );
        self
    }

    /// Resolve the card from `path` instead of the well-known one.
    pub fn with_card_path(mut self, path: impl Into<String>) -> Self {
        self.card_path = Some(path.into());
        self
    }

    /// Select the protocol binding.
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    fn transport_config(&self) -> crate::client::TransportConfig {
        let mut config = crate::client::TransportConfig::default();
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.headers = self.headers.clone();
        config
    }

    fn transport(
        &self,
        url: &str,
        config: crate::client::TransportConfig,
    ) -> Box<dyn crate::client::Transport> {
        use crate::client::{HttpJsonTransport, JsonRpcTransport};

        match self.binding {
            Binding::Rest => Box::new(HttpJsonTransport::with_config(url, config)),
            Binding::JsonRpc => Box::new(JsonRpcTransport::with_config(url, config)),
        }
    }

    /// Build the client by resolving the agent card and creating the transport.
    pub async fn build(self) -> crate::A2AResult<crate::client::A2AClient> {
        use crate::client::{A2AClient, CardResolver};

        let config = self.transport_config();
        let mut resolver =
            CardResolver::with_client(config.build_client()).with_timeout(config.timeout);
        if let Some(path) = &self.card_path {
            resolver = resolver.with_card_path(path.clone());
        }
        let card = resolver.resolve(&self.url).await?;

        if card.url.trim().is_empty() {
            return Err(crate::error::A2AError::Protocol(format!(
                "agent card for '{}' has no url",
                card.name
            )));
        }

        let transport = self.transport(&card.url, config);
        Ok(A2AClient::with_transport(transport).with_card(card))
    }

    /// Build a client from a direct endpoint URL (skip agent card resolution).
    pub fn build_from_endpoint(self) -> crate::client::A2AClient {
        let config = self.transport_config();
        crate::client::A2AClient::with_transport(self.transport(&self.url, config))
    }
}

/// Builder for constructing an A2A axum server with fluent configuration.
///
/// # Example
///
/// ```rust,no_run
/// use a2a_bridge::builders::ServerBuilder;
/// use a2a_bridge::server::ResponderAdapter;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = ServerBuilder::new(Arc::new(ResponderAdapter::echo()))
///     .with_agent_path("/echo")
///     .with_cors(true)
///     .build();
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "server")]
pub struct ServerBuilder {
    manager: std::sync::Arc<crate::server::TaskManager>,
    config: crate::server::ServerConfig,
    cors_enabled: bool,
}

#[cfg(feature = "server")]
impl ServerBuilder {
    /// Create a new server builder with `adapter` attached.
    pub fn new(adapter: std::sync::Arc<dyn crate::server::AgentAdapter>) -> Self {
        Self::with_manager(std::sync::Arc::new(
            crate::server::TaskManager::with_adapter(adapter),
        ))
    }

    /// Serve an existing task manager, e.g. one whose adapter is swapped at
    /// runtime.
    pub fn with_manager(manager: std::sync::Arc<crate::server::TaskManager>) -> Self {
        Self {
            manager,
            config: crate::server::ServerConfig::default(),
            cors_enabled: false,
        }
    }

    /// Mount every route under `path`.
    pub fn with_agent_path(mut self, path: impl Into<String>) -> Self {
        self.config = self.config.with_agent_path(path);
        self
    }

    /// Serve the card at `path` below the agent path.
    pub fn with_card_path(mut self, path: impl Into<String>) -> Self {
        self.config = self.config.with_card_path(path);
        self
    }

    /// Advertise `url` as the externally visible base URL.
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.with_public_url(url);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: crate::server::ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable CORS middleware.
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// The task manager the router dispatches to.
    pub fn manager(&self) -> std::sync::Arc<crate::server::TaskManager> {
        self.manager.clone()
    }

    /// Build the axum router.
    pub fn build(self) -> axum::Router {
        let mut router = crate::server::a2a_router(self.manager, self.config);

        if self.cors_enabled {
            use tower_http::cors::CorsLayer;
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}
