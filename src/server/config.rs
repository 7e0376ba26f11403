//! Server-side configuration.

use std::time::Duration;

use crate::utils::constants::AGENT_CARD_WELL_KNOWN_PATH;

/// Default capacity of a responder's delta channel.
pub const DEFAULT_STREAM_CAPACITY: usize = 64;

/// How the router mounts an agent and shapes its responses.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Prefix every route is mounted under, e.g. `/echo`. May be empty.
    pub agent_path: String,

    /// Path of the card below `agent_path`.
    pub card_path: String,

    /// Externally visible base URL. When unset the self URL is derived from
    /// the request's `Host` header.
    pub public_url: Option<String>,

    /// Interval of SSE keep-alive comments.
    pub keep_alive: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            agent_path: String::new(),
            card_path: AGENT_CARD_WELL_KNOWN_PATH.to_string(),
            public_url: None,
            keep_alive: Duration::from_secs(15),
        }
    }
}

impl ServerConfig {
    /// Mount under `path`. A trailing `/` is dropped and a leading one added.
    pub fn with_agent_path(mut self, path: impl Into<String>) -> Self {
        self.agent_path = normalize_prefix(&path.into());
        self
    }

    /// Serve the card at `path` instead of the well-known one.
    pub fn with_card_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.card_path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    /// Advertise `url` as the externally visible base URL.
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Set the SSE keep-alive interval.
    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }
}

fn normalize_prefix(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
