//! Task manager: binds incoming requests to the attached agent adapter.
//!
//! The manager owns a single adapter slot. Attaching replaces whatever was
//! there; requests already running keep the adapter they started with, and
//! every request dispatched after the swap sees the new one. The slot lock is
//! held only long enough to clone the `Arc`, so concurrent requests never
//! wait on each other.
//!
//! Per request the manager:
//! 1. short-circuits with `Cancelled` if the token already fired,
//! 2. validates the message (role `user`, at least one part),
//! 3. assigns a `contextId` when the caller sent none,
//! 4. dispatches to the adapter and races it against the token.
//!
//! Each request moves through [`RequestState`]s, logged with `tracing`.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{A2AError, A2AResult, ExchangeOutcome};
use crate::types::{AgentCard, Message, Role, SendMessageParams};

use super::agent_adapter::AgentAdapter;
use super::delta_channel::DeltaReceiver;

/// Lifecycle of one request.
///
/// `Received → Dispatched → {Completed | Cancelled | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// Accepted by the task manager, not yet handed to an adapter.
    Received,
    /// Handed to the adapter.
    Dispatched,
    /// The adapter produced its full response.
    Completed,
    /// Stopped by cancellation.
    Cancelled,
    /// Ended with an error.
    Failed,
}

impl RequestState {
    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Completed | RequestState::Cancelled | RequestState::Failed
        )
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::Received => write!(f, "received"),
            RequestState::Dispatched => write!(f, "dispatched"),
            RequestState::Completed => write!(f, "completed"),
            RequestState::Cancelled => write!(f, "cancelled"),
            RequestState::Failed => write!(f, "failed"),
        }
    }
}

impl From<ExchangeOutcome> for RequestState {
    fn from(outcome: ExchangeOutcome) -> Self {
        match outcome {
            ExchangeOutcome::Completed => RequestState::Completed,
            ExchangeOutcome::Cancelled => RequestState::Cancelled,
            ExchangeOutcome::Failed => RequestState::Failed,
        }
    }
}

/// Dispatch hub between the transport layer and one agent adapter.
#[derive(Default)]
pub struct TaskManager {
    adapter: RwLock<Option<Arc<dyn AgentAdapter>>>,
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl TaskManager {
    /// Create a task manager with no adapter attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a task manager with `adapter` already attached.
    pub fn with_adapter(adapter: Arc<dyn AgentAdapter>) -> Self {
        let manager = Self::new();
        manager.attach(adapter);
        manager
    }

    /// Attach `adapter`, replacing any previous one. Last attach wins.
    pub fn attach(&self, adapter: Arc<dyn AgentAdapter>) {
        let mut slot = self.adapter.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = slot.replace(adapter).is_some();
        info!(replaced, "Agent adapter attached");
    }

    /// Remove the attached adapter, if any.
    pub fn detach(&self) -> Option<Arc<dyn AgentAdapter>> {
        let mut slot = self.adapter.write().unwrap_or_else(PoisonError::into_inner);
        let previous = slot.take();
        if previous.is_some() {
            info!("Agent adapter detached");
        }
        previous
    }

    /// Whether an adapter is attached.
    pub fn is_attached(&self) -> bool {
        self.adapter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_adapter(&self) -> A2AResult<Arc<dyn AgentAdapter>> {
        self.adapter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| A2AError::not_attached("no agent adapter is attached"))
    }

    /// Handle a unary exchange.
    pub async fn send_message(
        &self,
        params: SendMessageParams,
        cancel: CancellationToken,
    ) -> A2AResult<Message> {
        let (request_id, params, adapter) = self.admit(params, &cancel)?;
        let context_id = params.message.context_id.clone();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(A2AError::cancelled("request cancelled")),
            result = adapter.on_message(params, cancel.clone()) => result,
        };

        // The response always keeps the request's conversation.
        let result = result.map(|mut reply| {
            if reply.context_id.is_some() && reply.context_id != context_id {
                warn!(
                    request_id = %request_id,
                    expected = ?context_id,
                    got = ?reply.context_id,
                    "Adapter replied in another context, overriding"
                );
            }
            reply.context_id = context_id.clone();
            reply
        });

        log_outcome(&request_id, context_id.as_deref(), &result);
        result
    }

    /// Handle a streaming exchange.
    ///
    /// The returned receiver ends with a trailing `Cancelled` item if `cancel`
    /// fires mid-stream.
    pub async fn send_message_stream(
        &self,
        params: SendMessageParams,
        cancel: CancellationToken,
    ) -> A2AResult<DeltaReceiver> {
        let (request_id, params, adapter) = self.admit(params, &cancel)?;
        let context_id = params.message.context_id.clone();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(A2AError::cancelled("request cancelled")),
            result = adapter.on_message_stream(params, cancel.clone()) => result,
        };

        // A successful stream logs its own terminal state once drained.
        let result = result.map(|receiver| {
            receiver
                .with_cancellation(cancel)
                .with_request_id(request_id.clone())
                .with_context_id(context_id.clone())
        });
        if result.is_err() {
            log_outcome(&request_id, context_id.as_deref(), &result);
        }
        result
    }

    /// Build the card for a caller that reached the agent at `self_url`.
    pub async fn agent_card(
        &self,
        self_url: &str,
        cancel: CancellationToken,
    ) -> A2AResult<AgentCard> {
        if cancel.is_cancelled() {
            return Err(A2AError::cancelled("card query cancelled"));
        }
        let adapter = self.current_adapter()?;
        debug!(self_url, "Card query dispatched");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(A2AError::cancelled("card query cancelled")),
            card = adapter.on_agent_card(self_url, cancel.clone()) => card,
        }
    }

    /// Admission: cancellation check, validation, context id, adapter lookup.
    fn admit(
        &self,
        mut params: SendMessageParams,
        cancel: &CancellationToken,
    ) -> A2AResult<(String, SendMessageParams, Arc<dyn AgentAdapter>)> {
        let request_id = params.message.message_id.clone();
        debug!(
            request_id = %request_id,
            context_id = ?params.message.context_id,
            state = %RequestState::Received,
            "Request received"
        );

        if cancel.is_cancelled() {
            info!(request_id = %request_id, state = %RequestState::Cancelled, "Cancelled before dispatch");
            return Err(A2AError::cancelled("request cancelled before dispatch"));
        }

        validate_message(&params.message)?;

        if params.message.context_id.is_none() {
            params.message.context_id = Some(uuid::Uuid::new_v4().to_string());
        }

        let adapter = match self.current_adapter() {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!(request_id = %request_id, "Request rejected, no adapter attached");
                return Err(e);
            }
        };

        debug!(
            request_id = %request_id,
            context_id = ?params.message.context_id,
            state = %RequestState::Dispatched,
            "Request dispatched"
        );
        Ok((request_id, params, adapter))
    }
}

fn validate_message(message: &Message) -> A2AResult<()> {
    if message.role != Role::User {
        return Err(A2AError::invalid_params(format!(
            "expected a message with role 'user', got '{}'",
            message.role
        )));
    }
    if message.parts.is_empty() {
        return Err(A2AError::empty_message("message has no parts"));
    }
    Ok(())
}

fn log_outcome<T>(request_id: &str, context_id: Option<&str>, result: &A2AResult<T>) {
    let state = RequestState::from(ExchangeOutcome::of(result));
    match result {
        Ok(_) => debug!(request_id, context_id, state = %state, "Request finished"),
        Err(e) if e.is_cancelled() => {
            info!(request_id, context_id, state = %state, "Request cancelled")
        }
        Err(e) => warn!(request_id, context_id, state = %state, error = %e, "Request failed"),
    }
}
