//! Agent adapter: the integration point between the task manager and an
//! opaque responder.
//!
//! - [`AgentAdapter`] is what the [`TaskManager`](super::TaskManager) holds
//!   and dispatches to: one handler for unary messages, one for streaming
//!   messages, one for card queries.
//! - [`Responder`] is the swappable backend (echo logic, a hosted model, a
//!   third-party studio...). It only sees the question text.
//! - [`ResponderAdapter`] turns any `Responder` into an `AgentAdapter`, so every
//!   backend gets the same validation and error mapping.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::FutureExt;
use futures::stream::{BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{A2AError, A2AResult};
use crate::types::{AgentCard, Message, SendMessageParams};
use crate::utils::new_agent_text_message;

use super::config::DEFAULT_STREAM_CAPACITY;
use super::delta_channel::{delta_channel, DeltaReceiver, DeltaSender};

/// Error type responders report faults with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// AgentAdapter
// ---------------------------------------------------------------------------

/// Request handlers attached to a [`TaskManager`](super::TaskManager).
///
/// The task manager has already validated the request (role `user`, at least
/// one part) and assigned a `contextId` by the time a handler runs. Handlers
/// should watch `cancel` and stop early when it fires.
#[async_trait]
pub trait AgentAdapter: Send + Sync + 'static {
    /// Answer a message with a single agent message.
    async fn on_message(
        &self,
        params: SendMessageParams,
        cancel: CancellationToken,
    ) -> A2AResult<Message>;

    /// Answer a message with a stream of text deltas.
    ///
    /// The default runs [`on_message`](Self::on_message) and relays the whole
    /// answer as a single delta.
    async fn on_message_stream(
        &self,
        params: SendMessageParams,
        cancel: CancellationToken,
    ) -> A2AResult<DeltaReceiver> {
        let context_id = params.message.context_id.clone();
        let reply = self.on_message(params, cancel).await?;
        let (mut tx, rx) = delta_channel(context_id, 1);
        let text = crate::utils::get_message_text(&reply, "");
        tx.send_text(text).await?;
        Ok(rx)
    }

    /// Describe this agent. `agent_url` is the base URL the caller reached
    /// the agent at.
    async fn on_agent_card(&self, agent_url: &str, cancel: CancellationToken)
        -> A2AResult<AgentCard>;
}

// ---------------------------------------------------------------------------
// Responder
// ---------------------------------------------------------------------------

/// Backend that turns a question into an answer.
///
/// Implementors provide [`respond_stream`](Self::respond_stream); the unary
/// [`respond`](Self::respond) defaults to concatenating the stream, so both
/// modes always agree.
#[async_trait]
pub trait Responder: Send + Sync + 'static {
    /// Produce the full answer.
    async fn respond(&self, question: &str) -> Result<String, BoxError> {
        let mut increments = self.respond_stream(question.to_string());
        let mut answer = String::new();
        while let Some(increment) = increments.next().await {
            answer.push_str(&increment?);
        }
        Ok(answer)
    }

    /// Produce the answer incrementally. Increments are relayed in order as
    /// soon as they are yielded; an `Err` item ends the answer.
    fn respond_stream(&self, question: String) -> BoxStream<'static, Result<String, BoxError>>;
}

#[async_trait]
impl<R: Responder + ?Sized> Responder for Arc<R> {
    async fn respond(&self, question: &str) -> Result<String, BoxError> {
        (**self).respond(question).await
    }

    fn respond_stream(&self, question: String) -> BoxStream<'static, Result<String, BoxError>> {
        (**self).respond_stream(question)
    }
}

/// Answers `"Echo: {question}"`, streamed word by word.
#[derive(Debug, Clone, Default)]
pub struct EchoResponder;

impl EchoResponder {
    /// Card template of the echo agent. `url` is filled in per query.
    pub fn agent_card() -> AgentCard {
        crate::builders::AgentCardBuilder::new(
            "Echo Agent",
            "Echoes messages back to the user",
            "1.0.0",
        )
        .with_streaming(true)
        .build()
    }
}

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, question: &str) -> Result<String, BoxError> {
        Ok(format!("Echo: {question}"))
    }

    fn respond_stream(&self, question: String) -> BoxStream<'static, Result<String, BoxError>> {
        let answer = format!("Echo: {question}");
        let words: Vec<Result<String, BoxError>> = answer
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect();
        futures::stream::iter(words).boxed()
    }
}

// ---------------------------------------------------------------------------
// ResponderAdapter
// ---------------------------------------------------------------------------

/// [`AgentAdapter`] backed by a single [`Responder`] and a card template.
pub struct ResponderAdapter<R> {
    responder: Arc<R>,
    card: AgentCard,
    stream_capacity: usize,
}

impl<R: Responder> ResponderAdapter<R> {
    /// Wrap `responder`; `card` is served with its `url` replaced per query.
    pub fn new(responder: R, card: AgentCard) -> Self {
        Self {
            responder: Arc::new(responder),
            card,
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }

    /// Bound of the delta channel used for streaming answers.
    pub fn with_stream_capacity(mut self, capacity: usize) -> Self {
        self.stream_capacity = capacity.max(1);
        self
    }

    /// The wrapped responder.
    pub fn responder(&self) -> &R {
        &self.responder
    }
}

impl ResponderAdapter<EchoResponder> {
    /// The echo agent.
    pub fn echo() -> Self {
        Self::new(EchoResponder, EchoResponder::agent_card())
    }
}

/// Text carried by a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("responder panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("responder panicked: {s}")
    } else {
        "responder panicked".to_string()
    }
}

/// The question is the text of the first text part.
fn extract_question(message: &Message) -> A2AResult<String> {
    message
        .first_text()
        .map(str::to_string)
        .ok_or_else(|| A2AError::empty_message("message has no text part"))
}

#[async_trait]
impl<R: Responder> AgentAdapter for ResponderAdapter<R> {
    async fn on_message(
        &self,
        params: SendMessageParams,
        cancel: CancellationToken,
    ) -> A2AResult<Message> {
        let question = extract_question(&params.message)?;

        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(A2AError::cancelled("request cancelled while responding"));
            }
            answer = AssertUnwindSafe(self.responder.respond(&question)).catch_unwind() => answer,
        };

        match answer {
            Ok(Ok(text)) => Ok(new_agent_text_message(
                text,
                params.message.context_id.clone(),
            )),
            Ok(Err(e)) => {
                warn!(error = %e, "Responder failed");
                Err(A2AError::responder_failure(e.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(error = %message, "Responder panicked");
                Err(A2AError::responder_failure(message))
            }
        }
    }

    async fn on_message_stream(
        &self,
        params: SendMessageParams,
        cancel: CancellationToken,
    ) -> A2AResult<DeltaReceiver> {
        let question = extract_question(&params.message)?;
        let increments = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.responder.respond_stream(question)
        }))
        .map_err(|payload| {
            let message = panic_message(payload.as_ref());
            warn!(error = %message, "Responder panicked");
            A2AError::responder_failure(message)
        })?;
        let (tx, rx) = delta_channel(params.message.context_id.clone(), self.stream_capacity);
        tokio::spawn(relay_increments(increments, tx, cancel));
        Ok(rx)
    }

    async fn on_agent_card(
        &self,
        agent_url: &str,
        _cancel: CancellationToken,
    ) -> A2AResult<AgentCard> {
        Ok(self.card.with_url(agent_url))
    }
}

/// Forward responder increments into the delta channel until the responder
/// finishes or fails, or nobody is listening any more. A panic while producing
/// an increment is reported as a responder failure.
async fn relay_increments(
    increments: BoxStream<'static, Result<String, BoxError>>,
    mut tx: DeltaSender,
    cancel: CancellationToken,
) {
    let mut increments = AssertUnwindSafe(increments).catch_unwind();
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(message_id = %tx.message_id(), sent = tx.sent(), "Producer cancelled");
                return;
            }
            _ = tx.closed() => {
                debug!(message_id = %tx.message_id(), sent = tx.sent(), "Receiver dropped, producer stopping");
                return;
            }
            next = increments.next() => next,
        };

        match next {
            Some(Ok(Ok(text))) if text.is_empty() => continue,
            Some(Ok(Ok(text))) => {
                if tx.send_text(text).await.is_err() {
                    return;
                }
            }
            Some(Ok(Err(e))) => {
                warn!(error = %e, sent = tx.sent(), "Responder failed mid-stream");
                tx.fail(A2AError::responder_failure(e.to_string())).await;
                return;
            }
            Some(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                warn!(error = %message, sent = tx.sent(), "Responder panicked mid-stream");
                tx.fail(A2AError::responder_failure(message)).await;
                return;
            }
            None => return,
        }
    }
}
