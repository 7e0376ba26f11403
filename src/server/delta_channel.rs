//! Delta channel: the bounded pipe between a streaming producer and the
//! transport that drains it.
//!
//! A producer (usually the task spawned by
//! [`ResponderAdapter`](super::ResponderAdapter)) pushes text increments
//! through a [`DeltaSender`]; the HTTP layer reads them from the matching
//! [`DeltaReceiver`], which is a `futures::Stream`.
//!
//! Closing works in both directions:
//! - dropping the sender ends the stream (`None`) after every buffered delta
//!   has been read;
//! - dropping the receiver closes the channel, so the next `send_text` fails
//!   and [`DeltaSender::closed`] resolves.
//!
//! A receiver can be tied to a [`CancellationToken`]: once the token fires the
//! stream yields a single `Cancelled` error and ends.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::debug;

use crate::error::{A2AError, A2AResult};
use crate::types::TextDelta;

use super::task_manager::RequestState;

/// Create a bounded delta channel for one exchange.
///
/// Every delta sent through the returned sender carries `context_id` and a
/// message id shared by the whole exchange.
pub fn delta_channel(context_id: Option<String>, capacity: usize) -> (DeltaSender, DeltaReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let message_id = uuid::Uuid::new_v4().to_string();
    let sender = DeltaSender {
        tx,
        message_id,
        context_id: context_id.clone(),
        next_index: 0,
    };
    let receiver = DeltaReceiver {
        rx,
        cancel: None,
        request_id: None,
        context_id,
        delivered: 0,
        state: RequestState::Dispatched,
    };
    (sender, receiver)
}

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

/// Producer half of a delta channel.
#[derive(Debug)]
pub struct DeltaSender {
    tx: mpsc::Sender<A2AResult<TextDelta>>,
    message_id: String,
    context_id: Option<String>,
    next_index: u64,
}

impl DeltaSender {
    /// Send one increment, waiting for buffer space.
    ///
    /// Fails with [`A2AError::Cancelled`] when the receiver is gone; the
    /// producer should stop at that point.
    pub async fn send_text(&mut self, text: impl Into<String>) -> A2AResult<()> {
        let delta = TextDelta::new(
            text,
            self.next_index,
            self.message_id.clone(),
            self.context_id.clone(),
        );
        self.tx
            .send(Ok(delta))
            .await
            .map_err(|_| A2AError::cancelled("delta receiver dropped"))?;
        self.next_index += 1;
        Ok(())
    }

    /// Terminate the stream with an error item.
    ///
    /// Deltas already sent are still delivered first.
    pub async fn fail(self, err: A2AError) {
        if self.tx.send(Err(err)).await.is_err() {
            debug!(message_id = %self.message_id, "Error dropped, receiver already gone");
        }
    }

    /// Resolves once the receiver has been dropped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    /// Whether the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Id of the logical response message all deltas belong to.
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Number of deltas sent so far.
    pub fn sent(&self) -> u64 {
        self.next_index
    }
}

// ---------------------------------------------------------------------------
// Receiver
// ---------------------------------------------------------------------------

/// Consumer half of a delta channel.
///
/// Yields `Ok(delta)` in send order, then ends. An `Err` item is always the
/// last item of the stream.
pub struct DeltaReceiver {
    rx: mpsc::Receiver<A2AResult<TextDelta>>,
    cancel: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    request_id: Option<String>,
    context_id: Option<String>,
    delivered: u64,
    state: RequestState,
}

impl DeltaReceiver {
    /// End the stream with a trailing `Cancelled` item once `token` fires.
    ///
    /// Cancellation wins over buffered deltas.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(Box::pin(token.cancelled_owned()));
        self
    }

    pub(crate) fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Stamp `context_id` on every delta yielded from now on, whatever the
    /// producer put there.
    pub(crate) fn with_context_id(mut self, context_id: Option<String>) -> Self {
        if context_id.is_some() {
            self.context_id = context_id;
        }
        self
    }

    /// Receive the next item; `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<A2AResult<TextDelta>> {
        self.next().await
    }

    /// Current state of the exchange feeding this receiver.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Number of deltas yielded so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    fn finish(&mut self, state: RequestState) {
        self.state = state;
        self.cancel = None;
        self.rx.close();
        debug!(
            request_id = ?self.request_id,
            context_id = ?self.context_id,
            deltas = self.delivered,
            state = %state,
            "Delta stream finished"
        );
    }
}

impl Stream for DeltaReceiver {
    type Item = A2AResult<TextDelta>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.is_finished() {
            return Poll::Ready(None);
        }

        if let Some(cancel) = this.cancel.as_mut() {
            if cancel.as_mut().poll(cx).is_ready() {
                this.finish(RequestState::Cancelled);
                return Poll::Ready(Some(Err(A2AError::cancelled("request cancelled"))));
            }
        }

        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(mut delta))) => {
                if this.context_id.is_some() && delta.context_id != this.context_id {
                    delta.context_id = this.context_id.clone();
                }
                this.delivered += 1;
                Poll::Ready(Some(Ok(delta)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.finish(RequestState::from(err.outcome()));
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finish(RequestState::Completed);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl std::fmt::Debug for DeltaReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaReceiver")
            .field("request_id", &self.request_id)
            .field("context_id", &self.context_id)
            .field("delivered", &self.delivered)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for DeltaReceiver {
    fn drop(&mut self) {
        if !self.is_finished() {
            debug!(
                request_id = ?self.request_id,
                context_id = ?self.context_id,
                deltas = self.delivered,
                "Delta receiver dropped before the stream ended"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn deltas_arrive_in_order_with_shared_message_id() {
        let (mut tx, mut rx) = delta_channel(Some("conv-1".to_string()), 8);
        tx.send_text("Hel").await.unwrap();
        tx.send_text("lo").await.unwrap();
        drop(tx);

        let first = rx.recv().await.unwrap().unwrap();
        let second = rx.recv().await.unwrap().unwrap();
        assert!(rx.recv().await.is_none());

        assert_eq!((first.index, first.text.as_str()), (0, "Hel"));
        assert_eq!((second.index, second.text.as_str()), (1, "lo"));
        assert_eq!(first.message_id, second.message_id);
        assert_eq!(first.context_id.as_deref(), Some("conv-1"));
        assert_eq!(rx.state(), RequestState::Completed);
    }

    #[tokio::test]
    async fn receiver_context_overrides_producer_context() {
        let (mut tx, rx) = delta_channel(Some("other-conv".to_string()), 8);
        let mut rx = rx.with_context_id(Some("conv-123".to_string()));
        tx.send_text("a").await.unwrap();
        drop(tx);

        let delta = rx.recv().await.unwrap().unwrap();
        assert_eq!(delta.context_id.as_deref(), Some("conv-123"));
    }

    #[tokio::test]
    async fn error_is_the_last_item() {
        let (mut tx, mut rx) = delta_channel(None, 8);
        tx.send_text("partial").await.unwrap();
        tx.fail(A2AError::responder_failure("boom")).await;

        assert_eq!(rx.recv().await.unwrap().unwrap().text, "partial");
        let err = rx.recv().await.unwrap().unwrap_err();
        assert!(matches!(err, A2AError::ResponderFailure { .. }));
        assert!(rx.recv().await.is_none());
        assert_eq!(rx.state(), RequestState::Failed);
    }

    #[tokio::test]
    async fn dropping_receiver_closes_sender() {
        let (mut tx, rx) = delta_channel(None, 1);
        drop(rx);
        assert!(tx.is_closed());
        tokio::time::timeout(Duration::from_secs(1), tx.closed())
            .await
            .unwrap();
        let err = tx.send_text("late").await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_ends_stream_with_cancelled_item() {
        let token = CancellationToken::new();
        let (mut tx, rx) = delta_channel(None, 8);
        let mut rx = rx.with_cancellation(token.clone());

        tx.send_text("a").await.unwrap();
        assert_eq!(rx.recv().await.unwrap().unwrap().text, "a");

        token.cancel();
        let err = rx.recv().await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert!(rx.recv().await.is_none());
        assert_eq!(rx.state(), RequestState::Cancelled);
        assert!(tx.is_closed());
    }
}
