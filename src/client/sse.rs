//! Server-Sent Events (SSE) handling for streaming exchanges.
//!
//! A background task reads the HTTP response body, groups `event:` and
//! `data:` lines into frames (a blank line dispatches a frame) and sends the
//! decoded [`TextDelta`]s through a channel. Both bindings are understood:
//!
//! - REST: `event: delta` frames carrying a bare `TextDelta`, a terminal
//!   `event: error` frame carrying `{code, message}`;
//! - JSON-RPC: every frame a JSON-RPC response envelope whose `result` is a
//!   `TextDelta` or whose `error` is the failure.
//!
//! A `done` frame marks completion. A body that ends without one is reported
//! as a transport error.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::{A2AError, A2AResult, ExchangeOutcome};
use crate::types::{JsonRpcError, TextDelta};
use crate::utils::constants::{SSE_EVENT_DONE, SSE_EVENT_ERROR};

/// Buffer between the reader task and the consumer.
const CHANNEL_CAPACITY: usize = 64;

/// A lazy, finite stream of text deltas from one streaming exchange.
///
/// Ends with `None` when the server signals completion; an `Err` item is
/// always the last item. Dropping the stream aborts the reader task and
/// closes the connection.
///
/// # Example
///
/// ```no_run
/// # async fn example(mut stream: a2a_bridge::client::DeltaStream) {
/// while let Some(delta) = stream.next().await {
///     match delta {
///         Ok(delta) => print!("{}", delta.text),
///         Err(e) => eprintln!("stream error: {}", e),
///     }
/// }
/// # }
/// ```
pub struct DeltaStream {
    receiver: mpsc::Receiver<A2AResult<TextDelta>>,
    task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for DeltaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaStream").finish_non_exhaustive()
    }
}

impl DeltaStream {
    /// Create a `DeltaStream` from a raw `reqwest::Response`.
    ///
    /// Spawns a background task that reads the response body and sends
    /// parsed deltas through a channel.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let task = tokio::spawn(async move {
            if let Err(e) = read_sse_body(response, &tx).await {
                // Receiver may already be gone.
                let _ = tx.send(Err(e)).await;
            }
        });

        Self { receiver: rx, task }
    }

    /// Get the next delta.
    ///
    /// Returns `None` once the stream has completed.
    pub async fn next(&mut self) -> Option<A2AResult<TextDelta>> {
        self.receiver.recv().await
    }

    /// Consume the whole stream.
    ///
    /// Collects everything received, including the partial text that arrived
    /// before a failure.
    pub async fn drain(mut self) -> StreamTranscript {
        let mut transcript = StreamTranscript::default();
        while let Some(item) = self.receiver.recv().await {
            match item {
                Ok(delta) => {
                    transcript.text.push_str(&delta.text);
                    transcript.deltas.push(delta);
                }
                Err(e) => {
                    transcript.error = Some(e);
                    break;
                }
            }
        }
        transcript
    }
}

impl Stream for DeltaStream {
    type Item = A2AResult<TextDelta>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for DeltaStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Everything a drained [`DeltaStream`] delivered.
#[derive(Debug, Default)]
pub struct StreamTranscript {
    /// Concatenated text of all deltas received.
    pub text: String,
    /// The deltas, in arrival order.
    pub deltas: Vec<TextDelta>,
    /// The error that ended the stream, if it did not complete.
    pub error: Option<A2AError>,
}

impl StreamTranscript {
    /// How the exchange ended.
    pub fn outcome(&self) -> ExchangeOutcome {
        match &self.error {
            None => ExchangeOutcome::Completed,
            Some(e) => e.outcome(),
        }
    }

    /// The full text, or the error that ended the stream.
    pub fn into_result(self) -> A2AResult<String> {
        match self.error {
            None => Ok(self.text),
            Some(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// One decoded SSE frame.
#[derive(Debug, PartialEq)]
enum Frame {
    Delta(TextDelta),
    Done,
}

/// Lines of a frame that has not been dispatched yet.
#[derive(Debug, Default)]
struct PendingFrame {
    event: Option<String>,
    data: Option<String>,
}

impl PendingFrame {
    fn push_line(&mut self, line: &str) {
        // Comments (keep-alives).
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            // id:, retry:
            _ => {}
        }
    }

    fn take(&mut self) -> Option<(Option<String>, String)> {
        if self.event.is_none() && self.data.is_none() {
            return None;
        }
        let event = self.event.take();
        let data = self.data.take().unwrap_or_default();
        Some((event, data))
    }
}

/// Read the response body, forwarding deltas to `tx` until a `done` frame.
async fn read_sse_body(
    response: reqwest::Response,
    tx: &mpsc::Sender<A2AResult<TextDelta>>,
) -> A2AResult<()> {
    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut pending = PendingFrame::default();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            if e.is_timeout() {
                A2AError::Timeout(format!("timed out reading SSE stream: {e}"))
            } else {
                A2AError::Transport(format!("error reading SSE stream: {e}"))
            }
        })?;
        buffer.extend_from_slice(&chunk);

        while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = buffer.drain(..=newline).collect();
            let line = std::str::from_utf8(&raw)
                .map_err(|e| A2AError::Protocol(format!("invalid UTF-8 in SSE stream: {e}")))?
                .trim_end_matches(['\n', '\r']);

            if !line.is_empty() {
                pending.push_line(line);
                continue;
            }

            let Some((event, data)) = pending.take() else {
                continue;
            };
            match parse_sse_event(event.as_deref(), &data)? {
                Some(Frame::Done) => return Ok(()),
                Some(Frame::Delta(delta)) => {
                    if tx.send(Ok(delta)).await.is_err() {
                        // Receiver dropped, stop reading.
                        return Ok(());
                    }
                }
                None => {}
            }
        }
    }

    // A final frame without its trailing blank line.
    if let Ok(rest) = std::str::from_utf8(&buffer) {
        let rest = rest.trim_end_matches(['\n', '\r']);
        if !rest.is_empty() {
            pending.push_line(rest);
        }
    }
    if let Some((event, data)) = pending.take() {
        match parse_sse_event(event.as_deref(), &data)? {
            Some(Frame::Done) => return Ok(()),
            Some(Frame::Delta(delta)) => {
                let _ = tx.send(Ok(delta)).await;
            }
            None => {}
        }
    }

    Err(A2AError::Transport(
        "stream ended without a completion signal".to_string(),
    ))
}

/// Decode one frame.
///
/// Returns `Ok(None)` for frames that carry nothing (empty data), and `Err`
/// for an error frame or undecodable data.
fn parse_sse_event(event: Option<&str>, data: &str) -> A2AResult<Option<Frame>> {
    if event == Some(SSE_EVENT_DONE) {
        return Ok(Some(Frame::Done));
    }

    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    if data == "[DONE]" {
        return Ok(Some(Frame::Done));
    }

    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        A2AError::Protocol(format!("failed to parse SSE event data: {e} (data: {data})"))
    })?;

    // JSON-RPC envelope: unwrap `result`, or surface `error`.
    let payload = if value.get("jsonrpc").is_some() {
        if let Some(error) = value.get("error") {
            return Err(decode_error(error.clone(), data));
        }
        value.get("result").cloned().ok_or_else(|| {
            A2AError::Protocol(format!(
                "JSON-RPC SSE response has neither 'result' nor 'error': {data}"
            ))
        })?
    } else if event == Some(SSE_EVENT_ERROR) {
        return Err(decode_error(value, data));
    } else {
        value
    };

    let delta: TextDelta = serde_json::from_value(payload).map_err(|e| {
        A2AError::Protocol(format!(
            "failed to parse SSE event as a text delta: {e} (data: {data})"
        ))
    })?;
    Ok(Some(Frame::Delta(delta)))
}

fn decode_error(value: serde_json::Value, raw: &str) -> A2AError {
    match serde_json::from_value::<JsonRpcError>(value) {
        Ok(rpc_err) => A2AError::from_rpc_error(rpc_err),
        Err(e) => A2AError::Protocol(format!("malformed SSE error frame: {e} (data: {raw})")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_done_event() {
        assert_eq!(parse_sse_event(Some("done"), "").unwrap(), Some(Frame::Done));
        assert_eq!(parse_sse_event(None, "[DONE]").unwrap(), Some(Frame::Done));
    }

    #[test]
    fn test_parse_empty_data() {
        assert!(parse_sse_event(Some("delta"), "").unwrap().is_none());
        assert!(parse_sse_event(None, "  ").unwrap().is_none());
    }

    #[test]
    fn test_parse_rest_delta() {
        let data = r#"{"kind":"text-delta","text":"Hel","index":0,"messageId":"m"}"#;
        match parse_sse_event(Some("delta"), data).unwrap() {
            Some(Frame::Delta(delta)) => {
                assert_eq!(delta.text, "Hel");
                assert_eq!(delta.index, 0);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_parse_jsonrpc_delta() {
        let data = r#"{"jsonrpc":"2.0","id":1,"result":{"kind":"text-delta","text":"lo","index":1,"messageId":"m"}}"#;
        match parse_sse_event(Some("delta"), data).unwrap() {
            Some(Frame::Delta(delta)) => assert_eq!(delta.text, "lo"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_frames() {
        let err = parse_sse_event(Some("error"), r#"{"code":-32013,"message":"model offline"}"#)
            .unwrap_err();
        assert!(matches!(err, A2AError::ResponderFailure { .. }));
        assert_eq!(err.message(), "model offline");

        let err = parse_sse_event(
            Some("error"),
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32012,"message":"stop"}}"#,
        )
        .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_sse_event(None, "{not valid json}").unwrap_err();
        assert!(matches!(err, A2AError::Protocol(_)));
    }

    #[test]
    fn test_pending_frame_assembly() {
        let mut pending = PendingFrame::default();
        assert!(pending.take().is_none());

        pending.push_line(": keep-alive");
        assert!(pending.take().is_none());

        pending.push_line("event: delta");
        pending.push_line("data: {\"a\":");
        pending.push_line("data:1}");
        pending.push_line("id: 7");
        let (event, data) = pending.take().unwrap();
        assert_eq!(event.as_deref(), Some("delta"));
        assert_eq!(data, "{\"a\":\n1}");
        assert!(pending.take().is_none());
    }

    #[test]
    fn test_transcript_outcome() {
        let transcript = StreamTranscript {
            text: "Echo: ".to_string(),
            deltas: vec![],
            error: Some(A2AError::responder_failure("boom")),
        };
        assert_eq!(transcript.outcome(), ExchangeOutcome::Failed);
        assert!(transcript.into_result().is_err());
        assert_eq!(
            StreamTranscript::default().outcome(),
            ExchangeOutcome::Completed
        );
    }
}
