//! Well-known paths of the HTTP bindings.

/// The well-known path for the agent card.
pub const AGENT_CARD_WELL_KNOWN_PATH: &str = "/.well-known/agent-card.json";

/// Alternate card path served next to the well-known one.
pub const CARD_PATH: &str = "/v1/card";

/// REST path for a unary exchange.
pub const MESSAGE_SEND_PATH: &str = "/v1/message:send";

/// REST path for a streaming exchange.
pub const MESSAGE_STREAM_PATH: &str = "/v1/message:stream";

/// JSON-RPC method for a unary exchange.
pub const METHOD_MESSAGE_SEND: &str = "message/send";

/// JSON-RPC method for a streaming exchange.
pub const METHOD_MESSAGE_STREAM: &str = "message/stream";

/// SSE event name of a delta frame.
pub const SSE_EVENT_DELTA: &str = "delta";

/// SSE event name of an error frame.
pub const SSE_EVENT_ERROR: &str = "error";

/// SSE event name of the completion frame.
pub const SSE_EVENT_DONE: &str = "done";
