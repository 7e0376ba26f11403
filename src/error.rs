//! A2A error types: JSON-RPC error codes + exchange-specific errors.
//!
//! One enum covers both sides of an exchange:
//! - Standard JSON-RPC 2.0 errors (-32700 through -32603)
//! - Exchange errors raised by the server dispatch hub (-32001, -32004,
//!   -32010 through -32013)
//! - Client/transport-side errors that never travel on the wire

use crate::types::JsonRpcError;

// ---------------------------------------------------------------------------
// Standard JSON-RPC 2.0 error codes
// ---------------------------------------------------------------------------

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i64 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;

/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// Exchange error codes
// ---------------------------------------------------------------------------

/// The requested card or endpoint does not exist.
pub const NOT_FOUND: i64 = -32001;

/// The requested operation is not supported (e.g. streaming on a card that
/// does not advertise it).
pub const UNSUPPORTED_OPERATION: i64 = -32004;

/// No agent adapter is attached to the task manager.
pub const NOT_ATTACHED: i64 = -32010;

/// The request message carries no usable text part.
pub const EMPTY_MESSAGE: i64 = -32011;

/// The exchange was cancelled before it completed.
pub const REQUEST_CANCELLED: i64 = -32012;

/// The underlying responder reported a fault.
pub const RESPONDER_FAILURE: i64 = -32013;

// ---------------------------------------------------------------------------
// A2AError enum
// ---------------------------------------------------------------------------

/// Unified error type for all A2A exchange and JSON-RPC errors.
///
/// Protocol variants carry a human-readable message and an optional
/// structured `data` payload; they map one-to-one onto JSON-RPC error codes
/// and survive a round trip over the wire (see [`A2AError::from_rpc_error`]).
///
/// Transport variants (`Transport`, `Timeout`, `Http`, `Protocol`) are
/// produced on the client and are never sent by a server.
#[derive(Debug, Clone, thiserror::Error)]
pub enum A2AError {
    // -- JSON-RPC protocol errors --
    /// Invalid JSON payload (code -32700).
    #[error("Parse error: {message}")]
    ParseError {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data (e.g. parse error details).
        data: Option<serde_json::Value>,
    },

    /// Request payload validation error (code -32600).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Method not found (code -32601).
    #[error("Method not found: {message}")]
    MethodNotFound {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Invalid parameters (code -32602).
    #[error("Invalid params: {message}")]
    InvalidParams {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Internal error (code -32603).
    #[error("Internal error: {message}")]
    InternalError {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    // -- Exchange errors --
    /// Card or endpoint not found (code -32001, HTTP 404).
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Operation not supported (code -32004).
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// No agent adapter attached to the task manager (code -32010).
    #[error("No agent attached: {message}")]
    NotAttached {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// The request has no usable text part (code -32011).
    #[error("Empty message: {message}")]
    EmptyMessage {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Cooperative cancellation was honored (code -32012).
    ///
    /// Not a failure: see [`A2AError::outcome`].
    #[error("Cancelled: {message}")]
    Cancelled {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// The underlying responder faulted (code -32013).
    #[error("Responder failure: {message}")]
    ResponderFailure {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    // -- Client/transport-side errors (not exchange error codes) --
    /// Transport-level error (connection failed, request failed, stream cut).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request or stream timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error with status code and response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Malformed response body received from the remote agent.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A JSON-RPC error with a code this crate does not model.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Catch-all for errors that don't fit other categories.
    #[error("{0}")]
    Other(String),
}

/// Convenience result type for A2A operations.
pub type A2AResult<T> = Result<T, A2AError>;

/// Terminal classification of an exchange.
///
/// Cancellation is a terminal state of its own, distinct from failure, so a
/// caller can decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
    /// The exchange produced its full response.
    Completed,
    /// The exchange was cancelled; partial output may have been delivered.
    Cancelled,
    /// The exchange failed; partial output may have been delivered.
    Failed,
}

impl ExchangeOutcome {
    /// Classify the result of an exchange.
    pub fn of<T>(result: &A2AResult<T>) -> Self {
        match result {
            Ok(_) => ExchangeOutcome::Completed,
            Err(e) => e.outcome(),
        }
    }
}

impl std::fmt::Display for ExchangeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeOutcome::Completed => write!(f, "completed"),
            ExchangeOutcome::Cancelled => write!(f, "cancelled"),
            ExchangeOutcome::Failed => write!(f, "failed"),
        }
    }
}

impl A2AError {
    // -- Convenience constructors (message-only, no data) --

    /// Create a `ParseError` with a message and no data.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InvalidRequest` with a message and no data.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `MethodNotFound` with a message and no data.
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::MethodNotFound {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InvalidParams` with a message and no data.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InternalError` with a message and no data.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `NotFound` with a message and no data.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `UnsupportedOperation` with a message and no data.
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `NotAttached` with a message and no data.
    pub fn not_attached(message: impl Into<String>) -> Self {
        Self::NotAttached {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `EmptyMessage` with a message and no data.
    pub fn empty_message(message: impl Into<String>) -> Self {
        Self::EmptyMessage {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `Cancelled` with a message and no data.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `ResponderFailure` with a message and no data.
    pub fn responder_failure(message: impl Into<String>) -> Self {
        Self::ResponderFailure {
            message: message.into(),
            data: None,
        }
    }

    /// Returns the JSON-RPC error code for this error variant.
    ///
    /// For transport/client-side errors that don't map to exchange codes,
    /// returns -32603 (internal error).
    pub fn code(&self) -> i64 {
        match self {
            A2AError::ParseError { .. } => PARSE_ERROR,
            A2AError::InvalidRequest { .. } => INVALID_REQUEST,
            A2AError::MethodNotFound { .. } => METHOD_NOT_FOUND,
            A2AError::InvalidParams { .. } => INVALID_PARAMS,
            A2AError::InternalError { .. } => INTERNAL_ERROR,
            A2AError::NotFound { .. } => NOT_FOUND,
            A2AError::UnsupportedOperation { .. } => UNSUPPORTED_OPERATION,
            A2AError::NotAttached { .. } => NOT_ATTACHED,
            A2AError::EmptyMessage { .. } => EMPTY_MESSAGE,
            A2AError::Cancelled { .. } => REQUEST_CANCELLED,
            A2AError::ResponderFailure { .. } => RESPONDER_FAILURE,
            A2AError::Transport(_)
            | A2AError::Timeout(_)
            | A2AError::Http { .. }
            | A2AError::Protocol(_)
            | A2AError::Other(_) => INTERNAL_ERROR,
            A2AError::JsonRpc { code, .. } => *code,
        }
    }

    /// The bare message carried by this error, without the variant prefix
    /// added by `Display`.
    pub fn message(&self) -> String {
        match self {
            A2AError::ParseError { message, .. }
            | A2AError::InvalidRequest { message, .. }
            | A2AError::MethodNotFound { message, .. }
            | A2AError::InvalidParams { message, .. }
            | A2AError::InternalError { message, .. }
            | A2AError::NotFound { message, .. }
            | A2AError::UnsupportedOperation { message, .. }
            | A2AError::NotAttached { message, .. }
            | A2AError::EmptyMessage { message, .. }
            | A2AError::Cancelled { message, .. }
            | A2AError::ResponderFailure { message, .. }
            | A2AError::JsonRpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error is a honored cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, A2AError::Cancelled { .. })
    }

    /// Whether this error was raised by the transport rather than reported
    /// by the remote agent.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            A2AError::Transport(_) | A2AError::Timeout(_) | A2AError::Http { .. }
        )
    }

    /// Terminal classification of an exchange that ended with this error.
    pub fn outcome(&self) -> ExchangeOutcome {
        if self.is_cancelled() {
            ExchangeOutcome::Cancelled
        } else {
            ExchangeOutcome::Failed
        }
    }

    /// Rebuild a typed error from a JSON-RPC error object received on the
    /// wire. Codes this crate does not model become [`A2AError::JsonRpc`].
    pub fn from_rpc_error(error: JsonRpcError) -> Self {
        let JsonRpcError {
            code,
            message,
            data,
        } = error;
        match code {
            PARSE_ERROR => A2AError::ParseError { message, data },
            INVALID_REQUEST => A2AError::InvalidRequest { message, data },
            METHOD_NOT_FOUND => A2AError::MethodNotFound { message, data },
            INVALID_PARAMS => A2AError::InvalidParams { message, data },
            NOT_FOUND => A2AError::NotFound { message, data },
            UNSUPPORTED_OPERATION => A2AError::UnsupportedOperation { message, data },
            NOT_ATTACHED => A2AError::NotAttached { message, data },
            EMPTY_MESSAGE => A2AError::EmptyMessage { message, data },
            REQUEST_CANCELLED => A2AError::Cancelled { message, data },
            RESPONDER_FAILURE => A2AError::ResponderFailure { message, data },
            _ => A2AError::JsonRpc {
                code,
                message,
                data,
            },
        }
    }
}

impl From<A2AError> for JsonRpcError {
    fn from(err: A2AError) -> Self {
        let code = err.code();
        let message = err.message();
        let data = match err {
            A2AError::ParseError { data, .. }
            | A2AError::InvalidRequest { data, .. }
            | A2AError::MethodNotFound { data, .. }
            | A2AError::InvalidParams { data, .. }
            | A2AError::InternalError { data, .. }
            | A2AError::NotFound { data, .. }
            | A2AError::UnsupportedOperation { data, .. }
            | A2AError::NotAttached { data, .. }
            | A2AError::EmptyMessage { data, .. }
            | A2AError::Cancelled { data, .. }
            | A2AError::ResponderFailure { data, .. }
            | A2AError::JsonRpc { data, .. } => data,
            _ => None,
        };
        JsonRpcError {
            code,
            message,
            data,
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(err: serde_json::Error) -> Self {
        A2AError::ParseError {
            message: err.to_string(),
            data: None,
        }
    }
}
