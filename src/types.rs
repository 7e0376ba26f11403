//! Wire types for card discovery and message exchange.
//!
//! Everything here is a plain value type with camelCase JSON serialization:
//! the capability card, the chat message and its parts, the streaming
//! text delta, and the JSON-RPC 2.0 envelope used by the JSON-RPC binding.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Enums
// ============================================================================

/// The sender of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user (the calling side of an exchange).
    User,
    /// Message from the agent.
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

// ============================================================================
// Message & Parts
// ============================================================================

/// A single chat message.
///
/// JSON: `{"kind": "message", "role": "user", "messageId": "…",
/// "contextId": "…", "parts": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Discriminator field, always "message".
    #[serde(default = "kind_message")]
    pub kind: String,

    /// Who sent this message.
    pub role: Role,

    /// Unique message identifier. Generated when the sender omits it.
    #[serde(default = "new_message_id")]
    pub message_id: String,

    /// Conversation this message belongs to. Copied from request to response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Content parts of the message, in order.
    #[serde(default)]
    pub parts: Vec<Part>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A content part within a message.
///
/// Discriminated by the `kind` field:
/// - Text: `{"kind": "text", "text": "hello"}`
/// - Data: `{"kind": "data", "data": {"key": "value"}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Part {
    /// A text content part. Discriminator: `"text"`.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
        /// Optional metadata associated with this part.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A structured data content part. Discriminator: `"data"`.
    #[serde(rename = "data")]
    Data {
        /// Arbitrary structured data.
        data: serde_json::Value,
        /// Optional metadata associated with this part.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

/// One increment of a streamed answer.
///
/// All deltas of one exchange share a `messageId`; `index` is the 0-based
/// position of the increment, so concatenating `text` in `index` order
/// rebuilds the full answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDelta {
    /// Discriminator field, always "text-delta".
    #[serde(default = "kind_text_delta")]
    pub kind: String,

    /// The increment.
    pub text: String,

    /// Position of this increment within its exchange.
    pub index: u64,

    /// Conversation of the originating request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Id of the logical response message.
    pub message_id: String,
}

fn kind_message() -> String {
    "message".to_string()
}

fn kind_text_delta() -> String {
    "text-delta".to_string()
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Protocol version assumed for cards that do not declare one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "0.3.0";

// ============================================================================
// Agent Card & Related Types
// ============================================================================

/// Self-describing manifest for an agent, served at a well-known path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Human-readable name.
    pub name: String,

    /// Description of the agent's capabilities.
    pub description: String,

    /// Base URL of the agent as seen by the caller.
    pub url: String,

    /// Agent version string.
    pub version: String,

    /// Declared protocol version. See [`AgentCard::protocol_version`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,

    /// Default input modes, in preference order (e.g. "text").
    #[serde(default)]
    pub default_input_modes: Vec<String>,

    /// Default output modes, in preference order.
    #[serde(default)]
    pub default_output_modes: Vec<String>,

    /// Agent capabilities.
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Skills the agent supports. Unique by `id`.
    #[serde(default)]
    pub skills: Vec<AgentSkill>,

    /// Service provider information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,

    /// URL to the agent's documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    /// Declared `extensions` bag, kept as raw JSON. Unknown top-level keys
    /// are not captured here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl AgentCard {
    /// Copy of this card with `url` replaced by the caller-visible base URL.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        AgentCard {
            url: url.into(),
            ..self.clone()
        }
    }

    /// Protocol version, falling back to [`DEFAULT_PROTOCOL_VERSION`].
    pub fn protocol_version(&self) -> &str {
        self.protocol_version
            .as_deref()
            .unwrap_or(DEFAULT_PROTOCOL_VERSION)
    }

    /// Whether the card advertises streaming responses.
    pub fn supports_streaming(&self) -> bool {
        self.capabilities.streaming
    }

    /// Look up a skill by id.
    pub fn skill(&self, id: &str) -> Option<&AgentSkill> {
        self.skills.iter().find(|s| s.id == id)
    }
}

/// Agent capabilities declaration. Absent flags read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Whether the agent supports streaming responses.
    #[serde(default)]
    pub streaming: bool,

    /// Whether the agent supports push notifications.
    #[serde(default)]
    pub push_notifications: bool,
}

/// A skill that an agent can perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    /// Unique skill identifier.
    pub id: String,

    /// Human-readable skill name.
    pub name: String,

    /// Description of what the skill does.
    pub description: String,

    /// Categorization tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Example prompts/inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,

    /// Named operations exposed by this skill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<SkillOperation>>,
}

/// One operation of a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillOperation {
    /// Operation name.
    pub name: String,

    /// What the operation does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Information about the agent's provider/organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProvider {
    /// Organization name.
    pub organization: String,

    /// Organization URL.
    pub url: String,
}

// ============================================================================
// JSON-RPC Foundation
// ============================================================================

/// A JSON-RPC 2.0 request ID.
///
/// Can be a string, number, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// String identifier.
    String(String),
    /// Numeric identifier.
    Number(i64),
    /// Null.
    Null,
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "{}", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
            JsonRpcId::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Method name.
    pub method: String,

    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` will be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier this response corresponds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Successful result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a successful JSON-RPC response.
    pub fn success(id: Option<JsonRpcId>, result: serde_json::Value) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error JSON-RPC response.
    pub fn error(id: Option<JsonRpcId>, error: JsonRpcError) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Create a JSON-RPC error response from an [`A2AError`](crate::error::A2AError).
    pub fn from_a2a_error(id: Option<JsonRpcId>, err: crate::error::A2AError) -> Self {
        let rpc_err: JsonRpcError = err.into();
        Self::error(id, rpc_err)
    }
}

/// A JSON-RPC 2.0 error object. Also the error body of the REST binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ============================================================================
// Request Parameter Types
// ============================================================================

/// Body of `message:send` / `message:stream` (and params of the JSON-RPC
/// `message/send` / `message/stream` methods).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageParams {
    /// The message to send. Must have role `user`.
    pub message: Message,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl SendMessageParams {
    /// Wrap a message with no metadata.
    pub fn new(message: Message) -> Self {
        SendMessageParams {
            message,
            metadata: None,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Part {
    /// Create a text part.
    ///
    /// Produces JSON: `{"kind": "text", "text": "..."}`
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    /// Create a structured data part.
    ///
    /// Produces JSON: `{"kind": "data", "data": {...}}`
    pub fn data(data: serde_json::Value) -> Self {
        Part::Data {
            data,
            metadata: None,
        }
    }

    /// The text of a text part, `None` for other kinds.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl Message {
    /// Create a new user message with text content.
    pub fn user(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Message {
            kind: kind_message(),
            role: Role::User,
            message_id: message_id.into(),
            context_id: None,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }

    /// Create a new agent message with text content.
    pub fn agent(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Message {
            kind: kind_message(),
            role: Role::Agent,
            message_id: message_id.into(),
            context_id: None,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }

    /// Set the conversation id.
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// Text of the first text part, skipping data parts.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }
}

impl TextDelta {
    /// Create a delta for position `index` of message `message_id`.
    pub fn new(
        text: impl Into<String>,
        index: u64,
        message_id: impl Into<String>,
        context_id: Option<String>,
    ) -> Self {
        TextDelta {
            kind: kind_text_delta(),
            text: text.into(),
            index,
            context_id,
            message_id: message_id.into(),
        }
    }
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(
        id: impl Into<JsonRpcId>,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }
}

impl From<String> for JsonRpcId {
    fn from(s: String) -> Self {
        JsonRpcId::String(s)
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        JsonRpcId::String(s.to_string())
    }
}

impl From<i64> for JsonRpcId {
    fn from(n: i64) -> Self {
        JsonRpcId::Number(n)
    }
}

impl From<i32> for JsonRpcId {
    fn from(n: i32) -> Self {
        JsonRpcId::Number(n as i64)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_card() -> AgentCard {
        AgentCard {
            name: "Echo Agent".to_string(),
            description: "Repeats what you say".to_string(),
            url: "http://localhost:5001/echo".to_string(),
            version: "1.0.0".to_string(),
            protocol_version: Some("0.3.0".to_string()),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            capabilities: AgentCapabilities {
                streaming: true,
                push_notifications: false,
            },
            skills: vec![AgentSkill {
                id: "echo".to_string(),
                name: "Echo".to_string(),
                description: "Echoes input".to_string(),
                tags: vec!["demo".to_string()],
                examples: Some(vec!["ping".to_string()]),
                operations: Some(vec![SkillOperation {
                    name: "say".to_string(),
                    description: None,
                }]),
            }],
            provider: None,
            documentation_url: None,
            extensions: None,
        }
    }

    #[test]
    fn role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), r#""agent""#);
        let role: Role = serde_json::from_str(r#""agent""#).unwrap();
        assert_eq!(role, Role::Agent);
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn text_part_has_kind_field() {
        let json = serde_json::to_value(Part::text("Hello")).unwrap();
        assert_eq!(json, json!({"kind": "text", "text": "Hello"}));
    }

    #[test]
    fn data_part_is_not_text() {
        let part: Part = serde_json::from_value(json!({"kind": "data", "data": {"k": 1}})).unwrap();
        assert!(part.as_text().is_none());
    }

    #[test]
    fn message_serialization() {
        let msg = Message::user("m1", "Hello, agent!").with_context_id("conv-123");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "message");
        assert_eq!(json["messageId"], "m1");
        assert_eq!(json["role"], "user");
        assert_eq!(json["contextId"], "conv-123");
        assert_eq!(json["parts"][0]["text"], "Hello, agent!");
    }

    #[test]
    fn message_deserialize_fills_defaults() {
        let msg: Message = serde_json::from_value(json!({
            "role": "user",
            "parts": [{"kind": "text", "text": "ping"}]
        }))
        .unwrap();
        assert_eq!(msg.kind, "message");
        assert!(!msg.message_id.is_empty());
        assert!(msg.context_id.is_none());
        assert_eq!(msg.first_text(), Some("ping"));
    }

    #[test]
    fn first_text_skips_data_parts() {
        let mut msg = Message::user("m1", "second");
        msg.parts.insert(0, Part::data(json!({"x": 1})));
        assert_eq!(msg.first_text(), Some("second"));
    }

    #[test]
    fn text_delta_wire_format() {
        let delta = TextDelta::new("Hel", 0, "m-1", Some("c-1".to_string()));
        let json = serde_json::to_value(&delta).unwrap();
        assert_eq!(
            json,
            json!({"kind": "text-delta", "text": "Hel", "index": 0, "contextId": "c-1", "messageId": "m-1"})
        );
    }

    #[test]
    fn agent_card_roundtrip_is_structurally_equal() {
        let card = echo_card();
        let json = serde_json::to_string(&card).unwrap();
        let back: AgentCard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn card_without_protocol_version_round_trips() {
        let mut card = echo_card();
        card.protocol_version = None;
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("protocolVersion"));
        let back: AgentCard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        assert_eq!(back.protocol_version(), "0.3.0");
    }

    #[test]
    fn agent_card_minimal_defaults() {
        let card: AgentCard = serde_json::from_value(json!({
            "name": "Echo Agent",
            "description": "d",
            "url": "http://x",
            "version": "1"
        }))
        .unwrap();
        assert!(card.protocol_version.is_none());
        assert_eq!(card.protocol_version(), "0.3.0");
        assert!(!card.capabilities.streaming);
        assert!(!card.capabilities.push_notifications);
        assert!(card.skills.is_empty());
    }

    #[test]
    fn agent_card_camel_case_fields() {
        let json = serde_json::to_value(echo_card()).unwrap();
        assert_eq!(json["defaultInputModes"][0], "text");
        assert_eq!(json["capabilities"]["streaming"], true);
        assert_eq!(json["capabilities"]["pushNotifications"], false);
        assert_eq!(json["skills"][0]["operations"][0]["name"], "say");
        assert!(json.get("provider").is_none());
    }

    #[test]
    fn with_url_replaces_only_url() {
        let card = echo_card();
        let moved = card.with_url("http://example.com/echo");
        assert_eq!(moved.url, "http://example.com/echo");
        assert_eq!(moved.name, card.name);
        assert_eq!(moved.skills, card.skills);
    }

    #[test]
    fn declared_extensions_bag_is_kept() {
        let card: AgentCard = serde_json::from_value(json!({
            "name": "n", "description": "d", "url": "u", "version": "1",
            "extensions": {"region": "eu", "tiers": [1, 2]},
            "securitySchemes": {"bearer": {}}
        }))
        .unwrap();
        let ext = card.extensions.unwrap();
        assert_eq!(ext["region"], "eu");
        assert_eq!(ext["tiers"][1], 2);
        assert!(!ext.contains_key("securitySchemes"));
    }

    #[test]
    fn json_rpc_request() {
        let req = JsonRpcRequest::new(1, "message/send", Some(json!({})));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 1);
        assert_eq!(json["method"], "message/send");
    }

    #[test]
    fn json_rpc_response_error() {
        let resp = JsonRpcResponse::error(
            Some(JsonRpcId::String("r1".to_string())),
            JsonRpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: None,
            },
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["error"]["code"], -32601);
        assert!(json.get("result").is_none());
    }

    #[test]
    fn json_rpc_id_variants() {
        let s: JsonRpcId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(s, JsonRpcId::String("abc".to_string()));
        let n: JsonRpcId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(n, JsonRpcId::Number(42));
        let null: JsonRpcId = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(null, JsonRpcId::Null);
    }

    #[test]
    fn send_message_params() {
        let params = SendMessageParams::new(Message::user("m1", "ping"));
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["message"]["parts"][0]["text"], "ping");
        assert!(json.get("metadata").is_none());
    }
}
