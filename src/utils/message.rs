//! Utility functions for creating and handling Message objects.

use crate::types::{Message, Part, Role};
use crate::utils::parts::get_text_parts;
use uuid::Uuid;

/// Creates a new agent message containing a single text Part.
///
/// # Example
///
/// ```
/// use a2a_bridge::utils::new_agent_text_message;
///
/// let message = new_agent_text_message("Echo: ping", Some("conv-123"));
/// assert_eq!(message.role, a2a_bridge::types::Role::Agent);
/// assert_eq!(message.context_id.as_deref(), Some("conv-123"));
/// ```
pub fn new_agent_text_message(
    text: impl Into<String>,
    context_id: Option<impl Into<String>>,
) -> Message {
    new_text_message(Role::Agent, text, context_id)
}

/// Creates a new user message containing a single text Part.
pub fn new_user_text_message(
    text: impl Into<String>,
    context_id: Option<impl Into<String>>,
) -> Message {
    new_text_message(Role::User, text, context_id)
}

fn new_text_message(
    role: Role,
    text: impl Into<String>,
    context_id: Option<impl Into<String>>,
) -> Message {
    let mut message = match role {
        Role::User => Message::user(Uuid::new_v4().to_string(), text),
        Role::Agent => Message::agent(Uuid::new_v4().to_string(), text),
    };
    message.context_id = context_id.map(|id| id.into());
    message
}

/// Creates a new agent message from a list of Parts.
pub fn new_agent_parts_message(parts: Vec<Part>, context_id: Option<impl Into<String>>) -> Message {
    let mut message = new_agent_text_message("", context_id);
    message.parts = parts;
    message
}

/// Extracts and joins all text content from a Message's parts.
///
/// Returns an empty string if there are no text parts.
pub fn get_message_text(message: &Message, delimiter: &str) -> String {
    get_text_parts(&message.parts).join(delimiter)
}
