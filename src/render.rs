//! Human-readable dump of an [`AgentCard`].
//!
//! The known fields are walked explicitly. Only the open `extensions` bag
//! goes through the generic [`Node`] pretty-printer. Rendering never fails
//! and never mutates the card; rendering the same card twice gives the same
//! text.

use crate::types::{AgentCard, AgentSkill};

const RULE_WIDTH: usize = 70;

// ---------------------------------------------------------------------------
// Structural value model
// ---------------------------------------------------------------------------

/// Tagged value model used for the generic part of the dump.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A single printable value.
    Scalar(String),
    /// An ordered list of nodes.
    Sequence(Vec<Node>),
    /// Key/value pairs of an open map.
    Mapping(Vec<(String, Node)>),
    /// Named fields of a typed record.
    Record {
        /// Record type name.
        name: String,
        /// Fields in declaration order.
        fields: Vec<(String, Node)>,
    },
}

impl Node {
    /// Build a scalar node. Blank strings render as `(empty)`.
    pub fn scalar(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Node::Scalar("(empty)".to_string())
        } else {
            Node::Scalar(value)
        }
    }

    /// Render this node as indented lines, `depth` levels deep.
    pub fn render(&self, depth: usize) -> String {
        let mut out = String::new();
        self.write_into(&mut out, depth);
        out
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Node::Scalar(s) => {
                out.push_str(&pad);
                out.push_str(s);
                out.push('\n');
            }
            Node::Sequence(items) if items.is_empty() => {
                out.push_str(&format!("{pad}(empty)\n"));
            }
            Node::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    write_entry(out, &pad, &format!("[{i}]"), item, depth);
                }
            }
            Node::Mapping(entries) if entries.is_empty() => {
                out.push_str(&format!("{pad}(empty)\n"));
            }
            Node::Mapping(entries) => {
                for (key, value) in entries {
                    write_entry(out, &pad, key, value, depth);
                }
            }
            Node::Record { name, fields } => {
                out.push_str(&format!("{pad}{name}\n"));
                for (key, value) in fields {
                    write_entry(out, &"  ".repeat(depth + 1), key, value, depth + 1);
                }
            }
        }
    }
}

fn write_entry(out: &mut String, pad: &str, key: &str, value: &Node, depth: usize) {
    match value {
        Node::Scalar(s) => out.push_str(&format!("{pad}{key}: {s}\n")),
        nested => {
            out.push_str(&format!("{pad}{key}:\n"));
            nested.write_into(out, depth + 1);
        }
    }
}

impl From<&serde_json::Value> for Node {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Node::Scalar("(null)".to_string()),
            Value::Bool(b) => Node::Scalar(b.to_string()),
            Value::Number(n) => Node::Scalar(n.to_string()),
            Value::String(s) => Node::scalar(s.as_str()),
            Value::Array(items) => Node::Sequence(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from(v)))
                    .collect(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Card renderer
// ---------------------------------------------------------------------------

/// Render a card as a multi-line identity sheet.
///
/// ```
/// use a2a_bridge::builders::AgentCardBuilder;
/// use a2a_bridge::render::render_card;
///
/// let card = AgentCardBuilder::new("Echo Agent", "Repeats what you say", "1.0.0")
///     .with_streaming(true)
///     .build();
/// let text = render_card(&card);
/// assert!(text.contains("Name: Echo Agent"));
/// assert!(text.contains("Streaming: true"));
/// ```
pub fn render_card(card: &AgentCard) -> String {
    let rule = "─".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{rule}\nA2A Agent – Identity Card\n{rule}\n"));
    field(&mut out, "Name", &card.name);
    field(&mut out, "Url", &card.url);
    field(&mut out, "Description", &card.description);
    field(&mut out, "Version", &card.version);
    if let Some(v) = &card.protocol_version {
        field(&mut out, "Protocol", v);
    }
    if let Some(doc) = &card.documentation_url {
        field(&mut out, "Documentation", doc);
    }

    section(&mut out, "Capabilities");
    out.push_str(&format!("  Streaming: {}\n", card.capabilities.streaming));
    out.push_str(&format!(
        "  PushNotifications: {}\n",
        card.capabilities.push_notifications
    ));

    section(&mut out, "Default Input Modes");
    list(&mut out, card.default_input_modes.iter().map(String::as_str));

    section(&mut out, "Default Output Modes");
    list(&mut out, card.default_output_modes.iter().map(String::as_str));

    section(&mut out, "Skills");
    let skills: Vec<String> = card.skills.iter().map(format_skill).collect();
    list(&mut out, skills.iter().map(String::as_str));

    if let Some(provider) = &card.provider {
        section(&mut out, "Provider");
        let node = Node::Record {
            name: "AgentProvider".to_string(),
            fields: vec![
                ("organization".to_string(), Node::scalar(provider.organization.as_str())),
                ("url".to_string(), Node::scalar(provider.url.as_str())),
            ],
        };
        out.push_str(&node.render(1));
    }

    section(&mut out, "Extensions");
    match &card.extensions {
        Some(ext) => {
            let node = Node::Mapping(ext.iter().map(|(k, v)| (k.clone(), Node::from(v))).collect());
            out.push_str(&node.render(1));
        }
        None => out.push_str("  (empty)\n"),
    }

    section(&mut out, "Raw View (JSON)");
    match serde_json::to_string_pretty(card) {
        Ok(json) => {
            out.push_str(&json);
            out.push('\n');
        }
        Err(_) => out.push_str("(unavailable)\n"),
    }

    out.push_str(&rule);
    out.push('\n');
    out
}

fn field(out: &mut String, label: &str, value: &str) {
    if !value.trim().is_empty() {
        out.push_str(&format!("{label}: {value}\n"));
    }
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n• {title}:\n"));
}

fn list<'a>(out: &mut String, items: impl Iterator<Item = &'a str>) {
    let mut count = 0;
    for (i, item) in items.enumerate() {
        out.push_str(&format!("  [{i}] {item}\n"));
        count += 1;
    }
    if count == 0 {
        out.push_str("  (empty)\n");
    }
}

/// `name: description | Ops: a, b`
fn format_skill(skill: &AgentSkill) -> String {
    let head: Vec<&str> = [skill.name.as_str(), skill.description.as_str()]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    let mut line = if head.is_empty() {
        skill.id.clone()
    } else {
        head.join(" — ")
    };

    let ops: Vec<&str> = skill
        .operations
        .iter()
        .flatten()
        .map(|op| op.name.as_str())
        .filter(|name| !name.trim().is_empty())
        .collect();
    if !ops.is_empty() {
        line.push_str(" | Ops: ");
        line.push_str(&ops.join(", "));
    }
    line
}
