//! Stream event and message types

use serde::{Deserialize, Serialize};

use crate::interrupt::Interrupt;

/// Width of the title rule drawn above a formatted message
const TITLE_WIDTH: usize = 80;

/// An element of the agent's output for one streaming call
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Messages produced by one graph node
    Messages {
        node: String,
        messages: Vec<AgentMessage>,
    },

    /// The run paused and is waiting on these requests
    Interrupt { interrupts: Vec<Interrupt> },
}

/// Who produced a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Human,
    #[default]
    Ai,
    Tool,
    System,
    #[serde(other)]
    Other,
}

impl MessageKind {
    fn title(self) -> &'static str {
        match self {
            MessageKind::Human => "Human",
            MessageKind::Ai => "Ai",
            MessageKind::Tool => "Tool",
            MessageKind::System => "System",
            MessageKind::Other => "Unknown",
        }
    }
}

/// Message content: plain text or a list of typed blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<serde_json::Value>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl MessageContent {
    /// Concatenated text of all text blocks
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    serde_json::Value::String(s) => Some(s.as_str()),
                    other => other.get("text").and_then(|t| t.as_str()),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A renderable message carried by a message event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl AgentMessage {
    /// Create an AI message with text content
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Ai,
            content: MessageContent::Text(text.into()),
            ..Default::default()
        }
    }

    /// Create a tool result message
    pub fn tool(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Tool,
            content: MessageContent::Text(text.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Get the text content as a single string
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Pretty multi-line rendering: a titled rule, the content, then any tool calls.
    pub fn formatted(&self) -> String {
        let mut out = title_rule(&format!(" {} Message ", self.kind.title()));
        if let Some(ref name) = self.name {
            out.push_str(&format!("\nName: {}", name));
        }
        out.push_str("\n\n");
        out.push_str(&self.text());

        if !self.tool_calls.is_empty() {
            out.push_str("\nTool Calls:");
            for call in &self.tool_calls {
                let id = call.id.as_deref().unwrap_or("-");
                out.push_str(&format!("\n  {} ({})", call.name, id));
                out.push_str(&format!("\n Call ID: {}", id));
                out.push_str("\n  Args:");
                match call.args.as_object() {
                    Some(args) => {
                        for (key, value) in args {
                            out.push_str(&format!("\n    {}: {}", key, display_value(value)));
                        }
                    }
                    None if !call.args.is_null() => {
                        out.push_str(&format!("\n    {}", display_value(&call.args)));
                    }
                    None => {}
                }
            }
        }
        out
    }
}

/// Center `title` in a rule of `=` characters.
fn title_rule(title: &str) -> String {
    let len = title.chars().count();
    let side = TITLE_WIDTH.saturating_sub(len) / 2;
    let left = "=".repeat(side);
    let right = if len % 2 == 1 {
        format!("{}=", left)
    } else {
        left.clone()
    };
    format!("{}{}{}", left, title, right)
}

/// Strings print bare, everything else as compact JSON.
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
