use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FunctionCallItem, FunctionCallOutputItem, InputItem, InputMessage};

/// Role of a message in the conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System role.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,

    /// Tool result role.
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A tool call as it is recorded on an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCallRecord {
    /// Correlation identifier echoed back by the tool result.
    pub call_id: String,

    /// The tool name.
    pub name: String,

    /// The raw JSON argument text sent by the model.
    pub arguments: String,
}

impl ToolCallRecord {
    /// Create a new `ToolCallRecord`.
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// The content of a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text.
    Text(String),

    /// The tool calls an assistant message asked for.
    ToolCalls(Vec<ToolCallRecord>),

    /// The structured payload a tool returned.
    ToolResult(Value),
}

/// A message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// The content of the message.
    pub content: MessageContent,

    /// The tool call this message answers, for tool results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self {
            role,
            content,
            tool_call_id: None,
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, MessageContent::Text(content.into()))
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(content.into()))
    }

    /// Create a new assistant message with final text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(content.into()))
    }

    /// Create a new assistant message that carries tool calls.
    pub fn assistant_tool_calls(calls: Vec<ToolCallRecord>) -> Self {
        Self::new(Role::Assistant, MessageContent::ToolCalls(calls))
    }

    /// Create a new tool result message answering `call_id`.
    pub fn tool_result(call_id: impl Into<String>, payload: Value) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::ToolResult(payload),
            tool_call_id: Some(call_id.into()),
        }
    }

    /// Returns the text content, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the tool calls recorded on this message.
    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        match &self.content {
            MessageContent::ToolCalls(calls) => calls,
            _ => &[],
        }
    }

    /// Returns the tool result payload, if this is a tool result message.
    pub fn tool_result_payload(&self) -> Option<&Value> {
        match &self.content {
            MessageContent::ToolResult(payload) => Some(payload),
            _ => None,
        }
    }

    /// Convert this message into the input items sent upstream.
    ///
    /// An assistant message with tool calls expands into one item per call.
    pub fn to_input_items(&self) -> Vec<InputItem> {
        match &self.content {
            MessageContent::Text(text) => {
                vec![InputItem::Message(InputMessage::new(self.role, text.clone()))]
            }
            MessageContent::ToolCalls(calls) => calls
                .iter()
                .map(|call| InputItem::FunctionCall(FunctionCallItem::from(call)))
                .collect(),
            MessageContent::ToolResult(payload) => {
                let call_id = self.tool_call_id.clone().unwrap_or_default();
                vec![InputItem::FunctionCallOutput(FunctionCallOutputItem::new(
                    call_id,
                    payload.to_string(),
                ))]
            }
        }
    }
}

impl From<&str> for Message {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}
