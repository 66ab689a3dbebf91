use serde::{Deserialize, Serialize};

use crate::types::{Role, ToolCallRecord};

/// One item of the `input` array of a response request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InputItem {
    /// A text message from the user, the assistant, or the system.
    Message(InputMessage),

    /// A tool call the assistant made earlier in the conversation.
    FunctionCall(FunctionCallItem),

    /// The output of a tool call.
    FunctionCallOutput(FunctionCallOutputItem),
}

/// A text message input item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename = "message")]
pub struct InputMessage {
    /// The role of the message author.
    pub role: Role,

    /// The text content.
    pub content: String,
}

impl InputMessage {
    /// Create a new `InputMessage`.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A function call input item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename = "function_call")]
pub struct FunctionCallItem {
    /// Correlation identifier of the call.
    pub call_id: String,

    /// The tool name.
    pub name: String,

    /// The raw JSON argument text.
    pub arguments: String,
}

impl From<&ToolCallRecord> for FunctionCallItem {
    fn from(record: &ToolCallRecord) -> Self {
        Self {
            call_id: record.call_id.clone(),
            name: record.name.clone(),
            arguments: record.arguments.clone(),
        }
    }
}

/// A function call output input item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename = "function_call_output")]
pub struct FunctionCallOutputItem {
    /// Correlation identifier of the call this output answers.
    pub call_id: String,

    /// The serialized tool result.
    pub output: String,
}

impl FunctionCallOutputItem {
    /// Create a new `FunctionCallOutputItem`.
    pub fn new(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            output: output.into(),
        }
    }
}
