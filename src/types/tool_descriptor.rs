use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a tool to the remote model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    /// Name the model uses to call the tool.
    pub name: String,

    /// What the tool does, in prose for the model.
    pub description: String,

    /// JSON Schema of the argument record.
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Create a new `ToolDescriptor`.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Convert to the request parameter advertised on every request.
    pub fn to_param(&self) -> FunctionToolParam {
        FunctionToolParam {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            parameters: self.parameters.clone(),
            strict: None,
        }
    }
}

/// A function tool as it appears in the `tools` array of a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename = "function")]
pub struct FunctionToolParam {
    /// The tool name.
    pub name: String,

    /// The tool description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema of the argument record.
    pub parameters: Value,

    /// Whether to enforce strict schema adherence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}
