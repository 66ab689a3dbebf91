use serde::{Deserialize, Serialize};

use crate::types::{FunctionToolParam, InputItem};

/// Reasoning options for models that think before answering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningParam {
    /// How much effort the model spends reasoning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,

    /// Requests a streamed summary of the reasoning (`auto`, `concise`, `detailed`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ReasoningParam {
    /// Request a reasoning summary of the given detail.
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            effort: None,
            summary: Some(summary.into()),
        }
    }
}

/// Parameters for creating a streamed response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseCreateParams {
    /// The model identifier.
    pub model: String,

    /// The conversation so far.
    pub input: Vec<InputItem>,

    /// The system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Tools the model may call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<FunctionToolParam>,

    /// Reasoning options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningParam>,

    /// Whether to stream the response.
    pub stream: bool,
}

impl ResponseCreateParams {
    /// Create streaming parameters for `model` over `input`.
    pub fn new(model: impl Into<String>, input: Vec<InputItem>) -> Self {
        Self {
            model: model.into(),
            input,
            instructions: None,
            tools: Vec::new(),
            reasoning: None,
            stream: true,
        }
    }

    /// Set the system prompt.
    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Set the advertised tools.
    pub fn with_tools(mut self, tools: Vec<FunctionToolParam>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the reasoning options.
    pub fn with_reasoning(mut self, reasoning: Option<ReasoningParam>) -> Self {
        self.reasoning = reasoning;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InputMessage, Role, ToolDescriptor};
    use serde_json::{json, to_value};

    #[test]
    fn serialize_minimal_request() {
        let params = ResponseCreateParams::new(
            "gpt-5-mini",
            vec![InputItem::Message(InputMessage::new(Role::User, "hi"))],
        );
        assert_eq!(
            to_value(&params).unwrap(),
            json!({
                "model": "gpt-5-mini",
                "input": [{"type": "message", "role": "user", "content": "hi"}],
                "stream": true
            })
        );
    }

    #[test]
    fn serialize_full_request() {
        let tool = ToolDescriptor::new("noop", "Does nothing.", json!({"type": "object"}));
        let params = ResponseCreateParams::new("gpt-5-mini", Vec::new())
            .with_instructions(Some("Be brief.".to_string()))
            .with_tools(vec![tool.to_param()])
            .with_reasoning(Some(ReasoningParam::with_summary("auto")));
        let value = to_value(&params).unwrap();
        assert_eq!(value["instructions"], json!("Be brief."));
        assert_eq!(value["tools"][0]["name"], json!("noop"));
        assert_eq!(value["reasoning"], json!({"summary": "auto"}));
    }
}
